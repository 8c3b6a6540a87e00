//! Breadth-first flow field construction over the tile arena.

use std::collections::VecDeque;

use tile_defence_core::Direction;

use crate::tile::{TileId, Tiles};

/// Rebuilds every tile's distance and next hop from the destination.
///
/// Neighbors are relaxed in north, east, south, west order, which decides
/// which of several equally short routes a tile points along. Returns the
/// number of tiles that can reach the destination.
pub(crate) fn rebuild(
    tiles: &mut Tiles,
    destination: Option<TileId>,
    frontier: &mut VecDeque<TileId>,
) -> usize {
    tiles.clear_paths();
    frontier.clear();

    let Some(destination) = destination else {
        return 0;
    };

    tiles.become_destination(destination);
    frontier.push_back(destination);

    let mut reached = 0;
    while let Some(tile) = frontier.pop_front() {
        reached += 1;
        if let Some(neighbor) = tiles.grow_path_north(tile) {
            frontier.push_back(neighbor);
        }
        if let Some(neighbor) = tiles.grow_path_east(tile) {
            frontier.push_back(neighbor);
        }
        if let Some(neighbor) = tiles.grow_path_south(tile) {
            frontier.push_back(neighbor);
        }
        if let Some(neighbor) = tiles.grow_path_west(tile) {
            frontier.push_back(neighbor);
        }
    }

    reached
}

/// Marks every tile reachable from `destination` without touching tile state.
///
/// `is_blocked` decides walkability, so callers can probe a hypothetical
/// obstacle before committing it.
pub(crate) fn reachable_with<F>(tiles: &Tiles, destination: TileId, mut is_blocked: F) -> Vec<bool>
where
    F: FnMut(TileId) -> bool,
{
    let mut reached = vec![false; tiles.len()];
    if is_blocked(destination) {
        return reached;
    }

    let mut queue = VecDeque::new();
    reached[destination.index()] = true;
    queue.push_back(destination);

    while let Some(current) = queue.pop_front() {
        for side in Direction::ALL {
            let Some(neighbor) = tiles[current].neighbor(side) else {
                continue;
            };
            if reached[neighbor.index()] || is_blocked(neighbor) {
                continue;
            }
            reached[neighbor.index()] = true;
            queue.push_back(neighbor);
        }
    }

    reached
}
