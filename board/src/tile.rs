//! Tiles and the arena that links them into the board graph.

use std::ops::{Index, IndexMut};

use glam::Vec3;
use tile_defence_core::{Direction, TileContent, TileCoord};

/// Distance carried by tiles that cannot reach the destination.
pub const NO_PATH: u32 = u32::MAX;

/// Handle to a tile owned by a [`Board`](crate::Board).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(usize);

impl TileId {
    /// Row-major position of the tile within its board.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One hop of the flow field: where to go next and how to get there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathStep {
    next: TileId,
    direction: Direction,
    exit_point: Vec3,
}

impl PathStep {
    /// Neighbor one step closer to the destination.
    #[must_use]
    pub const fn next(&self) -> TileId {
        self.next
    }

    /// Heading from the tile toward [`PathStep::next`].
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Midpoint of the edge shared with [`PathStep::next`].
    #[must_use]
    pub const fn exit_point(&self) -> Vec3 {
        self.exit_point
    }
}

/// Node of the board graph.
#[derive(Clone, Debug)]
pub struct Tile {
    coord: TileCoord,
    position: Vec3,
    neighbors: [Option<TileId>; 4],
    distance: u32,
    path: Option<PathStep>,
    content: TileContent,
}

impl Tile {
    fn new(coord: TileCoord, position: Vec3) -> Self {
        Self {
            coord,
            position,
            neighbors: [None; 4],
            distance: NO_PATH,
            path: None,
            content: TileContent::Empty,
        }
    }

    /// Grid coordinate of the tile.
    #[must_use]
    pub const fn coord(&self) -> TileCoord {
        self.coord
    }

    /// World-space center of the tile.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Neighbor on the provided side, if the tile is not on that edge of the board.
    #[must_use]
    pub const fn neighbor(&self, side: Direction) -> Option<TileId> {
        self.neighbors[side.index()]
    }

    /// Hop count to the destination, or [`NO_PATH`].
    #[must_use]
    pub const fn distance(&self) -> u32 {
        self.distance
    }

    /// Reports whether the tile can reach the destination.
    #[must_use]
    pub const fn has_path(&self) -> bool {
        self.distance != NO_PATH
    }

    /// Full next hop, absent on the destination and on unreachable tiles.
    #[must_use]
    pub const fn path_step(&self) -> Option<PathStep> {
        self.path
    }

    /// Neighbor one step closer to the destination.
    #[must_use]
    pub fn next_on_path(&self) -> Option<TileId> {
        self.path.map(|step| step.next)
    }

    /// Heading toward [`Tile::next_on_path`].
    #[must_use]
    pub fn path_direction(&self) -> Option<Direction> {
        self.path.map(|step| step.direction)
    }

    /// Content currently hosted by the tile.
    #[must_use]
    pub const fn content(&self) -> TileContent {
        self.content
    }

    pub(crate) fn set_content(&mut self, content: TileContent) {
        self.content = content;
    }

    fn clear_path(&mut self) {
        self.distance = NO_PATH;
        self.path = None;
    }

    fn become_destination(&mut self) {
        self.distance = 0;
        self.path = None;
    }
}

/// Dense tile storage addressed by [`TileId`].
#[derive(Clone, Debug, Default)]
pub(crate) struct Tiles {
    tiles: Vec<Tile>,
}

impl Tiles {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            tiles: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, coord: TileCoord, position: Vec3) -> TileId {
        let id = TileId(self.tiles.len());
        self.tiles.push(Tile::new(coord, position));
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.tiles.len()
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = TileId> {
        (0..self.tiles.len()).map(TileId)
    }

    pub(crate) fn get(&self, index: usize) -> Option<TileId> {
        (index < self.tiles.len()).then_some(TileId(index))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (TileId, &Tile)> {
        self.tiles
            .iter()
            .enumerate()
            .map(|(index, tile)| (TileId(index), tile))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    /// Links two horizontally adjacent tiles.
    ///
    /// # Panics
    ///
    /// Panics if either side was already linked.
    pub(crate) fn link_east_west(&mut self, east: TileId, west: TileId) {
        assert!(
            self[west].neighbor(Direction::East).is_none()
                && self[east].neighbor(Direction::West).is_none(),
            "redefined east/west neighbors of {:?} and {:?}",
            self[east].coord,
            self[west].coord,
        );
        self[west].neighbors[Direction::East.index()] = Some(east);
        self[east].neighbors[Direction::West.index()] = Some(west);
    }

    /// Links two vertically adjacent tiles.
    ///
    /// # Panics
    ///
    /// Panics if either side was already linked.
    pub(crate) fn link_north_south(&mut self, north: TileId, south: TileId) {
        assert!(
            self[south].neighbor(Direction::North).is_none()
                && self[north].neighbor(Direction::South).is_none(),
            "redefined north/south neighbors of {:?} and {:?}",
            self[north].coord,
            self[south].coord,
        );
        self[south].neighbors[Direction::North.index()] = Some(north);
        self[north].neighbors[Direction::South.index()] = Some(south);
    }

    pub(crate) fn clear_paths(&mut self) {
        for tile in &mut self.tiles {
            tile.clear_path();
        }
    }

    pub(crate) fn become_destination(&mut self, id: TileId) {
        self[id].become_destination();
    }

    pub(crate) fn grow_path_north(&mut self, from: TileId) -> Option<TileId> {
        self.grow_path_to(from, Direction::North)
    }

    pub(crate) fn grow_path_east(&mut self, from: TileId) -> Option<TileId> {
        self.grow_path_to(from, Direction::East)
    }

    pub(crate) fn grow_path_south(&mut self, from: TileId) -> Option<TileId> {
        self.grow_path_to(from, Direction::South)
    }

    pub(crate) fn grow_path_west(&mut self, from: TileId) -> Option<TileId> {
        self.grow_path_to(from, Direction::West)
    }

    /// Claims the neighbor on `side` for the frontier if it is walkable and unvisited.
    fn grow_path_to(&mut self, from: TileId, side: Direction) -> Option<TileId> {
        let current = &self[from];
        debug_assert!(current.has_path(), "growing a path from an unreached tile");
        let neighbor_id = current.neighbor(side)?;
        let distance = current.distance.saturating_add(1);

        let neighbor = &mut self[neighbor_id];
        if neighbor.has_path() || neighbor.content.blocks_path() {
            return None;
        }

        let direction = side.opposite();
        neighbor.distance = distance;
        neighbor.path = Some(PathStep {
            next: from,
            direction,
            exit_point: neighbor.position + direction.half_vector(),
        });
        Some(neighbor_id)
    }
}

impl Index<TileId> for Tiles {
    type Output = Tile;

    fn index(&self, id: TileId) -> &Tile {
        &self.tiles[id.0]
    }
}

impl IndexMut<TileId> for Tiles {
    fn index_mut(&mut self, id: TileId) -> &mut Tile {
        &mut self.tiles[id.0]
    }
}
