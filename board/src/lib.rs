#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tile board and breadth-first flow field for Tile Defence.
//!
//! The [`Board`] owns every [`Tile`], wires their neighbor links once, and
//! keeps the flow field current: after every accepted mutation each tile
//! that can reach the destination knows its hop count and its next hop.
//! Mutations that would leave a spawn point without a route are rejected
//! before anything is written.

mod navigation;
mod tile;

use std::collections::VecDeque;

use glam::Vec3;
use tile_defence_core::{
    BlockingContent, BoardSize, LayoutError, PlacementError, TileContent, TileCoord, Toggle,
    TowerKind,
};
use tracing::{debug, warn};

pub use tile::{PathStep, Tile, TileId, NO_PATH};

use tile::Tiles;

/// Rectangular grid of tiles together with its flow field.
#[derive(Clone, Debug)]
pub struct Board {
    size: BoardSize,
    tiles: Tiles,
    spawn_points: Vec<TileId>,
    destination: Option<TileId>,
    search_frontier: VecDeque<TileId>,
}

impl Board {
    /// Allocates a board of the provided size with every tile empty.
    #[must_use]
    pub fn new(size: BoardSize) -> Self {
        let mut board = Self {
            size,
            tiles: build_tiles(size),
            spawn_points: Vec::new(),
            destination: None,
            search_frontier: VecDeque::new(),
        };
        board.recompute_flow_field();
        board
    }

    /// Reallocates the tiles for a new size, dropping every role and obstacle.
    pub fn resize(&mut self, size: BoardSize) {
        self.size = size;
        self.tiles = build_tiles(size);
        self.spawn_points.clear();
        self.destination = None;
        self.recompute_flow_field();
    }

    /// Empties every tile while keeping the current size.
    pub fn clear(&mut self) {
        for tile in self.tiles.iter_mut() {
            tile.set_content(TileContent::Empty);
        }
        self.spawn_points.clear();
        self.destination = None;
        self.recompute_flow_field();
    }

    /// Clears the board, then places the destination on the center tile and a
    /// spawn point on the first tile.
    pub fn reset_to_default_layout(&mut self) {
        self.clear();
        let count = self.tiles.len();
        let Some(destination) = self.tiles.get(count / 2) else {
            return;
        };
        self.tiles[destination].set_content(TileContent::Destination);
        self.destination = Some(destination);

        if let Some(spawn) = self.tiles.get(0).filter(|spawn| *spawn != destination) {
            self.tiles[spawn].set_content(TileContent::SpawnPoint);
            self.spawn_points.push(spawn);
        }
        self.recompute_flow_field();
    }

    /// Dimensions of the board.
    #[must_use]
    pub const fn size(&self) -> BoardSize {
        self.size
    }

    /// Looks up a tile by handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle was issued by a board of a different size.
    #[must_use]
    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id]
    }

    /// Iterates over every tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (TileId, &Tile)> {
        self.tiles.iter()
    }

    /// Handle of the tile at the coordinate, if it lies on the board.
    #[must_use]
    pub fn tile_at(&self, coord: TileCoord) -> Option<TileId> {
        self.size
            .index_of(coord)
            .and_then(|index| self.tiles.get(index))
    }

    /// World-space center of the tile at the coordinate.
    #[must_use]
    pub fn world_position_of(&self, coord: TileCoord) -> Option<Vec3> {
        self.tile_at(coord).map(|id| self.tiles[id].position())
    }

    /// Tile containing the world-space point, ignoring its height.
    #[must_use]
    pub fn tile_at_world(&self, point: Vec3) -> Option<TileId> {
        let x = (point.x + self.size.width() as f32 * 0.5).floor();
        let y = (point.z + self.size.height() as f32 * 0.5).floor();
        if x < 0.0 || y < 0.0 {
            return None;
        }
        self.tile_at(TileCoord::new(x as u32, y as u32))
    }

    /// Spawn points in the order they were designated.
    #[must_use]
    pub fn spawn_points(&self) -> &[TileId] {
        &self.spawn_points
    }

    /// The tile every path leads to, if one is set.
    #[must_use]
    pub const fn destination(&self) -> Option<TileId> {
        self.destination
    }

    /// Iterates over the towers standing on the board.
    pub fn towers(&self) -> impl Iterator<Item = (TileId, TowerKind)> + '_ {
        self.tiles.iter().filter_map(|(id, tile)| match tile.content() {
            TileContent::Tower(kind) => Some((id, kind)),
            _ => None,
        })
    }

    /// Rebuilds distances and next hops for every tile.
    pub fn recompute_flow_field(&mut self) {
        let reached =
            navigation::rebuild(&mut self.tiles, self.destination, &mut self.search_frontier);
        debug!(reached, tiles = self.tiles.len(), "flow field recomputed");
    }

    /// Checks whether the tile may become blocking (`as_blocking`) or walkable.
    ///
    /// Spawn points and the destination can never hold obstacles. Blocking an
    /// empty tile is refused when a spawn point that currently reaches the
    /// destination would lose its route. The board is not modified.
    pub fn can_place(&self, tile: TileId, as_blocking: bool) -> Result<(), PlacementError> {
        let content = self.tiles[tile].content();
        if matches!(content, TileContent::SpawnPoint | TileContent::Destination) {
            return Err(PlacementError::Reserved);
        }
        if !as_blocking || content.blocks_path() {
            return Ok(());
        }
        let Some(destination) = self.destination else {
            return Ok(());
        };

        if self.spawn_points_stay_connected(destination, |id| id == tile) {
            Ok(())
        } else {
            Err(PlacementError::DisconnectsSpawnPoint)
        }
    }

    /// Places `content` on an empty tile, removes it if it is already there,
    /// or swaps one kind of blocking content for another.
    ///
    /// Placement is validated before it is committed; a rejected toggle
    /// leaves every tile untouched.
    pub fn toggle_blocking_content(
        &mut self,
        coord: TileCoord,
        content: BlockingContent,
    ) -> Result<Toggle, PlacementError> {
        let tile = self.tile_at(coord).ok_or(PlacementError::OutOfBounds)?;
        let requested = TileContent::from(content);
        let current = self.tiles[tile].content();

        let toggle = match current {
            TileContent::SpawnPoint | TileContent::Destination => {
                debug!(?coord, ?content, "placement on reserved tile rejected");
                return Err(PlacementError::Reserved);
            }
            existing if existing == requested => {
                self.tiles[tile].set_content(TileContent::Empty);
                self.recompute_flow_field();
                Toggle::Removed
            }
            TileContent::Wall | TileContent::Tower(_) => {
                self.tiles[tile].set_content(requested);
                Toggle::Replaced
            }
            TileContent::Empty => {
                if let Err(reason) = self.can_place(tile, true) {
                    debug!(?coord, ?content, %reason, "placement rejected");
                    return Err(reason);
                }
                self.tiles[tile].set_content(requested);
                self.recompute_flow_field();
                Toggle::Placed
            }
        };

        debug!(?coord, ?content, ?toggle, "blocking content toggled");
        Ok(toggle)
    }

    /// Turns an empty tile into a spawn point. Already designated spawn points are accepted as is.
    pub fn set_spawn_point(&mut self, coord: TileCoord) -> Result<(), PlacementError> {
        let tile = self.tile_at(coord).ok_or(PlacementError::OutOfBounds)?;
        match self.tiles[tile].content() {
            TileContent::SpawnPoint => return Ok(()),
            TileContent::Destination => return Err(PlacementError::Reserved),
            TileContent::Wall | TileContent::Tower(_) => return Err(PlacementError::Occupied),
            TileContent::Empty => {}
        }

        self.tiles[tile].set_content(TileContent::SpawnPoint);
        self.spawn_points.push(tile);
        self.recompute_flow_field();
        if !self.tiles[tile].has_path() {
            warn!(?coord, "spawn point cannot reach the destination");
        }
        Ok(())
    }

    /// Turns a spawn point back into an empty tile, keeping at least one spawn point.
    pub fn remove_spawn_point(&mut self, coord: TileCoord) -> Result<(), PlacementError> {
        let tile = self.tile_at(coord).ok_or(PlacementError::OutOfBounds)?;
        if self.tiles[tile].content() != TileContent::SpawnPoint {
            return Err(PlacementError::NotSpawnPoint);
        }
        if self.spawn_points.len() <= 1 {
            return Err(PlacementError::LastSpawnPoint);
        }

        self.tiles[tile].set_content(TileContent::Empty);
        self.spawn_points.retain(|spawn| *spawn != tile);
        self.recompute_flow_field();
        Ok(())
    }

    /// Moves the destination to an empty tile.
    ///
    /// The previous destination becomes empty. The move is refused when a
    /// spawn point that currently reaches the destination could not reach
    /// the new one.
    pub fn set_destination(&mut self, coord: TileCoord) -> Result<(), PlacementError> {
        let tile = self.tile_at(coord).ok_or(PlacementError::OutOfBounds)?;
        match self.tiles[tile].content() {
            TileContent::Destination => return Ok(()),
            TileContent::SpawnPoint => return Err(PlacementError::Reserved),
            TileContent::Wall | TileContent::Tower(_) => return Err(PlacementError::Occupied),
            TileContent::Empty => {}
        }

        if !self.spawn_points_stay_connected(tile, |_| false) {
            debug!(?coord, "destination move rejected");
            return Err(PlacementError::DisconnectsSpawnPoint);
        }

        if let Some(previous) = self.destination.replace(tile) {
            self.tiles[previous].set_content(TileContent::Empty);
        }
        self.tiles[tile].set_content(TileContent::Destination);
        self.recompute_flow_field();
        Ok(())
    }

    /// Replaces every tile's content with the provided row-major roles.
    ///
    /// The layout is validated as a whole before the board changes. Spawn
    /// points that cannot reach the destination are tolerated; they simply
    /// never release a moving enemy.
    pub fn load_layout(&mut self, roles: &[TileContent]) -> Result<(), LayoutError> {
        let expected = self.tiles.len();
        if roles.len() != expected {
            return Err(LayoutError::LengthMismatch {
                expected,
                actual: roles.len(),
            });
        }

        let mut destination: Option<usize> = None;
        for (index, role) in roles.iter().enumerate() {
            if *role != TileContent::Destination {
                continue;
            }
            if let Some(first) = destination {
                return Err(LayoutError::MultipleDestinations {
                    first: self.coord_at(first),
                    second: self.coord_at(index),
                });
            }
            destination = Some(index);
        }

        self.spawn_points.clear();
        self.destination = None;
        for (id, role) in self.tiles.ids().zip(roles.iter().copied()) {
            self.tiles[id].set_content(role);
            match role {
                TileContent::SpawnPoint => self.spawn_points.push(id),
                TileContent::Destination => self.destination = Some(id),
                _ => {}
            }
        }
        self.recompute_flow_field();

        for spawn in &self.spawn_points {
            let tile = &self.tiles[*spawn];
            if !tile.has_path() {
                warn!(coord = ?tile.coord(), "spawn point cannot reach the destination");
            }
        }
        Ok(())
    }

    fn coord_at(&self, index: usize) -> TileCoord {
        self.size
            .coord_of(index)
            .unwrap_or_else(|| TileCoord::new(0, 0))
    }

    /// Reports whether every spawn point that reaches the current destination
    /// would still reach `destination` with `is_blocked` tiles treated as walls.
    fn spawn_points_stay_connected<F>(&self, destination: TileId, is_blocked: F) -> bool
    where
        F: Fn(TileId) -> bool,
    {
        let reached = navigation::reachable_with(&self.tiles, destination, |id| {
            is_blocked(id) || self.tiles[id].content().blocks_path()
        });
        self.spawn_points
            .iter()
            .all(|spawn| !self.tiles[*spawn].has_path() || reached[spawn.index()])
    }
}

fn build_tiles(size: BoardSize) -> Tiles {
    let width = size.width();
    let height = size.height();
    let offset_x = (width as f32 - 1.0) * 0.5;
    let offset_z = (height as f32 - 1.0) * 0.5;
    let row_stride = width as usize;

    let mut tiles = Tiles::with_capacity(size.tile_count());
    for y in 0..height {
        for x in 0..width {
            let position = Vec3::new(x as f32 - offset_x, 0.0, y as f32 - offset_z);
            let id = tiles.push(TileCoord::new(x, y), position);
            if x > 0 {
                if let Some(west) = tiles.get(id.index() - 1) {
                    tiles.link_east_west(id, west);
                }
            }
            if y > 0 {
                if let Some(south) = tiles.get(id.index() - row_stride) {
                    tiles.link_north_south(id, south);
                }
            }
        }
    }
    tiles
}
