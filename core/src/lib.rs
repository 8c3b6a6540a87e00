#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tile Defence engine.
//!
//! This crate defines the value types and message surface that connect the
//! board, the motion system, the authoritative world, and adapters. Adapters
//! submit [`Command`] values describing desired mutations, the world executes
//! those commands via its `apply` entry point, and then reports the outcome as
//! [`Event`] values.

use std::{f32::consts::PI, time::Duration};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cardinal headings available on the tile grid.
///
/// Declaration order is also the order in which the flow field relaxes
/// neighbors, which fixes tie-breaking between equally long routes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Heading toward increasing `y` (world +Z).
    North,
    /// Heading toward increasing `x` (world +X).
    East,
    /// Heading toward decreasing `y` (world -Z).
    South,
    /// Heading toward decreasing `x` (world -X).
    West,
}

impl Direction {
    /// All headings in neighbor relaxation order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Position of the heading within [`Direction::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Heading angle in degrees, measured clockwise from north when seen from above.
    #[must_use]
    pub const fn angle(self) -> f32 {
        match self {
            Self::North => 0.0,
            Self::East => 90.0,
            Self::South => 180.0,
            Self::West => 270.0,
        }
    }

    /// World-space orientation equivalent to [`Direction::angle`].
    ///
    /// The rotation turns about the up axis (+Y) and maps the forward axis
    /// (+Z, north) onto the heading.
    #[must_use]
    pub fn rotation(self) -> Quat {
        rotation_for_angle(self.angle())
    }

    /// Offset of half a tile along the heading.
    #[must_use]
    pub const fn half_vector(self) -> Vec3 {
        match self {
            Self::North => Vec3::new(0.0, 0.0, 0.5),
            Self::East => Vec3::new(0.5, 0.0, 0.0),
            Self::South => Vec3::new(0.0, 0.0, -0.5),
            Self::West => Vec3::new(-0.5, 0.0, 0.0),
        }
    }

    /// Heading pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Classifies the turn required to go from `self` to `to`.
    #[must_use]
    pub const fn change_to(self, to: Direction) -> DirectionChange {
        match (to.index() + 4 - self.index()) % 4 {
            0 => DirectionChange::None,
            1 => DirectionChange::TurnRight,
            3 => DirectionChange::TurnLeft,
            _ => DirectionChange::TurnAround,
        }
    }
}

/// Converts a heading angle in degrees into a rotation about the up axis.
#[must_use]
pub fn rotation_for_angle(degrees: f32) -> Quat {
    Quat::from_rotation_y(degrees * PI / 180.0)
}

/// Turn performed between two consecutive headings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectionChange {
    /// Heading unchanged.
    None,
    /// Quarter turn clockwise.
    TurnRight,
    /// Quarter turn counter-clockwise.
    TurnLeft,
    /// Half turn.
    TurnAround,
}

/// Location of a single tile expressed as column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    x: u32,
    y: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the tile. Rows grow toward the north.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }
}

/// Dimensions of the board measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSize {
    width: u32,
    height: u32,
}

impl BoardSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of tiles covered by the board.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        let count = u64::from(self.width) * u64::from(self.height);
        usize::try_from(count).unwrap_or(0)
    }

    /// Reports whether the coordinate lies on the board.
    #[must_use]
    pub const fn contains(&self, coord: TileCoord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Row-major index of the coordinate, if it lies on the board.
    #[must_use]
    pub fn index_of(&self, coord: TileCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let row = usize::try_from(coord.y).ok()?;
        let column = usize::try_from(coord.x).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Coordinate stored at the row-major index, if it lies on the board.
    #[must_use]
    pub fn coord_of(&self, index: usize) -> Option<TileCoord> {
        if index >= self.tile_count() {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let x = u32::try_from(index % width).ok()?;
        let y = u32::try_from(index / width).ok()?;
        Some(TileCoord::new(x, y))
    }
}

/// Types of towers that can be constructed on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Continuous beam tower.
    Laser,
    /// Ballistic shell tower.
    Mortar,
}

/// Content that prevents enemies from walking across a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockingContent {
    /// Plain wall segment.
    Wall,
    /// Tower of the provided kind.
    Tower(TowerKind),
}

/// Content hosted by a tile. Exactly one variant applies at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileContent {
    /// Walkable floor without a role.
    #[default]
    Empty,
    /// The tile every path leads to.
    Destination,
    /// Walkable tile where enemies enter the board.
    SpawnPoint,
    /// Blocking wall.
    Wall,
    /// Blocking tower of the provided kind.
    Tower(TowerKind),
}

impl TileContent {
    /// Reports whether the content blocks the flow field.
    #[must_use]
    pub const fn blocks_path(self) -> bool {
        matches!(self, Self::Wall | Self::Tower(_))
    }

    /// Returns the blocking variant of the content, if any.
    #[must_use]
    pub const fn as_blocking(self) -> Option<BlockingContent> {
        match self {
            Self::Wall => Some(BlockingContent::Wall),
            Self::Tower(kind) => Some(BlockingContent::Tower(kind)),
            Self::Empty | Self::Destination | Self::SpawnPoint => None,
        }
    }
}

impl From<BlockingContent> for TileContent {
    fn from(content: BlockingContent) -> Self {
        match content {
            BlockingContent::Wall => Self::Wall,
            BlockingContent::Tower(kind) => Self::Tower(kind),
        }
    }
}

/// Result of an accepted blocking-content toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Toggle {
    /// Blocking content was placed on an empty tile.
    Placed,
    /// Blocking content was removed, leaving the tile empty.
    Removed,
    /// Blocking content was swapped for a different blocking content.
    Replaced,
}

/// Reasons a board mutation may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The coordinate lies outside the board.
    #[error("tile lies outside the board")]
    OutOfBounds,
    /// The tile hosts a spawn point or the destination.
    #[error("tile is reserved for a spawn point or the destination")]
    Reserved,
    /// The tile hosts blocking content.
    #[error("tile is occupied by blocking content")]
    Occupied,
    /// The tile does not host a spawn point.
    #[error("tile is not a spawn point")]
    NotSpawnPoint,
    /// The change would leave a spawn point without a path.
    #[error("change would disconnect a spawn point from the destination")]
    DisconnectsSpawnPoint,
    /// The board must keep at least one spawn point.
    #[error("the last spawn point cannot be removed")]
    LastSpawnPoint,
}

/// Reasons a layout may be rejected by the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum LayoutError {
    /// The number of roles does not match the number of tiles.
    #[error("layout holds {actual} tiles but the board expects {expected}")]
    LengthMismatch {
        /// Tiles on the board.
        expected: usize,
        /// Roles supplied by the layout.
        actual: usize,
    },
    /// The layout names more than one destination.
    #[error("layout names a second destination at {second:?} after {first:?}")]
    MultipleDestinations {
        /// First destination encountered in row-major order.
        first: TileCoord,
        /// Offending additional destination.
        second: TileCoord,
    },
}

/// Unique identifier assigned to an enemy by the world's pool.
///
/// The generation changes whenever a pool slot is recycled, so a stale
/// identifier never refers to a newer enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId {
    index: u32,
    generation: u32,
}

impl EnemyId {
    /// Creates a new enemy identifier.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Pool slot that stores the enemy.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Number of times the slot was recycled before this enemy was spawned.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Per-enemy movement parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyProfile {
    speed: f32,
    path_offset: f32,
}

impl EnemyProfile {
    /// Creates a profile from a speed in tiles per second and a lateral path offset.
    #[must_use]
    pub const fn new(speed: f32, path_offset: f32) -> Self {
        Self { speed, path_offset }
    }

    /// Travel speed in tiles per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Lateral bias from the path center, in tiles. Positive values sit to the
    /// right of the heading.
    #[must_use]
    pub const fn path_offset(&self) -> f32 {
        self.path_offset
    }
}

impl Default for EnemyProfile {
    fn default() -> Self {
        Self::new(1.0, 0.0)
    }
}

/// How a game session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// The scenario finished with the player still alive.
    Victory,
    /// The player ran out of health.
    Defeat,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resizes the board and restores the default layout.
    ConfigureBoard {
        /// New board dimensions.
        size: BoardSize,
    },
    /// Replaces the board with a layout of row-major tile roles.
    LoadLayout {
        /// Board dimensions the roles are laid out on.
        size: BoardSize,
        /// Content of every tile in row-major order.
        roles: Vec<TileContent>,
    },
    /// Places or removes a wall.
    ToggleWall {
        /// Tile to toggle.
        tile: TileCoord,
    },
    /// Places or removes a tower.
    ToggleTower {
        /// Tile to toggle.
        tile: TileCoord,
        /// Kind of tower to place.
        kind: TowerKind,
    },
    /// Turns an empty tile into a spawn point.
    SetSpawnPoint {
        /// Tile receiving the role.
        tile: TileCoord,
    },
    /// Turns a spawn point back into an empty tile.
    RemoveSpawnPoint {
        /// Tile losing the role.
        tile: TileCoord,
    },
    /// Moves the destination to the provided tile.
    SetDestination {
        /// Tile receiving the role.
        tile: TileCoord,
    },
    /// Spawns an enemy on one of the board's spawn points.
    SpawnEnemy {
        /// Spawn point selector, taken modulo the number of spawn points.
        spawn_point: usize,
        /// Movement parameters for the enemy.
        profile: EnemyProfile,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Signals that the external scenario will not spawn further enemies.
    FinishScenario,
    /// Resets enemies, health, and the board layout.
    BeginNewGame,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The board was resized and received the default layout.
    BoardConfigured {
        /// New board dimensions.
        size: BoardSize,
    },
    /// A layout was applied to the board.
    LayoutLoaded {
        /// Board dimensions of the layout.
        size: BoardSize,
    },
    /// A layout was rejected and the board left unchanged.
    LayoutRejected {
        /// Specific reason the layout failed.
        reason: LayoutError,
    },
    /// The content of a tile changed through a wall or tower toggle.
    ContentChanged {
        /// Tile whose content changed.
        tile: TileCoord,
        /// Content now hosted by the tile.
        content: TileContent,
    },
    /// A board mutation was rejected.
    PlacementRejected {
        /// Tile named by the rejected command.
        tile: TileCoord,
        /// Specific reason the mutation failed.
        reason: PlacementError,
    },
    /// A spawn point was added.
    SpawnPointAdded {
        /// Tile that became a spawn point.
        tile: TileCoord,
    },
    /// A spawn point was removed.
    SpawnPointRemoved {
        /// Tile that stopped being a spawn point.
        tile: TileCoord,
    },
    /// The destination moved.
    DestinationChanged {
        /// Tile that became the destination.
        tile: TileCoord,
    },
    /// An enemy entered the board.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Spawn point the enemy entered on.
        tile: TileCoord,
    },
    /// A spawn request could not be served because the board has no spawn points.
    EnemySpawnRejected,
    /// An enemy walked off the destination tile and was recycled.
    EnemyReachedDestination {
        /// Identifier of the recycled enemy.
        enemy: EnemyId,
    },
    /// The player's remaining health changed.
    PlayerHealthChanged {
        /// Health remaining after the change.
        health: u32,
    },
    /// The simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// The session decided its outcome and will end after a delay.
    GameOverScheduled {
        /// Outcome that will be announced.
        outcome: GameOutcome,
        /// Simulated time left before the announcement.
        delay: Duration,
    },
    /// The session ended; a fresh game begins immediately afterwards.
    GameOver {
        /// Outcome of the finished session.
        outcome: GameOutcome,
    },
    /// A fresh game started.
    GameStarted,
}
