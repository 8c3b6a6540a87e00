#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Continuous motion of a single enemy along the board's flow field.
//!
//! A [`Motion`] walks one segment at a time. Straight segments run from exit
//! point to exit point, turns pivot about a tile corner (or the tile edge for
//! a turn-around) while the lateral path offset is kept, and the walk ends
//! with half a tile into the destination. Next hops are read from the board
//! only when a new segment is prepared.

use std::f32::consts::PI;

use glam::{Quat, Vec3};
use tile_defence_board::{Board, TileId};
use tile_defence_core::{rotation_for_angle, Direction, DirectionChange, EnemyProfile};
use tracing::trace;

/// Largest lateral offset honored; keeps every turn radius positive.
const PATH_OFFSET_LIMIT: f32 = 0.45;

/// Smallest radius used when turning around on the center line.
const TURN_AROUND_MIN_RADIUS: f32 = 0.2;

/// Stage of an enemy's walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Walking from the spawn tile center to its exit point.
    Intro,
    /// Walking tile to tile along the flow field.
    Following,
    /// Walking from the last exit point to the final tile center.
    Outro,
    /// The walk is over.
    Finished,
}

/// Result of advancing a motion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Advance {
    /// The enemy is still on its way.
    Continuing,
    /// The enemy has completed its walk.
    ///
    /// The walk also ends on the center of a tile that lost its next hop while
    /// the enemy was heading into it, such as a tile that just became a wall,
    /// so the final position is not always on the destination tile.
    ReachedDestination,
}

/// Movement state of one enemy.
#[derive(Clone, Debug)]
pub struct Motion {
    profile: EnemyProfile,
    phase: Phase,
    has_path: bool,
    tile_from: TileId,
    tile_to: Option<TileId>,
    position_from: Vec3,
    position_to: Vec3,
    position: Vec3,
    progress: f32,
    progress_factor: f32,
    direction: Direction,
    direction_change: DirectionChange,
    angle_from: f32,
    angle_to: f32,
    angle: f32,
    model_offset: f32,
}

impl Motion {
    /// Places an enemy on the center of `tile`, facing along the tile's path.
    ///
    /// A tile without a next hop yields a motion that never moves.
    #[must_use]
    pub fn spawn_onto(board: &Board, tile: TileId, profile: EnemyProfile) -> Self {
        let profile = EnemyProfile::new(
            profile.speed().max(0.0),
            profile
                .path_offset()
                .clamp(-PATH_OFFSET_LIMIT, PATH_OFFSET_LIMIT),
        );
        let spawn = board.tile(tile);
        let center = spawn.position();

        let mut motion = Self {
            profile,
            phase: Phase::Intro,
            has_path: false,
            tile_from: tile,
            tile_to: None,
            position_from: center,
            position_to: center,
            position: center,
            progress: 0.0,
            progress_factor: 0.0,
            direction: Direction::North,
            direction_change: DirectionChange::None,
            angle_from: Direction::North.angle(),
            angle_to: Direction::North.angle(),
            angle: Direction::North.angle(),
            model_offset: profile.path_offset(),
        };

        let Some(step) = spawn.path_step() else {
            trace!(tile = ?spawn.coord(), "spawned without a path");
            return motion;
        };

        motion.has_path = true;
        motion.tile_to = Some(step.next());
        motion.position_to = step.exit_point();
        motion.direction = step.direction();
        motion.face_forward();
        motion
    }

    /// Moves the enemy forward by `delta_seconds` of simulated time.
    ///
    /// Progress left over when a segment ends carries into the following
    /// segments, converted through their own rates, so no distance is lost
    /// across boundaries regardless of how segment speeds differ.
    pub fn advance(&mut self, board: &Board, delta_seconds: f32) -> Advance {
        if self.phase == Phase::Finished {
            return Advance::ReachedDestination;
        }

        self.progress += delta_seconds * self.progress_factor;
        while self.progress >= 1.0 {
            let Some(next) = self.tile_to else {
                self.finish();
                return Advance::ReachedDestination;
            };
            let overshoot_seconds = (self.progress - 1.0) / self.progress_factor;
            self.prepare_next_segment(board, next);
            self.progress = overshoot_seconds * self.progress_factor;
        }

        if self.direction_change == DirectionChange::None {
            self.position = self.position_from.lerp(self.position_to, self.progress);
        } else {
            self.angle = self.angle_from + (self.angle_to - self.angle_from) * self.progress;
        }
        Advance::Continuing
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
        self.has_path = false;
        self.progress = 1.0;
        self.position = self.position_to;
        self.angle = self.angle_to;
    }

    fn prepare_next_segment(&mut self, board: &Board, next: TileId) {
        self.tile_from = next;
        let tile = board.tile(next);
        self.tile_to = tile.next_on_path();
        self.position_from = self.position_to;
        self.angle_from = self.angle_to;

        let Some(step) = tile.path_step() else {
            self.prepare_outro(tile.position());
            trace!(tile = ?tile.coord(), "outro prepared");
            return;
        };

        self.phase = Phase::Following;
        self.position_to = step.exit_point();
        self.direction_change = self.direction.change_to(step.direction());
        self.direction = step.direction();

        let speed = self.profile.speed();
        let path_offset = self.profile.path_offset();
        match self.direction_change {
            DirectionChange::None => self.face_forward(),
            DirectionChange::TurnRight => {
                self.angle_to = self.angle_from + 90.0;
                self.model_offset = path_offset - 0.5;
                self.position = self.position_from + self.direction.half_vector();
                self.progress_factor = speed / (PI * 0.5 * (0.5 - path_offset));
            }
            DirectionChange::TurnLeft => {
                self.angle_to = self.angle_from - 90.0;
                self.model_offset = path_offset + 0.5;
                self.position = self.position_from + self.direction.half_vector();
                self.progress_factor = speed / (PI * 0.5 * (0.5 + path_offset));
            }
            DirectionChange::TurnAround => {
                self.angle_to =
                    self.angle_from + if path_offset < 0.0 { 180.0 } else { -180.0 };
                self.model_offset = path_offset;
                self.position = self.position_from;
                self.progress_factor =
                    speed / (PI * path_offset.abs().max(TURN_AROUND_MIN_RADIUS));
            }
        }
        trace!(
            tile = ?tile.coord(),
            direction = ?self.direction,
            change = ?self.direction_change,
            "segment prepared"
        );
    }

    fn face_forward(&mut self) {
        self.direction_change = DirectionChange::None;
        self.angle_to = self.direction.angle();
        self.angle = self.angle_to;
        self.model_offset = self.profile.path_offset();
        self.progress_factor = match self.phase {
            Phase::Intro | Phase::Outro => 2.0 * self.profile.speed(),
            Phase::Following | Phase::Finished => self.profile.speed(),
        };
    }

    fn prepare_outro(&mut self, center: Vec3) {
        self.phase = Phase::Outro;
        self.position_to = center;
        self.face_forward();
    }

    /// Pivot of the enemy: its point on the center line, or the turn pivot while turning.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Visible location of the enemy, including its lateral path offset.
    #[must_use]
    pub fn model_position(&self) -> Vec3 {
        self.position + self.rotation() * Vec3::new(self.model_offset, 0.0, 0.0)
    }

    /// Current heading in degrees; may leave `0..360` after several turns.
    #[must_use]
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// Current orientation about the up axis.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        rotation_for_angle(self.angle)
    }

    /// Heading of the current segment's end.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Turn performed by the current segment.
    #[must_use]
    pub const fn direction_change(&self) -> DirectionChange {
        self.direction_change
    }

    /// Fraction of the current segment already covered.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Stage of the walk.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Tile the current segment belongs to.
    #[must_use]
    pub const fn tile_from(&self) -> TileId {
        self.tile_from
    }

    /// Tile the enemy heads into next, absent during the outro.
    #[must_use]
    pub const fn tile_to(&self) -> Option<TileId> {
        self.tile_to
    }

    /// Reports whether the enemy still has a walk ahead of it.
    ///
    /// False for an enemy spawned on a tile without a route and for one that
    /// has finished its walk. The outro counts as remaining path.
    #[must_use]
    pub const fn has_path(&self) -> bool {
        self.has_path
    }

    /// Reports whether towers may aim at the enemy.
    #[must_use]
    pub fn is_valid_target(&self) -> bool {
        self.phase == Phase::Following
    }

    /// Movement parameters the enemy was spawned with.
    #[must_use]
    pub const fn profile(&self) -> EnemyProfile {
        self.profile
    }
}
