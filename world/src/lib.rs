#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game session state for Tile Defence.
//!
//! The world owns the board, the enemies walking it, the player's health and
//! the deferred game-over countdown. Adapters mutate it exclusively through
//! [`apply`] and observe it through [`query`].

mod enemies;

use std::time::Duration;

use tile_defence_board::Board;
use tile_defence_core::{
    BlockingContent, BoardSize, Command, EnemyProfile, Event, GameOutcome, PlacementError,
    TileContent, TileCoord,
};
use tile_defence_system_motion::{Advance, Motion};
use tracing::{debug, info, warn};

use enemies::EnemyPool;

const DEFAULT_BOARD_SIZE: BoardSize = BoardSize::new(11, 11);
const DEFAULT_STARTING_HEALTH: u32 = 10;
const DEFAULT_GAME_OVER_DELAY: Duration = Duration::from_secs(1);

/// Session parameters fixed for the lifetime of a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    board_size: BoardSize,
    starting_health: u32,
    game_over_delay: Duration,
}

impl WorldConfig {
    /// Creates a configuration.
    ///
    /// A `starting_health` of zero disables defeat altogether.
    #[must_use]
    pub const fn new(
        board_size: BoardSize,
        starting_health: u32,
        game_over_delay: Duration,
    ) -> Self {
        Self {
            board_size,
            starting_health,
            game_over_delay,
        }
    }

    /// Board dimensions used until the board is reconfigured.
    #[must_use]
    pub const fn board_size(&self) -> BoardSize {
        self.board_size
    }

    /// Health the player starts every game with.
    #[must_use]
    pub const fn starting_health(&self) -> u32 {
        self.starting_health
    }

    /// Simulated time between deciding an outcome and announcing it.
    #[must_use]
    pub const fn game_over_delay(&self) -> Duration {
        self.game_over_delay
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_BOARD_SIZE,
            DEFAULT_STARTING_HEALTH,
            DEFAULT_GAME_OVER_DELAY,
        )
    }
}

#[derive(Clone, Copy, Debug)]
struct Countdown {
    outcome: GameOutcome,
    remaining: Duration,
}

#[derive(Clone, Debug)]
struct SavedLayout {
    size: BoardSize,
    roles: Vec<TileContent>,
}

/// Represents the authoritative Tile Defence session.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    board: Board,
    layout: Option<SavedLayout>,
    enemies: EnemyPool,
    player_health: u32,
    scenario_finished: bool,
    countdown: Option<Countdown>,
    tick_index: u64,
}

impl World {
    /// Creates a world with the default configuration and board layout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates a world from the provided configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        let mut board = Board::new(config.board_size());
        board.reset_to_default_layout();
        Self {
            config,
            board,
            layout: None,
            enemies: EnemyPool::default(),
            player_health: config.starting_health(),
            scenario_finished: false,
            countdown: None,
            tick_index: 0,
        }
    }

    fn restore_layout(&mut self) {
        let Some(layout) = &self.layout else {
            self.board.reset_to_default_layout();
            return;
        };
        if self.board.size() != layout.size {
            self.board.resize(layout.size);
        }
        if let Err(error) = self.board.load_layout(&layout.roles) {
            warn!(%error, "saved layout no longer applies, restoring default layout");
            self.board.reset_to_default_layout();
        }
    }

    fn begin_new_game(&mut self, out_events: &mut Vec<Event>) {
        self.enemies.clear();
        self.restore_layout();
        self.player_health = self.config.starting_health();
        self.scenario_finished = false;
        self.countdown = None;
        info!(health = self.player_health, "new game started");
        out_events.push(Event::GameStarted);
        out_events.push(Event::PlayerHealthChanged {
            health: self.player_health,
        });
    }

    fn toggle(&mut self, tile: TileCoord, content: BlockingContent, out_events: &mut Vec<Event>) {
        match self.board.toggle_blocking_content(tile, content) {
            Ok(toggle) => {
                let content = self
                    .board
                    .tile_at(tile)
                    .map_or(TileContent::Empty, |id| self.board.tile(id).content());
                debug!(?tile, ?toggle, "tile content changed");
                out_events.push(Event::ContentChanged { tile, content });
            }
            Err(reason) => reject(tile, reason, out_events),
        }
    }

    fn spawn_enemy(
        &mut self,
        spawn_point: usize,
        profile: EnemyProfile,
        out_events: &mut Vec<Event>,
    ) {
        let spawn_points = self.board.spawn_points();
        if spawn_points.is_empty() {
            warn!("enemy spawn requested on a board without spawn points");
            out_events.push(Event::EnemySpawnRejected);
            return;
        }

        let tile = spawn_points[spawn_point % spawn_points.len()];
        let motion = Motion::spawn_onto(&self.board, tile, profile);
        let coord = self.board.tile(tile).coord();
        if !motion.has_path() {
            warn!(?coord, "enemy spawned on a tile without a path");
        }
        let enemy = self.enemies.spawn(tile, motion);
        debug!(?enemy, ?coord, "enemy spawned");
        out_events.push(Event::EnemySpawned { enemy, tile: coord });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });

        if let Some(countdown) = self.countdown.as_mut() {
            countdown.remaining = countdown.remaining.saturating_sub(dt);
            if countdown.remaining.is_zero() {
                let outcome = countdown.outcome;
                info!(?outcome, "game over");
                out_events.push(Event::GameOver { outcome });
                self.begin_new_game(out_events);
                return;
            }
        }

        let seconds = dt.as_secs_f32();
        let board = &self.board;
        let mut arrived = Vec::new();
        for enemy in self.enemies.iter_mut() {
            if enemy.motion_mut().advance(board, seconds) == Advance::ReachedDestination {
                arrived.push(enemy.id());
            }
        }

        for enemy in arrived {
            if self.enemies.recycle(enemy).is_none() {
                continue;
            }
            out_events.push(Event::EnemyReachedDestination { enemy });
            self.player_health = self.player_health.saturating_sub(1);
            out_events.push(Event::PlayerHealthChanged {
                health: self.player_health,
            });
        }

        self.schedule_outcome(out_events);
    }

    fn schedule_outcome(&mut self, out_events: &mut Vec<Event>) {
        if self.countdown.is_some() {
            return;
        }

        let outcome = if self.player_health == 0 && self.config.starting_health() > 0 {
            GameOutcome::Defeat
        } else if self.scenario_finished && self.enemies.is_empty() {
            GameOutcome::Victory
        } else {
            return;
        };

        let delay = self.config.game_over_delay();
        info!(?outcome, ?delay, "game over scheduled");
        self.countdown = Some(Countdown {
            outcome,
            remaining: delay,
        });
        out_events.push(Event::GameOverScheduled { outcome, delay });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn reject(tile: TileCoord, reason: PlacementError, out_events: &mut Vec<Event>) {
    debug!(?tile, %reason, "board mutation rejected");
    out_events.push(Event::PlacementRejected { tile, reason });
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureBoard { size } => {
            world.enemies.clear();
            world.layout = None;
            world.board.resize(size);
            world.board.reset_to_default_layout();
            info!(width = size.width(), height = size.height(), "board configured");
            out_events.push(Event::BoardConfigured { size });
        }
        Command::LoadLayout { size, roles } => {
            let mut board = Board::new(size);
            if let Err(reason) = board.load_layout(&roles) {
                debug!(%reason, "layout rejected");
                out_events.push(Event::LayoutRejected { reason });
                return;
            }
            world.enemies.clear();
            world.board = board;
            world.layout = Some(SavedLayout { size, roles });
            info!(
                width = size.width(),
                height = size.height(),
                spawn_points = world.board.spawn_points().len(),
                "layout loaded"
            );
            out_events.push(Event::LayoutLoaded { size });
        }
        Command::ToggleWall { tile } => world.toggle(tile, BlockingContent::Wall, out_events),
        Command::ToggleTower { tile, kind } => {
            world.toggle(tile, BlockingContent::Tower(kind), out_events);
        }
        Command::SetSpawnPoint { tile } => {
            let before = world.board.spawn_points().len();
            match world.board.set_spawn_point(tile) {
                Ok(()) if world.board.spawn_points().len() > before => {
                    out_events.push(Event::SpawnPointAdded { tile });
                }
                Ok(()) => {}
                Err(reason) => reject(tile, reason, out_events),
            }
        }
        Command::RemoveSpawnPoint { tile } => match world.board.remove_spawn_point(tile) {
            Ok(()) => out_events.push(Event::SpawnPointRemoved { tile }),
            Err(reason) => reject(tile, reason, out_events),
        },
        Command::SetDestination { tile } => {
            let before = world.board.destination();
            match world.board.set_destination(tile) {
                Ok(()) if world.board.destination() != before => {
                    out_events.push(Event::DestinationChanged { tile });
                }
                Ok(()) => {}
                Err(reason) => reject(tile, reason, out_events),
            }
        }
        Command::SpawnEnemy {
            spawn_point,
            profile,
        } => world.spawn_enemy(spawn_point, profile, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::FinishScenario => {
            debug!("scenario finished");
            world.scenario_finished = true;
        }
        Command::BeginNewGame => world.begin_new_game(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec3;
    use tile_defence_board::Board;
    use tile_defence_core::{Direction, EnemyId, GameOutcome, TileCoord};
    use tile_defence_system_motion::Phase;

    use super::{enemies::Enemy, World, WorldConfig};

    /// Provides read-only access to the board and its flow field.
    #[must_use]
    pub fn board(world: &World) -> &Board {
        &world.board
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Health the player has left.
    #[must_use]
    pub fn player_health(world: &World) -> u32 {
        world.player_health
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Reports whether the scenario has announced that no more enemies will spawn.
    #[must_use]
    pub fn scenario_finished(world: &World) -> bool {
        world.scenario_finished
    }

    /// Outcome awaiting announcement and the simulated time left before it fires.
    #[must_use]
    pub fn pending_outcome(world: &World) -> Option<(GameOutcome, Duration)> {
        world
            .countdown
            .map(|countdown| (countdown.outcome, countdown.remaining))
    }

    /// Coordinates of the spawn points in designation order.
    #[must_use]
    pub fn spawn_points(world: &World) -> Vec<TileCoord> {
        world
            .board
            .spawn_points()
            .iter()
            .map(|id| world.board.tile(*id).coord())
            .collect()
    }

    /// Coordinate of the destination, if one is set.
    #[must_use]
    pub fn destination(world: &World) -> Option<TileCoord> {
        world
            .board
            .destination()
            .map(|id| world.board.tile(id).coord())
    }

    /// Number of enemies currently walking the board.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Captures the state of a single enemy, if the id is still live.
    #[must_use]
    pub fn enemy(world: &World, id: EnemyId) -> Option<EnemySnapshot> {
        world
            .enemies
            .get(id)
            .map(|enemy| EnemySnapshot::capture(&world.board, enemy))
    }

    /// Captures a read-only view of every live enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let mut snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot::capture(&world.board, enemy))
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        EnemyView { snapshots }
    }

    /// Read-only snapshot describing all enemies on the board.
    #[derive(Clone, Debug)]
    pub struct EnemyView {
        snapshots: Vec<EnemySnapshot>,
    }

    impl EnemyView {
        /// Iterator over the captured snapshots ordered by id.
        pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots.iter()
        }

        /// Number of captured snapshots.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether no enemy was captured.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<EnemySnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single enemy's state used for queries.
    #[derive(Clone, Debug, PartialEq)]
    pub struct EnemySnapshot {
        /// Identifier assigned to the enemy.
        pub id: EnemyId,
        /// Spawn point the enemy entered on.
        pub spawn: TileCoord,
        /// Tile the enemy's current segment belongs to.
        pub tile: TileCoord,
        /// Pivot of the enemy's transform.
        pub position: Vec3,
        /// Visible location including the lateral path offset.
        pub model_position: Vec3,
        /// Heading in degrees.
        pub angle: f32,
        /// Heading of the current segment.
        pub direction: Direction,
        /// Stage of the enemy's walk.
        pub phase: Phase,
        /// Indicates whether the enemy still has a walk ahead of it.
        pub has_path: bool,
        /// Indicates whether towers may aim at the enemy.
        pub is_valid_target: bool,
    }

    impl EnemySnapshot {
        fn capture(board: &Board, enemy: &Enemy) -> Self {
            let motion = enemy.motion();
            Self {
                id: enemy.id(),
                spawn: board.tile(enemy.spawn()).coord(),
                tile: board.tile(motion.tile_from()).coord(),
                position: motion.position(),
                model_position: motion.model_position(),
                angle: motion.angle(),
                direction: motion.direction(),
                phase: motion.phase(),
                has_path: motion.has_path(),
                is_valid_target: motion.is_valid_target(),
            }
        }
    }
}
