//! TOML configuration for headless simulation runs.

use std::{fs, path::Path, time::Duration};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use tile_defence_core::BoardSize;
use tile_defence_world::WorldConfig;

/// Parameters of a simulation run. Every field falls back to its default.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SimulationConfig {
    /// Board columns used when no layout file is given.
    pub(crate) board_width: u32,
    /// Board rows used when no layout file is given.
    pub(crate) board_height: u32,
    /// Health the player starts every game with; zero disables defeat.
    pub(crate) starting_health: u32,
    /// Delay between deciding and announcing a game's outcome.
    pub(crate) game_over_delay_ms: u64,
    /// Simulated time advanced per tick.
    pub(crate) tick_ms: u64,
    /// Number of ticks to simulate.
    pub(crate) ticks: u64,
    /// Enemies released per game before the scenario finishes.
    pub(crate) enemy_count: u32,
    /// Simulated time between two enemy releases.
    pub(crate) spawn_interval_ms: u64,
    /// Slowest enemy speed in tiles per second.
    pub(crate) speed_min: f32,
    /// Fastest enemy speed in tiles per second.
    pub(crate) speed_max: f32,
    /// Leftmost lateral path offset.
    pub(crate) path_offset_min: f32,
    /// Rightmost lateral path offset.
    pub(crate) path_offset_max: f32,
    /// Seed for spawn point, speed and offset selection.
    pub(crate) seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            board_width: 11,
            board_height: 11,
            starting_health: 10,
            game_over_delay_ms: 1_000,
            tick_ms: 50,
            ticks: 2_400,
            enemy_count: 20,
            spawn_interval_ms: 1_500,
            speed_min: 0.8,
            speed_max: 1.6,
            path_offset_min: -0.4,
            path_offset_max: 0.4,
            seed: 0x7d1e_5eed,
        }
    }
}

impl SimulationConfig {
    /// Reads and validates a configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read simulation config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid simulation config at {}", path.display()))
    }

    /// Parses and validates configuration text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse simulation config toml contents")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.board_width > 0 && self.board_height > 0,
            "board must be at least one tile wide and tall, got {}x{}",
            self.board_width,
            self.board_height
        );
        ensure!(self.tick_ms > 0, "tick_ms must be positive");
        ensure!(
            self.speed_min > 0.0 && self.speed_min <= self.speed_max,
            "speed range {}..={} is empty or not positive",
            self.speed_min,
            self.speed_max
        );
        ensure!(
            self.path_offset_min <= self.path_offset_max,
            "path offset range {}..={} is empty",
            self.path_offset_min,
            self.path_offset_max
        );
        ensure!(
            self.path_offset_min > -0.5 && self.path_offset_max < 0.5,
            "path offsets must stay within half a tile of the center line"
        );
        Ok(())
    }

    pub(crate) fn board_size(&self) -> BoardSize {
        BoardSize::new(self.board_width, self.board_height)
    }

    pub(crate) fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub(crate) fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    pub(crate) fn world_config(&self) -> WorldConfig {
        WorldConfig::new(
            self.board_size(),
            self.starting_health,
            Duration::from_millis(self.game_over_delay_ms),
        )
    }
}
