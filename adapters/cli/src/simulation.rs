//! Headless simulation loop driving the world with seeded enemy releases.

use std::{fmt, time::Duration};

use anyhow::{bail, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tile_defence_core::{Command, EnemyProfile, Event, GameOutcome};
use tile_defence_world::{self as world, query, World};
use tracing::{debug, info};

use crate::{config::SimulationConfig, layout::LayoutFile};

/// Totals gathered over a simulation run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) ticks: u64,
    pub(crate) spawned: u64,
    pub(crate) reached_destination: u64,
    pub(crate) victories: u32,
    pub(crate) defeats: u32,
    pub(crate) health: u32,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks simulated:      {}", self.ticks)?;
        writeln!(f, "enemies spawned:      {}", self.spawned)?;
        writeln!(f, "reached destination:  {}", self.reached_destination)?;
        writeln!(f, "victories:            {}", self.victories)?;
        writeln!(f, "defeats:              {}", self.defeats)?;
        write!(f, "player health:        {}", self.health)
    }
}

/// World plus the scenario driver that releases enemies into it.
#[derive(Debug)]
pub(crate) struct Simulation {
    config: SimulationConfig,
    world: World,
    rng: ChaCha8Rng,
    released: u32,
    until_next_release: Duration,
    scenario_finished: bool,
    summary: Summary,
}

impl Simulation {
    /// Builds a world from the configuration and, if given, a layout.
    pub(crate) fn new(config: SimulationConfig, layout: Option<LayoutFile>) -> Result<Self> {
        let mut world = World::with_config(config.world_config());
        if let Some(layout) = layout {
            let mut events = Vec::new();
            world::apply(
                &mut world,
                Command::LoadLayout {
                    size: layout.size,
                    roles: layout.roles,
                },
                &mut events,
            );
            for event in events {
                if let Event::LayoutRejected { reason } = event {
                    bail!("layout rejected by the board: {reason}");
                }
            }
        }

        let health = query::player_health(&world);
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            world,
            released: 0,
            until_next_release: Duration::ZERO,
            scenario_finished: false,
            summary: Summary {
                health,
                ..Summary::default()
            },
        })
    }

    /// Read-only access to the simulated world.
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Advances the simulation by `ticks` ticks and returns the running totals.
    pub(crate) fn run(&mut self, ticks: u64) -> &Summary {
        for _ in 0..ticks {
            self.step();
        }
        &self.summary
    }

    fn step(&mut self) {
        let mut commands = Vec::with_capacity(3);
        if self.released < self.config.enemy_count {
            if self.until_next_release.is_zero() {
                commands.push(self.next_enemy());
                self.released += 1;
                self.until_next_release = self.config.spawn_interval();
            }
        } else if !self.scenario_finished {
            commands.push(Command::FinishScenario);
            self.scenario_finished = true;
        }

        let tick = self.config.tick();
        commands.push(Command::Tick { dt: tick });
        self.until_next_release = self.until_next_release.saturating_sub(tick);

        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        self.summary.ticks += 1;
        for event in events {
            self.record(event);
        }
    }

    fn next_enemy(&mut self) -> Command {
        let spawn_points = query::spawn_points(&self.world).len().max(1);
        let spawn_point = self.rng.gen_range(0..spawn_points);
        let speed = self
            .rng
            .gen_range(self.config.speed_min..=self.config.speed_max);
        let path_offset = self
            .rng
            .gen_range(self.config.path_offset_min..=self.config.path_offset_max);
        Command::SpawnEnemy {
            spawn_point,
            profile: EnemyProfile::new(speed, path_offset),
        }
    }

    fn record(&mut self, event: Event) {
        debug!(?event, "world event");
        match event {
            Event::EnemySpawned { .. } => self.summary.spawned += 1,
            Event::EnemyReachedDestination { .. } => self.summary.reached_destination += 1,
            Event::PlayerHealthChanged { health } => self.summary.health = health,
            Event::GameOver { outcome } => {
                info!(?outcome, tick = self.summary.ticks, "game finished");
                match outcome {
                    GameOutcome::Victory => self.summary.victories += 1,
                    GameOutcome::Defeat => self.summary.defeats += 1,
                }
            }
            Event::GameStarted => {
                self.released = 0;
                self.until_next_release = Duration::ZERO;
                self.scenario_finished = false;
            }
            _ => {}
        }
    }
}
