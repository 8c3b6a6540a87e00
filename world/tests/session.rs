use std::time::Duration;

use tile_defence_core::{
    BoardSize, Command, Direction, EnemyProfile, Event, GameOutcome, PlacementError, TileContent,
    TileCoord, TowerKind,
};
use tile_defence_world::{self as world, query, World, WorldConfig};

const QUARTER_SECOND: Duration = Duration::from_millis(250);

fn coord(x: u32, y: u32) -> TileCoord {
    TileCoord::new(x, y)
}

fn run(world: &mut World, commands: impl IntoIterator<Item = Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn tick(world: &mut World) -> Vec<Event> {
    run(world, [Command::Tick { dt: QUARTER_SECOND }])
}

fn spawn(profile: EnemyProfile) -> Command {
    Command::SpawnEnemy {
        spawn_point: 0,
        profile,
    }
}

/// Spawn point at (0, 0), destination at (1, 0): one second of walking at speed one.
fn short_corridor(starting_health: u32) -> World {
    World::with_config(WorldConfig::new(
        BoardSize::new(3, 1),
        starting_health,
        Duration::from_millis(500),
    ))
}

#[test]
fn enemies_reaching_the_destination_cost_health_and_trigger_defeat() {
    let mut world = short_corridor(2);
    let spawned = run(
        &mut world,
        [spawn(EnemyProfile::default()), spawn(EnemyProfile::default())],
    );
    let ids: Vec<_> = spawned
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .collect();
    assert_eq!(ids.len(), 2);

    for _ in 0..3 {
        let events = tick(&mut world);
        assert_eq!(events, vec![Event::TimeAdvanced { dt: QUARTER_SECOND }]);
    }

    let events = tick(&mut world);
    assert_eq!(
        events,
        vec![
            Event::TimeAdvanced { dt: QUARTER_SECOND },
            Event::EnemyReachedDestination { enemy: ids[0] },
            Event::PlayerHealthChanged { health: 1 },
            Event::EnemyReachedDestination { enemy: ids[1] },
            Event::PlayerHealthChanged { health: 0 },
            Event::GameOverScheduled {
                outcome: GameOutcome::Defeat,
                delay: Duration::from_millis(500),
            },
        ]
    );
    assert!(query::enemy(&world, ids[0]).is_none());
    assert_eq!(query::enemy_count(&world), 0);

    assert_eq!(
        tick(&mut world),
        vec![Event::TimeAdvanced { dt: QUARTER_SECOND }]
    );
    assert_eq!(
        tick(&mut world),
        vec![
            Event::TimeAdvanced { dt: QUARTER_SECOND },
            Event::GameOver {
                outcome: GameOutcome::Defeat
            },
            Event::GameStarted,
            Event::PlayerHealthChanged { health: 2 },
        ]
    );
    assert_eq!(query::player_health(&world), 2);
    assert!(query::pending_outcome(&world).is_none());
}

#[test]
fn zero_starting_health_never_loses() {
    let mut world = short_corridor(0);
    let _ = run(&mut world, [spawn(EnemyProfile::default())]);

    for _ in 0..8 {
        let events = tick(&mut world);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::GameOverScheduled { .. })));
    }
    assert_eq!(query::player_health(&world), 0);
}

#[test]
fn finished_scenario_waits_for_enemies_before_victory() {
    let mut world = short_corridor(5);
    let _ = run(
        &mut world,
        [spawn(EnemyProfile::default()), Command::FinishScenario],
    );

    for _ in 0..3 {
        assert!(query::pending_outcome(&world).is_none());
        let _ = tick(&mut world);
    }
    let events = tick(&mut world);
    assert!(events.contains(&Event::GameOverScheduled {
        outcome: GameOutcome::Victory,
        delay: Duration::from_millis(500),
    }));
    assert_eq!(query::player_health(&world), 4);
    assert!(query::scenario_finished(&world));
}

#[test]
fn zero_delay_fires_on_the_next_tick() {
    let mut world = World::with_config(WorldConfig::new(BoardSize::new(3, 3), 3, Duration::ZERO));
    let scheduled = run(
        &mut world,
        [Command::FinishScenario, Command::Tick { dt: QUARTER_SECOND }],
    );
    assert!(scheduled.contains(&Event::GameOverScheduled {
        outcome: GameOutcome::Victory,
        delay: Duration::ZERO,
    }));

    let events = tick(&mut world);
    assert!(events.contains(&Event::GameOver {
        outcome: GameOutcome::Victory
    }));
    assert!(!query::scenario_finished(&world));
}

#[test]
fn placements_are_visible_to_enemies_spawned_afterwards() {
    let mut world = World::with_config(WorldConfig::new(
        BoardSize::new(3, 3),
        10,
        Duration::from_secs(1),
    ));
    let events = run(
        &mut world,
        [
            Command::ToggleWall { tile: coord(1, 0) },
            spawn(EnemyProfile::default()),
        ],
    );
    assert_eq!(
        events[0],
        Event::ContentChanged {
            tile: coord(1, 0),
            content: TileContent::Wall
        }
    );

    let view = query::enemy_view(&world);
    let enemy = view.iter().next().expect("enemy spawned");
    assert_eq!(enemy.direction, Direction::North);
    assert_eq!(enemy.tile, coord(0, 0));
    assert!(enemy.has_path);
    assert!(!enemy.is_valid_target);
}

#[test]
fn stranding_placements_are_reported() {
    let mut world = World::with_config(WorldConfig::new(
        BoardSize::new(3, 3),
        10,
        Duration::from_secs(1),
    ));
    let events = run(
        &mut world,
        [
            Command::ToggleTower {
                tile: coord(1, 0),
                kind: TowerKind::Laser,
            },
            Command::ToggleTower {
                tile: coord(0, 1),
                kind: TowerKind::Mortar,
            },
            Command::RemoveSpawnPoint { tile: coord(0, 0) },
            Command::SetSpawnPoint { tile: coord(1, 0) },
        ],
    );

    assert_eq!(
        &events[1..],
        &[
            Event::PlacementRejected {
                tile: coord(0, 1),
                reason: PlacementError::DisconnectsSpawnPoint,
            },
            Event::PlacementRejected {
                tile: coord(0, 0),
                reason: PlacementError::LastSpawnPoint,
            },
            Event::PlacementRejected {
                tile: coord(1, 0),
                reason: PlacementError::Occupied,
            },
        ]
    );
    let towers: Vec<_> = query::board(&world).towers().map(|(_, kind)| kind).collect();
    assert_eq!(towers, vec![TowerKind::Laser]);
}

#[test]
fn new_game_restores_the_loaded_layout() {
    let mut world = World::new();
    let roles = vec![
        TileContent::SpawnPoint,
        TileContent::Wall,
        TileContent::Empty,
        TileContent::Empty,
        TileContent::Empty,
        TileContent::Destination,
    ];
    let events = run(
        &mut world,
        [
            Command::LoadLayout {
                size: BoardSize::new(3, 2),
                roles,
            },
            Command::ToggleWall { tile: coord(2, 0) },
            Command::SetSpawnPoint { tile: coord(1, 1) },
            Command::BeginNewGame,
        ],
    );
    assert_eq!(
        events[0],
        Event::LayoutLoaded {
            size: BoardSize::new(3, 2)
        }
    );
    assert!(events.contains(&Event::GameStarted));

    let board = query::board(&world);
    let content = |x, y| {
        board
            .tile(board.tile_at(coord(x, y)).expect("tile on board"))
            .content()
    };
    assert_eq!(content(1, 0), TileContent::Wall);
    assert_eq!(content(2, 0), TileContent::Empty);
    assert_eq!(content(1, 1), TileContent::Empty);
    assert_eq!(query::spawn_points(&world), vec![coord(0, 0)]);
    assert_eq!(query::destination(&world), Some(coord(2, 1)));
}

#[test]
fn spawning_without_spawn_points_is_rejected() {
    let mut world = World::new();
    let events = run(
        &mut world,
        [
            Command::LoadLayout {
                size: BoardSize::new(2, 1),
                roles: vec![TileContent::Empty, TileContent::Destination],
            },
            spawn(EnemyProfile::default()),
        ],
    );

    assert_eq!(events[1], Event::EnemySpawnRejected);
    assert!(query::enemy_view(&world).is_empty());
}

#[test]
fn enemies_walk_continuously_between_ticks() {
    let mut world = World::with_config(WorldConfig::new(
        BoardSize::new(5, 1),
        10,
        Duration::from_secs(1),
    ));
    let _ = run(&mut world, [spawn(EnemyProfile::new(1.0, 0.0))]);
    let start = query::enemy_view(&world).into_vec()[0].position;

    let _ = tick(&mut world);
    let _ = tick(&mut world);
    let _ = tick(&mut world);

    let snapshot = query::enemy_view(&world).into_vec()[0].clone();
    assert!((snapshot.position.x - (start.x + 0.75)).abs() < 1e-5);
    assert_eq!(snapshot.tile, coord(1, 0));
    assert!(snapshot.is_valid_target);
    assert_eq!(query::tick_index(&world), 3);
}
