use glam::Vec3;
use proptest::prelude::*;
use tile_defence_board::{Board, TileId};
use tile_defence_core::{
    BlockingContent, BoardSize, Direction, DirectionChange, EnemyProfile, TileContent, TileCoord,
};
use tile_defence_system_motion::{Advance, Motion, Phase};

const E: TileContent = TileContent::Empty;
const W: TileContent = TileContent::Wall;
const S: TileContent = TileContent::SpawnPoint;
const D: TileContent = TileContent::Destination;

fn tile(board: &Board, x: u32, y: u32) -> TileId {
    board.tile_at(TileCoord::new(x, y)).expect("tile on board")
}

fn corridor(length: u32) -> Board {
    let mut board = Board::new(BoardSize::new(length, 1));
    board
        .set_destination(TileCoord::new(length - 1, 0))
        .expect("destination placed");
    board
}

/// East along the bottom row, then a left turn north into the destination.
fn left_hook() -> Board {
    let mut board = Board::new(BoardSize::new(3, 2));
    board.load_layout(&[S, E, E, E, E, D]).expect("layout accepted");
    board
}

/// North, right turn east, right turn south into the destination.
fn snake() -> Board {
    let mut board = Board::new(BoardSize::new(3, 3));
    board
        .load_layout(&[S, W, D, E, W, E, E, E, E])
        .expect("layout accepted");
    board
}

#[test]
fn straight_walk_of_three_tiles_takes_three_seconds() {
    let board = corridor(4);
    let spawn = tile(&board, 0, 0);
    assert_eq!(board.tile(spawn).distance(), 3);
    let mut motion = Motion::spawn_onto(&board, spawn, EnemyProfile::new(1.0, 0.0));

    assert_eq!(motion.advance(&board, 2.99), Advance::Continuing);
    assert_eq!(motion.phase(), Phase::Outro);
    assert_eq!(motion.advance(&board, 0.02), Advance::ReachedDestination);
    assert_eq!(motion.phase(), Phase::Finished);
}

#[test]
fn small_steps_reach_the_destination_on_time() {
    let board = corridor(4);
    let mut motion = Motion::spawn_onto(&board, tile(&board, 0, 0), EnemyProfile::new(2.0, 0.0));

    let mut steps = 0;
    while motion.advance(&board, 0.01) == Advance::Continuing {
        steps += 1;
        assert!(steps < 1_000, "motion never finished");
    }
    assert!((148..=150).contains(&steps), "finished after {steps} steps");
}

#[test]
fn left_turn_sweeps_heading_monotonically() {
    let board = left_hook();
    let mut motion = Motion::spawn_onto(&board, tile(&board, 0, 0), EnemyProfile::default());

    let _ = motion.advance(&board, 1.5 + 1e-4);
    assert_eq!(motion.direction_change(), DirectionChange::TurnLeft);
    assert_eq!(motion.direction(), Direction::North);
    assert_eq!(motion.tile_from(), tile(&board, 2, 0));
    assert!((motion.angle() - 90.0).abs() < 0.1);

    let pivot = motion.position();
    assert!((pivot - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-4);

    let mut previous = motion.angle();
    while motion.direction_change() == DirectionChange::TurnLeft {
        let _ = motion.advance(&board, 0.01);
        if motion.direction_change() != DirectionChange::TurnLeft {
            break;
        }
        assert!(motion.angle() <= previous, "heading went backwards");
        assert!(motion.angle() >= 0.0);
        assert!(
            (motion.model_position().distance(pivot) - 0.5).abs() < 1e-4,
            "model left the turn circle"
        );
        previous = motion.angle();
    }

    assert_eq!(motion.phase(), Phase::Outro);
    assert_eq!(motion.angle(), Direction::North.angle());
}

#[test]
fn right_turns_keep_the_lateral_offset() {
    let board = snake();
    let profile = EnemyProfile::new(1.0, 0.25);
    let mut motion = Motion::spawn_onto(&board, tile(&board, 0, 0), profile);

    // Intro plus one straight tile brings the enemy to the first corner.
    let _ = motion.advance(&board, 1.5 + 1e-4);
    assert_eq!(motion.direction_change(), DirectionChange::TurnRight);
    assert_eq!(motion.direction(), Direction::East);

    let pivot = motion.position();
    let radius = 0.5 - profile.path_offset();
    let mut previous = motion.angle();
    while motion.direction_change() == DirectionChange::TurnRight {
        assert!(
            (motion.model_position().distance(pivot) - radius).abs() < 1e-4,
            "model left the turn circle"
        );
        let _ = motion.advance(&board, 0.01);
        if motion.direction_change() == DirectionChange::TurnRight {
            assert!(motion.angle() >= previous, "heading went backwards");
            previous = motion.angle();
        }
    }

    assert_eq!(motion.direction_change(), DirectionChange::None);
    assert_eq!(motion.tile_from(), tile(&board, 1, 2));
    let expected = Vec3::new(-0.5, 0.0, 1.0) + Vec3::new(0.0, 0.0, -0.25);
    let start_of_straight = motion.model_position();
    assert!(
        (start_of_straight.x - expected.x).abs() < 0.02
            && (start_of_straight.z - expected.z).abs() < 1e-4,
        "unexpected model position {start_of_straight:?}"
    );
}

#[test]
fn reversing_the_field_mid_walk_turns_the_enemy_around() {
    let mut board = corridor(5);
    let mut motion = Motion::spawn_onto(&board, tile(&board, 1, 0), EnemyProfile::default());
    let _ = motion.advance(&board, 0.25);
    assert_eq!(motion.direction(), Direction::East);

    board
        .set_destination(TileCoord::new(0, 0))
        .expect("no spawn points to protect");

    let _ = motion.advance(&board, 0.25 + 1e-4);
    assert_eq!(motion.direction_change(), DirectionChange::TurnAround);
    assert_eq!(motion.direction(), Direction::West);
    assert_eq!(motion.tile_from(), tile(&board, 2, 0));
    let edge = Vec3::new(-0.5, 0.0, 0.0);
    assert!(motion.position().distance(edge) < 1e-4);

    let mut outcome = Advance::Continuing;
    for _ in 0..400 {
        outcome = motion.advance(&board, 0.01);
        if outcome == Advance::ReachedDestination {
            break;
        }
    }
    assert_eq!(outcome, Advance::ReachedDestination);
    let destination = board.tile(tile(&board, 0, 0)).position();
    assert!(motion.position().distance(destination) < 1e-4);
    assert_eq!(motion.direction(), Direction::West);
}

#[test]
fn wall_raised_ahead_ends_the_walk_on_the_walled_tile() {
    let mut board = corridor(4);
    let mut motion = Motion::spawn_onto(&board, tile(&board, 0, 0), EnemyProfile::default());
    assert_eq!(motion.advance(&board, 0.1), Advance::Continuing);

    let _ = board
        .toggle_blocking_content(TileCoord::new(1, 0), BlockingContent::Wall)
        .expect("no spawn points to protect");

    assert_eq!(motion.advance(&board, 0.5), Advance::Continuing);
    assert_eq!(motion.phase(), Phase::Outro);
    assert!(motion.has_path());

    assert_eq!(motion.advance(&board, 0.45), Advance::ReachedDestination);
    let walled = tile(&board, 1, 0);
    assert_eq!(motion.tile_from(), walled);
    assert!(motion.position().distance(board.tile(walled).position()) < 1e-4);
    assert!(!motion.has_path());
}

#[test]
fn model_travels_at_constant_speed() {
    let board = snake();
    let speed = 1.3;
    let mut motion = Motion::spawn_onto(&board, tile(&board, 0, 0), EnemyProfile::new(speed, 0.2));

    let dt = 0.001;
    let steps = 2_500;
    let mut travelled = 0.0;
    let mut last = motion.model_position();
    for _ in 0..steps {
        assert_eq!(motion.advance(&board, dt), Advance::Continuing);
        let now = motion.model_position();
        travelled += now.distance(last);
        last = now;
    }

    let expected = speed * dt * steps as f32;
    assert!(
        (travelled - expected).abs() < 0.01,
        "travelled {travelled}, expected {expected}"
    );
}

proptest! {
    #[test]
    fn chunked_advances_match_a_single_advance(
        use_snake in any::<bool>(),
        speed in 0.5f32..3.0,
        path_offset in -0.4f32..0.4,
        chunks in prop::collection::vec(0.005f32..0.3, 1..40),
    ) {
        let board = if use_snake { snake() } else { left_hook() };
        let spawn = tile(&board, 0, 0);
        let profile = EnemyProfile::new(speed, path_offset);

        let mut stepped = Motion::spawn_onto(&board, spawn, profile);
        let mut stepped_done = false;
        for chunk in &chunks {
            stepped_done = stepped.advance(&board, *chunk) == Advance::ReachedDestination;
        }

        let total: f32 = chunks.iter().sum();
        let mut single = Motion::spawn_onto(&board, spawn, profile);
        let single_done = single.advance(&board, total) == Advance::ReachedDestination;

        prop_assert!(
            stepped.model_position().distance(single.model_position()) < 2e-3,
            "stepped {:?} vs single {:?}",
            stepped.model_position(),
            single.model_position()
        );
        if stepped_done != single_done {
            prop_assert!(stepped.progress() > 0.99 || single.progress() > 0.99);
        }
    }
}
