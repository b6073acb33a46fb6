//! End-to-end session scenarios driven through the public API

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use tilt_maze::maze::{
    Coin, GateDirection, GatePlacement, GateTiming, LaserGate, Maze, TimingPattern,
};
use tilt_maze::physics::{SessionEvent, SessionOptions, SessionPhase, create_session};
use tilt_maze::platform::ManualClock;
use tilt_maze::{QualityTier, generate_with_rng};

const FRAME_MS: f64 = 1000.0 / 60.0;

fn open_maze(start: Vec2, end: Vec2) -> Maze {
    Maze {
        id: "scenario".into(),
        name: "Scenario".into(),
        walls: vec![],
        laser_gates: vec![],
        coins: vec![],
        start_position: start,
        end_position: end,
        difficulty: 1,
        cols: 5,
        rows: 5,
        cell_size: 60.0,
        wall_thickness: 4.0,
    }
}

fn gate_over(center: Vec2, on_duration: f64) -> LaserGate {
    LaserGate {
        id: 42,
        x: center.x - 20.0,
        y: center.y - 3.0,
        width: 40.0,
        height: 6.0,
        direction: GateDirection::Horizontal,
        timing: GateTiming {
            interval: 1000.0,
            phase: 0.0,
            on_duration,
        },
        pattern: TimingPattern::Steady,
        placement: GatePlacement::Chokepoint,
        cell: (2, 2),
    }
}

#[test]
fn test_speed_cap_convergence() {
    let maze = open_maze(Vec2::new(20.0, 150.0), Vec2::new(150.0, -1000.0));
    let options = SessionOptions {
        width: 2000.0,
        height: 300.0,
        gravity_scale: 4.0,
        quality: QualityTier::High,
        ..SessionOptions::default()
    };
    let max = QualityTier::High.max_velocity();
    let mut session = create_session(&maze, options).unwrap();

    let mut top_speed = 0.0f32;
    for frame in 0..60 {
        session.update_at(frame as f64 * FRAME_MS, 1.0, 0.0, false);
        top_speed = top_speed.max(session.ball_velocity().length());
    }

    assert!(top_speed <= max * 1.0001, "top speed {}", top_speed);
    let final_speed = session.ball_velocity().length();
    assert!(
        final_speed > max * QualityTier::High.soft_cap_fraction(),
        "final speed {}",
        final_speed
    );
    assert_eq!(session.phase(), SessionPhase::Running);
}

#[test]
fn test_ball_rolls_into_goal() {
    let maze = open_maze(Vec2::new(150.0, 90.0), Vec2::new(150.0, 210.0));
    let mut session = create_session(&maze, SessionOptions::default()).unwrap();

    let mut events = Vec::new();
    for frame in 0..120 {
        session.update_at(frame as f64 * FRAME_MS, 0.0, 1.0, false);
        events.extend(session.drain_events());
    }

    assert!(session.goal_reached());
    assert!(!session.game_over());
    assert_eq!(session.phase(), SessionPhase::GoalReached);
    assert_eq!(events, vec![SessionEvent::GoalReached]);

    // Reset brings the run back
    session.reset_at(5_000.0);
    assert!(!session.goal_reached());
    assert_eq!(session.phase(), SessionPhase::Running);
    assert_eq!(session.ball_raw_position(), session.world().start());
}

#[test]
fn test_lit_hazard_ends_run_once() {
    let start = Vec2::new(150.0, 150.0);
    let mut maze = open_maze(start, Vec2::new(30.0, 30.0));
    maze.laser_gates.push(gate_over(start, 0.99));
    let mut session = create_session(&maze, SessionOptions::default()).unwrap();

    let mut hits = 0;
    for frame in 0..30 {
        session.update_at(frame as f64 * FRAME_MS, 0.0, 0.0, false);
        hits += session
            .drain_events()
            .iter()
            .filter(|e| matches!(e, SessionEvent::HazardHit { gate_id: 42 }))
            .count();
    }

    assert!(session.game_over());
    assert_eq!(session.phase(), SessionPhase::GameOver);
    assert_eq!(hits, 1);
}

#[test]
fn test_dark_hazard_is_harmless() {
    let start = Vec2::new(150.0, 150.0);
    let mut maze = open_maze(start, Vec2::new(30.0, 30.0));
    maze.laser_gates.push(gate_over(start, 0.0));
    let mut session = create_session(&maze, SessionOptions::default()).unwrap();

    for frame in 0..30 {
        session.update_at(frame as f64 * FRAME_MS, 0.0, 0.0, false);
    }
    assert!(!session.game_over());
    assert_eq!(session.phase(), SessionPhase::Running);
}

#[test]
fn test_coin_rewarded_once_then_removed() {
    let start = Vec2::new(150.0, 150.0);
    let mut maze = open_maze(start, Vec2::new(30.0, 30.0));
    maze.coins.push(Coin {
        id: 3,
        position: start,
        value: 1,
        is_special: false,
    });
    let clock = ManualClock::new(0.0);
    let mut session = create_session(&maze, SessionOptions::default())
        .unwrap()
        .with_clock(clock.clone());

    let mut rewards = Vec::new();
    for _ in 0..10 {
        clock.advance(FRAME_MS);
        session.update(0.0, 0.0, false);
        rewards.extend(session.drain_events());
    }

    assert_eq!(
        rewards,
        vec![SessionEvent::CoinCollected {
            coin_id: 3,
            reward: 1,
            special: false
        }]
    );
    assert!(session.maze().coins.is_empty());
    assert_eq!(session.collected_count(), 1);
}

#[test]
fn test_generated_levels_bind_to_sessions() {
    for (difficulty, seed) in [(1, 1u64), (10, 2), (20, 3)] {
        let maze = generate_with_rng(difficulty, &mut Pcg32::seed_from_u64(seed));
        if difficulty == 1 {
            assert!(maze.laser_gates.is_empty());
        }
        let mut session = create_session(&maze, SessionOptions::default()).unwrap();
        for frame in 0..120 {
            session.update_at(frame as f64 * FRAME_MS, 0.6, 0.9, false);
            let pos = session.ball_raw_position();
            let bounds = session.world().bounds();
            assert!(bounds.contains(pos), "ball escaped to {:?}", pos);
        }
    }
}
