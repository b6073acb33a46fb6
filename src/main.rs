//! Tilt Maze headless runner
//!
//! Generates a maze and drives a session with a simple steering autopilot,
//! logging events and the outcome. In the browser the library's start hook
//! is the entry point instead.
//!
//! Usage: `tilt-maze [difficulty] [frames] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tilt Maze (native) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let difficulty = arg_or(&args, 0, 5u32);
    let frames = arg_or(&args, 1, 1800u32);
    let seed: Option<u64> = args.get(2).and_then(|s| s.parse().ok());

    if let Err(e) = headless::run(difficulty, frames, seed) {
        log::error!("Run failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is the library's start hook, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn arg_or<T: std::str::FromStr + Copy + std::fmt::Display>(args: &[String], idx: usize, default: T) -> T {
    match args.get(idx) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring argument '{}', using {}", raw, default);
            default
        }),
        None => default,
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use tilt_maze::consts::DEFAULT_FRAME_DELTA_MS;
    use tilt_maze::physics::{Session, SessionEvent, SessionOptions, create_session};
    use tilt_maze::platform::{ManualClock, play_haptics};
    use tilt_maze::{ConfigError, Maze, Settings, generate, generate_with_rng};

    /// Speed the autopilot aims for along the path (world units/s)
    const CRUISE_SPEED: f32 = 140.0;
    /// Velocity error that maps to full tilt
    const TILT_GAIN: f32 = 220.0;

    pub fn run(difficulty: u32, frames: u32, seed: Option<u64>) -> Result<(), ConfigError> {
        let maze = match seed {
            Some(seed) => generate_with_rng(difficulty, &mut Pcg32::seed_from_u64(seed)),
            None => generate(difficulty),
        };

        let settings = Settings::load();
        let options = SessionOptions::from_settings(&settings, 390.0, 390.0);
        let clock = ManualClock::new(0.0);
        let mut session = create_session(&maze, options)?.with_clock(clock.clone());

        let mut earned = 0u32;
        let waypoints = route(&maze, &session);
        let mut next = 0usize;
        log::info!(
            "Autopilot route has {} waypoints, {} gates on the board",
            waypoints.len(),
            maze.laser_gates.len()
        );

        for frame in 0..frames {
            let pos = session.ball_raw_position();
            while next + 1 < waypoints.len() && pos.distance(waypoints[next]) < arrive_radius(&session) {
                next += 1;
            }
            let tilt = steer(pos, session.ball_velocity(), waypoints.get(next).copied());

            clock.advance(DEFAULT_FRAME_DELTA_MS);
            session.update(tilt.x, tilt.y, false);

            let events = session.drain_events();
            for event in &events {
                log::info!("frame {}: {:?}", frame, event);
                if let SessionEvent::CoinCollected { reward, .. } = event {
                    earned += reward;
                }
            }
            play_haptics(&events, &settings);

            if session.phase().is_terminal() {
                break;
            }
        }

        let outcome = if session.goal_reached() {
            "goal reached"
        } else if session.game_over() {
            "hit a laser gate"
        } else {
            "ran out of frames"
        };
        println!(
            "{} ({}): {}, {} coins earned, ball at ({:.1}, {:.1})",
            maze.name,
            maze.id,
            outcome,
            earned,
            session.ball_x(),
            session.ball_y()
        );
        Ok(())
    }

    /// Cell-center waypoints from start to goal in world coordinates
    fn route(maze: &Maze, session: &Session) -> Vec<Vec2> {
        let transform = session.world().transform();
        let path = maze.passages().zip(maze.start_cell()).zip(maze.end_cell()).and_then(
            |((grid, start), goal)| grid.shortest_path(start, goal),
        );
        match path {
            Some(cells) => cells
                .into_iter()
                .map(|cell| transform.to_world(tilt_maze::maze::cell_center(cell, maze.cell_size)))
                .collect(),
            None => {
                log::warn!("No route through {}, steering straight at the goal", maze.id);
                vec![transform.to_world(maze.end_position)]
            }
        }
    }

    fn arrive_radius(session: &Session) -> f32 {
        let maze = session.maze();
        maze.corridor_width() * session.world().transform().scale * 0.3
    }

    /// Tilt that pushes the ball's velocity toward the waypoint
    fn steer(pos: Vec2, velocity: Vec2, target: Option<Vec2>) -> Vec2 {
        let Some(target) = target else {
            return Vec2::ZERO;
        };
        let desired = (target - pos).normalize_or_zero() * CRUISE_SPEED;
        ((desired - velocity) / TILT_GAIN).clamp_length_max(1.0)
    }
}
