//! Play session bound to one maze
//!
//! The session owns its world by value. Host side effects (haptics, sounds,
//! screen transitions) are never called from inside a step; they are queued
//! as `SessionEvent`s and drained by the host after `update` returns. Coin
//! bodies are made inert on contact and removed at the start of the next
//! update.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{BodyId, BodyKind};
use super::events::SessionEvent;
use super::step::{StepParams, step};
use super::timing::FrameTimer;
use super::world::World;
use crate::consts::*;
use crate::error::ConfigError;
use crate::maze::{Coin, Maze};
use crate::platform::{Clock, SystemClock};
use crate::same_direction;
use crate::settings::{QualityTier, Settings};

/// Largest accepted tilt magnitude per axis (full tilt × max sensitivity)
const MAX_TILT: f32 = 3.0;
/// Base fraction of the gap to the target gravity closed per frame
const GRAVITY_EASE_BASE: f32 = 0.2;
/// Extra easing when the player reverses direction
const GRAVITY_EASE_REVERSAL: f32 = 0.3;
/// Extra easing when the player tilts further
const GRAVITY_EASE_GROWTH: f32 = 0.1;
/// Easing lost at full speed (fraction)
const GRAVITY_EASE_SPEED_DAMPING: f32 = 0.5;

/// Construction parameters for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// World width (world units, usually screen points)
    pub width: f32,
    pub height: f32,
    /// Multiplier on `BASE_GRAVITY`
    pub gravity_scale: f32,
    pub ball_radius: f32,
    pub quality: QualityTier,
    /// Reward multiplier for special coins
    pub special_coin_multiplier: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            width: MAZE_SIZE,
            height: MAZE_SIZE,
            gravity_scale: 1.0,
            ball_radius: 8.0,
            quality: QualityTier::default(),
            special_coin_multiplier: 5,
        }
    }
}

impl SessionOptions {
    /// Options for a `width × height` play area from player settings
    pub fn from_settings(settings: &Settings, width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            quality: settings.quality,
            special_coin_multiplier: settings.special_coin_multiplier.max(1),
            ..Self::default()
        }
    }

    /// Check the options against the maze they will be used with
    pub fn validate(&self, maze: &Maze) -> Result<(), ConfigError> {
        let dims_ok = |v: f32| v.is_finite() && v > 0.0;
        if !dims_ok(self.width) || !dims_ok(self.height) || !dims_ok(maze.size()) {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !dims_ok(self.gravity_scale) {
            return Err(ConfigError::InvalidGravityScale {
                scale: self.gravity_scale,
            });
        }

        let scale = self.width.min(self.height) / maze.size();
        let corridor = maze.corridor_width() * scale;
        if !dims_ok(self.ball_radius) || 2.0 * self.ball_radius >= corridor {
            return Err(ConfigError::InvalidBallRadius {
                radius: self.ball_radius,
                corridor,
            });
        }
        Ok(())
    }
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Created, no frame seen yet
    Initializing,
    Running,
    GoalReached,
    GameOver,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::GoalReached | SessionPhase::GameOver)
    }
}

/// Host hook invoked synchronously with each coin reward
pub type RewardCallback = Box<dyn FnMut(u32)>;

/// A running play session
pub struct Session {
    options: SessionOptions,
    /// Live copy; collected coins are removed from it
    maze: Maze,
    world: World,
    phase: SessionPhase,
    tilt: Vec2,
    timer: FrameTimer,
    goal_reached: bool,
    game_over: bool,
    hazard_triggered: bool,
    collected: HashSet<u32>,
    /// Inert coin bodies to drop at the start of the next update
    pending_removals: Vec<(BodyId, u32)>,
    events: Vec<SessionEvent>,
    on_reward: Option<RewardCallback>,
    clock: Box<dyn Clock>,
}

/// Build a session for `maze`
pub fn create_session(maze: &Maze, options: SessionOptions) -> Result<Session, ConfigError> {
    Session::new(maze, options)
}

impl Session {
    pub fn new(maze: &Maze, options: SessionOptions) -> Result<Self, ConfigError> {
        options.validate(maze)?;
        let world = World::from_maze(maze, &options);
        log::info!(
            "Session created for {} ({} bodies, {:?} quality)",
            maze.id,
            world.bodies().len(),
            options.quality
        );

        Ok(Self {
            options,
            maze: maze.clone(),
            world,
            phase: SessionPhase::Initializing,
            tilt: Vec2::ZERO,
            timer: FrameTimer::new(),
            goal_reached: false,
            game_over: false,
            hazard_triggered: false,
            collected: HashSet::new(),
            pending_removals: Vec::new(),
            events: Vec::new(),
            on_reward: None,
            clock: Box::new(SystemClock),
        })
    }

    /// Replace the wall clock used by `update` and `reset`
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn set_reward_callback(&mut self, callback: impl FnMut(u32) + 'static) {
        self.on_reward = Some(Box::new(callback));
    }

    /// Advance by one host frame using the session clock
    pub fn update(&mut self, tilt_x: f32, tilt_y: f32, reset_velocity: bool) {
        let now = self.clock.now_ms();
        self.update_at(now, tilt_x, tilt_y, reset_velocity);
    }

    /// Advance by one host frame at wall-clock time `now_ms`
    pub fn update_at(&mut self, now_ms: f64, tilt_x: f32, tilt_y: f32, reset_velocity: bool) {
        self.flush_pending_removals();

        if self.phase == SessionPhase::Initializing {
            // Fresh timer: the first advance counts as one default-length frame
            self.phase = SessionPhase::Running;
            self.timer = FrameTimer::new();
            log::debug!("Session {} running", self.maze.id);
        }

        if reset_velocity {
            let ball = &mut self.world.ball;
            ball.velocity = Vec2::ZERO;
            ball.angular_velocity = 0.0;
        }

        self.tilt = sanitize_tilt(tilt_x, tilt_y);
        self.ease_gravity();

        if self.phase.is_terminal() {
            self.timer.advance(now_ms);
            self.timer.discard();
            return;
        }

        let dt = self.options.quality.fixed_step();
        let params = StepParams {
            dt,
            tilt: self.tilt,
            max_velocity: self.options.quality.max_velocity(),
            soft_cap_fraction: self.options.quality.soft_cap_fraction(),
        };

        self.timer.advance(now_ms);
        let mut steps = 0;
        while steps < MAX_STEPS_PER_FRAME && self.timer.consume(dt) {
            steps += 1;
            let report = step(&mut self.world, &params);
            if report.tunneled {
                // Collision ends this frame's stepping
                self.timer.discard();
                break;
            }
            self.resolve_contacts(&report.contacts, now_ms);
            if self.phase.is_terminal() {
                break;
            }
        }
        self.timer.clamp_carry(dt);
    }

    /// Smooth engine gravity toward the tilt target
    ///
    /// Eases faster on reversal or growing tilt, slower at speed.
    fn ease_gravity(&mut self) {
        let target = self.tilt * BASE_GRAVITY * self.options.gravity_scale;
        let current = self.world.gravity;

        let mut factor = GRAVITY_EASE_BASE;
        if current.length_squared() > 1e-6
            && target.length_squared() > 1e-6
            && !same_direction(current, target)
        {
            factor += GRAVITY_EASE_REVERSAL;
        }
        if target.length() > current.length() {
            factor += GRAVITY_EASE_GROWTH;
        }
        let speed_ratio =
            (self.world.ball.speed() / self.options.quality.max_velocity()).clamp(0.0, 1.0);
        factor *= 1.0 - GRAVITY_EASE_SPEED_DAMPING * speed_ratio;

        self.world.gravity = current.lerp(target, factor.clamp(0.05, 0.8));
    }

    fn resolve_contacts(&mut self, contacts: &[BodyId], now_ms: f64) {
        for &id in contacts {
            if self.phase.is_terminal() {
                break;
            }
            let Some(kind) = self.world.body(id).map(|b| b.kind.clone()) else {
                log::warn!("Contact with missing body {}, skipped", id);
                continue;
            };
            match kind {
                BodyKind::Goal => self.reach_goal(),
                BodyKind::Hazard(gate) => {
                    if gate.is_active(now_ms) {
                        self.trigger_hazard(gate.id);
                    }
                }
                BodyKind::Coin(coin) => self.collect_coin(id, &coin),
                BodyKind::Wall | BodyKind::Boundary(_) => {}
            }
        }
    }

    fn reach_goal(&mut self) {
        if self.goal_reached {
            return;
        }
        self.goal_reached = true;
        self.phase = SessionPhase::GoalReached;
        self.events.push(SessionEvent::GoalReached);
        log::info!("Goal reached in {}", self.maze.id);
    }

    fn trigger_hazard(&mut self, gate_id: u32) {
        if self.hazard_triggered {
            return;
        }
        self.hazard_triggered = true;
        self.game_over = true;
        self.phase = SessionPhase::GameOver;
        self.events.push(SessionEvent::HazardHit { gate_id });
        log::info!("Laser gate {} hit in {}", gate_id, self.maze.id);
    }

    fn collect_coin(&mut self, body_id: BodyId, coin: &Coin) {
        if !self.collected.insert(coin.id) {
            return;
        }

        // Collection must not perturb the ball
        let snapshot = self.world.ball.snapshot();
        match self.world.body_mut(body_id) {
            Some(body) => body.make_inert(),
            None => log::warn!("Coin {} body {} vanished before collection", coin.id, body_id),
        }
        self.world.ball.restore(snapshot);
        self.pending_removals.push((body_id, coin.id));

        let multiplier = if coin.is_special {
            self.options.special_coin_multiplier
        } else {
            1
        };
        let reward = coin.value.saturating_mul(multiplier);
        if let Some(callback) = self.on_reward.as_mut() {
            callback(reward);
        }
        self.events.push(SessionEvent::CoinCollected {
            coin_id: coin.id,
            reward,
            special: coin.is_special,
        });
        log::debug!("Coin {} collected (+{})", coin.id, reward);
    }

    fn flush_pending_removals(&mut self) {
        for (body_id, coin_id) in std::mem::take(&mut self.pending_removals) {
            if self.world.remove_body(body_id).is_none() {
                log::warn!("Pending removal of body {} found nothing", body_id);
            }
            if self.maze.remove_coin(coin_id).is_none() {
                log::warn!("Coin {} already gone from the live maze", coin_id);
            }
        }
    }

    /// Return to `Running` at the maze start
    ///
    /// Events not yet drained stay queued for the host.
    pub fn reset(&mut self) {
        let now = self.clock.now_ms();
        self.reset_at(now);
    }

    pub fn reset_at(&mut self, now_ms: f64) {
        self.flush_pending_removals();
        let start = self.world.start();
        self.world.ball.place(start);
        self.world.gravity = Vec2::ZERO;
        self.tilt = Vec2::ZERO;
        self.goal_reached = false;
        self.game_over = false;
        self.hazard_triggered = false;
        self.collected.clear();
        self.timer.resync(now_ms);
        self.phase = SessionPhase::Running;
        log::debug!("Session {} reset", self.maze.id);
    }

    /// Tear down the current world and bind a new maze
    ///
    /// Events from the previous maze stay queued until drained.
    pub fn load_maze(&mut self, maze: &Maze) -> Result<(), ConfigError> {
        self.options.validate(maze)?;
        self.world = World::from_maze(maze, &self.options);
        self.maze = maze.clone();
        self.pending_removals.clear();
        self.collected.clear();
        self.tilt = Vec2::ZERO;
        self.goal_reached = false;
        self.game_over = false;
        self.hazard_triggered = false;
        self.timer = FrameTimer::new();
        self.phase = SessionPhase::Initializing;
        log::info!("Session loaded {}", maze.id);
        Ok(())
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Render position, blended between the last two steps
    pub fn ball_position(&self) -> Vec2 {
        let alpha = self.timer.alpha(self.options.quality.fixed_step());
        let ball = &self.world.ball;
        ball.prev_position.lerp(ball.position, alpha)
    }

    pub fn ball_x(&self) -> f32 {
        self.ball_position().x
    }

    pub fn ball_y(&self) -> f32 {
        self.ball_position().y
    }

    /// Position after the latest step, without interpolation
    pub fn ball_raw_position(&self) -> Vec2 {
        self.world.ball.position
    }

    pub fn ball_velocity(&self) -> Vec2 {
        self.world.ball.velocity
    }

    pub fn goal_reached(&self) -> bool {
        self.goal_reached
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn collected_count(&self) -> usize {
        self.collected.len()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        log::debug!("Session for {} released", self.maze.id);
    }
}

/// Non-finite samples read as level; the rest are clamped per axis
fn sanitize_tilt(x: f32, y: f32) -> Vec2 {
    let clean = |v: f32| {
        if v.is_finite() {
            v.clamp(-MAX_TILT, MAX_TILT)
        } else {
            0.0
        }
    };
    Vec2::new(clean(x), clean(y))
}
