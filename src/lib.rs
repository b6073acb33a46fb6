//! Tilt Maze - maze generation and tilt-driven ball physics
//!
//! Core modules:
//! - `maze`: Procedural maze generation (carving, walls, hazards, coins)
//! - `physics`: Fixed-timestep ball simulation bound to one maze per session
//! - `settings`: Player-facing configuration (quality tier, sensitivity)
//! - `platform`: Clock, haptics and browser bindings

pub mod error;
pub mod maze;
pub mod physics;
pub mod platform;
pub mod settings;

pub use error::ConfigError;
pub use maze::{Coin, LaserGate, Maze, Wall, generate, generate_with_rng};
pub use physics::{Session, SessionEvent, SessionOptions, SessionPhase, create_session};
pub use settings::{QualityTier, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Logical maze extent (maze-local units, square)
    pub const MAZE_SIZE: f32 = 300.0;
    /// Grid side length at the lowest structure tier
    pub const BASE_GRID_SIZE: u32 = 5;
    /// Number of structure tiers (each adds one row and column)
    pub const MAX_STRUCTURE_TIER: u32 = 4;
    /// Difficulty levels per structure tier
    pub const LEVELS_PER_TIER: u32 = 3;
    /// Wall thickness (maze-local units), centered on the cell boundary
    pub const WALL_THICKNESS: f32 = 4.0;

    /// Hazards only appear above this difficulty
    pub const HAZARD_MIN_DIFFICULTY: u32 = 3;
    /// Junction pairs unlock at this difficulty
    pub const JUNCTION_MIN_DIFFICULTY: u32 = 15;
    /// Hard cap on laser gates per maze
    pub const MAX_LASER_GATES: usize = 8;
    /// Chokepoint gates never stay lit longer than this fraction of a cycle
    pub const CHOKEPOINT_MAX_ON_DURATION: f64 = 0.6;
    /// Gates at or above this duty fraction are treated as unbeatable
    pub const UNBEATABLE_ON_DURATION: f64 = 0.8;
    /// Duty fraction an unbeatable chokepoint gate is softened to
    pub const SOFTENED_ON_DURATION: f64 = 0.5;
    /// Absolute ceiling for any gate duty fraction
    pub const MAX_ON_DURATION: f64 = 0.95;

    /// Coin scatter cap
    pub const MAX_COINS: usize = 20;
    /// Coins at difficulty 1
    pub const BASE_COINS: usize = 5;
    /// Reward units for a regular coin
    pub const COIN_VALUE: u32 = 1;

    /// Gravity at full tilt (world units/s²) before `gravity_scale`
    pub const BASE_GRAVITY: f32 = 600.0;
    /// Maximum fixed steps per visual frame to prevent spiral of death
    pub const MAX_STEPS_PER_FRAME: u32 = 5;
    /// Frame deltas above this are treated as a suspend gap (ms)
    pub const MAX_FRAME_DELTA_MS: f64 = 100.0;
    /// Assumed frame delta before the first sample arrives (ms)
    pub const DEFAULT_FRAME_DELTA_MS: f64 = 1000.0 / 60.0;

    /// Boundary snap inset so the ball doesn't stick to the edge
    pub const BOUNDARY_INSET: f32 = 0.5;
    /// Tangential velocity kept after a boundary hit
    pub const BOUNDARY_TANGENT_DAMPING: f32 = 0.9;
    /// Tiny impulse away from the boundary (world units/s)
    pub const BOUNDARY_NUDGE: f32 = 2.0;
    /// Tangential velocity kept after a wall contact
    pub const WALL_FRICTION: f32 = 0.98;
    /// Thickness of the four world-boundary walls, placed outside the world
    pub const BOUNDARY_WALL_THICKNESS: f32 = 50.0;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite smoothstep on `t` clamped to [0, 1]
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Restitution that rises with impact speed (soft bumps stay soft, fast hits bounce)
#[inline]
pub fn speed_bounce(speed: f32, max_speed: f32, min_bounce: f32, max_bounce: f32) -> f32 {
    let t = if max_speed > 0.0 { speed / max_speed } else { 0.0 };
    lerp(min_bounce, max_bounce, t.clamp(0.0, 1.0))
}

/// Angle between two vectors' directions is below 90°
#[inline]
pub fn same_direction(a: Vec2, b: Vec2) -> bool {
    a.dot(b) > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert!((smoothstep(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_speed_bounce_range() {
        assert!((speed_bounce(0.0, 100.0, 0.2, 0.6) - 0.2).abs() < 1e-6);
        assert!((speed_bounce(500.0, 100.0, 0.2, 0.6) - 0.6).abs() < 1e-6);
        assert!((speed_bounce(50.0, 100.0, 0.2, 0.6) - 0.4).abs() < 1e-6);
    }
}
