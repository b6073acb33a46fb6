//! Ball physics for one play session
//!
//! Deterministic given the same frame timestamps and tilt samples.

pub mod body;
pub mod collision;
pub mod events;
pub mod session;
pub mod step;
pub mod timing;
pub mod world;

pub use body::{Aabb, Ball, Body, BodyId, BodyKind, Edge};
pub use collision::{CollisionResult, RayHit, ball_rect_collision, segment_rect_hit};
pub use events::{HapticPattern, SessionEvent};
pub use session::{RewardCallback, Session, SessionOptions, SessionPhase, create_session};
pub use step::{StepParams, StepReport, govern_velocity};
pub use timing::FrameTimer;
pub use world::{MazeTransform, World};
