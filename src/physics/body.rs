//! Ball and static body types
//!
//! Static bodies carry their gameplay role as a typed `BodyKind`, so contact
//! resolution matches on the kind instead of parsing labels.

use glam::Vec2;

use crate::maze::{Coin, LaserGate};

/// Stable handle for a body inside one world
pub type BodyId = u32;

/// Collision category of the ball; a body with this bit cleared ignores it
pub const BALL_CATEGORY: u32 = 0x0001;

/// Axis-aligned rectangle in world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    /// Square of side `side` centered on `center`
    pub fn centered(center: Vec2, side: f32) -> Self {
        let half = Vec2::splat(side / 2.0);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Nearest point of the rectangle to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

/// World edge a boundary wall guards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Gameplay role of a static body
#[derive(Debug, Clone, PartialEq)]
pub enum BodyKind {
    /// Maze wall segment
    Wall,
    /// One of the four world-boundary walls
    Boundary(Edge),
    /// Goal sensor
    Goal,
    /// Laser gate sensor, with its duty cycle
    Hazard(LaserGate),
    /// Collectible sensor
    Coin(Coin),
}

/// A static body (walls and sensors never move)
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub kind: BodyKind,
    pub shape: Aabb,
    /// Reports contacts without collision response
    pub is_sensor: bool,
    /// Categories this body reacts to
    pub collision_mask: u32,
}

impl Body {
    pub fn solid(id: BodyId, kind: BodyKind, shape: Aabb) -> Self {
        Self {
            id,
            kind,
            shape,
            is_sensor: false,
            collision_mask: BALL_CATEGORY,
        }
    }

    pub fn sensor(id: BodyId, kind: BodyKind, shape: Aabb) -> Self {
        Self {
            id,
            kind,
            shape,
            is_sensor: true,
            collision_mask: BALL_CATEGORY,
        }
    }

    /// Pushes the ball back on contact
    pub fn is_solid(&self) -> bool {
        !self.is_sensor && self.collision_mask & BALL_CATEGORY != 0
    }

    /// Reports ball overlap as a sensor event
    pub fn detects_ball(&self) -> bool {
        self.is_sensor && self.collision_mask & BALL_CATEGORY != 0
    }

    /// Stop reacting to the ball entirely (pending removal)
    pub fn make_inert(&mut self) {
        self.is_sensor = true;
        self.collision_mask = 0;
    }
}

/// Dynamic state of the ball that contact handling may need to restore
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallSnapshot {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angular_velocity: f32,
}

/// The player's ball
///
/// Rotational inertia is infinite: `angular_velocity` is tracked for parity
/// with the host renderer but never driven by contacts.
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub position: Vec2,
    /// Position before the most recent fixed step (render interpolation)
    pub prev_position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub angular_velocity: f32,
    /// Accumulated external force, cleared after each step
    pub force: Vec2,
}

impl Ball {
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            prev_position: position,
            velocity: Vec2::ZERO,
            radius,
            angular_velocity: 0.0,
            force: Vec2::ZERO,
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn snapshot(&self) -> BallSnapshot {
        BallSnapshot {
            position: self.position,
            velocity: self.velocity,
            angular_velocity: self.angular_velocity,
        }
    }

    pub fn restore(&mut self, snapshot: BallSnapshot) {
        self.position = snapshot.position;
        self.velocity = snapshot.velocity;
        self.angular_velocity = snapshot.angular_velocity;
    }

    /// Place at `position` with all motion cleared
    pub fn place(&mut self, position: Vec2) {
        self.position = position;
        self.prev_position = position;
        self.velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
        self.force = Vec2::ZERO;
    }
}
