//! One fixed simulation step
//!
//! Order within a step: integrate, swept check against solids (rollback on
//! pass-through), discrete wall contacts, world-edge handling, then sensor
//! overlap collection. Sensor reactions belong to the session.

use glam::Vec2;

use super::body::{Aabb, Ball, BodyId, BodyKind};
use super::collision::{ball_rect_collision, bounce_velocity, reflect_velocity};
use super::world::World;
use crate::consts::*;
use crate::{same_direction, smoothstep, speed_bounce};

/// Contact-resolution passes per step
const RESOLVE_ITERATIONS: usize = 3;

/// Fraction of the excess speed shed per step at full easing
const GOVERN_RATE: f32 = 0.2;
/// Braking strength when tilt continues along the velocity
const ALIGNED_STRENGTH: f32 = 0.5;
/// Braking strength when tilt opposes the velocity
const OPPOSED_STRENGTH: f32 = 1.0;
/// Braking strength with the device held level
const NEUTRAL_STRENGTH: f32 = 0.75;

/// Inputs for one step
#[derive(Debug, Clone, Copy)]
pub struct StepParams {
    /// Fixed step duration (seconds)
    pub dt: f32,
    /// Current target tilt, used to judge braking direction
    pub tilt: Vec2,
    pub max_velocity: f32,
    pub soft_cap_fraction: f32,
}

/// What happened during one step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// The swept check caught a pass-through and rolled the ball back
    pub tunneled: bool,
    pub wall_hits: u32,
    pub boundary_hit: bool,
    /// Live sensors overlapping the ball after the step
    pub contacts: Vec<BodyId>,
}

/// Advance the world by one fixed step
pub fn step(world: &mut World, params: &StepParams) -> StepReport {
    let mut report = StepReport::default();
    let dt = params.dt;

    let ball = &mut world.ball;
    ball.prev_position = ball.position;
    ball.velocity += (world.gravity + ball.force) * dt;
    ball.force = Vec2::ZERO;
    ball.velocity = govern_velocity(
        ball.velocity,
        params.tilt,
        params.max_velocity,
        params.soft_cap_fraction,
    );

    let from = ball.position;
    let to = from + ball.velocity * dt;

    if let Some((id, hit)) = world.raycast_solids(from, to) {
        let ball = &mut world.ball;
        let bounce = speed_bounce(ball.speed(), params.max_velocity, 0.2, 0.5);
        ball.position = from;
        ball.velocity = reflect_velocity(ball.velocity, hit.normal) * bounce;
        log::debug!(
            "Pass-through of body {} caught at t={:.3}, rolled back",
            id,
            hit.t
        );
        report.tunneled = true;
        return report;
    }

    world.ball.position = to;
    report.wall_hits = resolve_wall_contacts(world, params.max_velocity);
    let bounds = world.bounds();
    report.boundary_hit = constrain_to_bounds(&mut world.ball, bounds, params.max_velocity);
    report.contacts = world.sensor_contacts();
    report
}

/// Progressive speed cap
///
/// Up to `max_velocity * soft_cap_fraction` the velocity is untouched. Above
/// it the excess is shed along a smoothstep curve, harder when the tilt
/// opposes the motion than when it keeps pushing the same way. The result
/// never exceeds `max_velocity`.
pub fn govern_velocity(
    velocity: Vec2,
    tilt: Vec2,
    max_velocity: f32,
    soft_cap_fraction: f32,
) -> Vec2 {
    let speed = velocity.length();
    let threshold = max_velocity * soft_cap_fraction;
    if speed <= threshold || speed < 1e-6 {
        return velocity;
    }

    let excess = (speed - threshold) / (max_velocity - threshold).max(1e-6);
    let ease = smoothstep(excess);
    let strength = if tilt.length_squared() < 1e-6 {
        NEUTRAL_STRENGTH
    } else if same_direction(tilt, velocity) {
        ALIGNED_STRENGTH
    } else {
        OPPOSED_STRENGTH
    };

    let reduced = speed - (speed - threshold) * ease * strength * GOVERN_RATE;
    velocity * (reduced.min(max_velocity) / speed)
}

/// Push the ball out of maze walls; returns the number of contacts
///
/// Boundary bodies are left to `constrain_to_bounds`.
fn resolve_wall_contacts(world: &mut World, max_velocity: f32) -> u32 {
    let mut hits = 0;
    for _ in 0..RESOLVE_ITERATIONS {
        let mut moved = false;
        for body in world.bodies.iter().filter(|b| b.is_solid()) {
            if matches!(body.kind, BodyKind::Boundary(_)) {
                continue;
            }
            let ball = &mut world.ball;
            let contact = ball_rect_collision(ball.position, ball.radius, &body.shape);
            if !contact.hit {
                continue;
            }
            ball.position += contact.normal * contact.penetration;
            let restitution = speed_bounce(ball.speed(), max_velocity, 0.1, 0.4);
            ball.velocity = bounce_velocity(ball.velocity, contact.normal, restitution, WALL_FRICTION);
            hits += 1;
            moved = true;
        }
        if !moved {
            break;
        }
    }
    hits
}

/// Keep the ball inside the world rectangle
///
/// Crossing an edge snaps back with a small inset, bounces the normal axis
/// with a speed-dependent coefficient plus a nudge away from the edge, and
/// damps the tangential axis.
pub fn constrain_to_bounds(ball: &mut Ball, bounds: Aabb, max_velocity: f32) -> bool {
    let r = ball.radius;
    let lo = bounds.min + Vec2::splat(r);
    let hi = bounds.max - Vec2::splat(r);
    let mut hit = false;

    if ball.position.x < lo.x {
        ball.position.x = lo.x + BOUNDARY_INSET;
        ball.velocity.x = edge_rebound(ball.velocity.x, max_velocity);
        ball.velocity.y *= BOUNDARY_TANGENT_DAMPING;
        hit = true;
    } else if ball.position.x > hi.x {
        ball.position.x = hi.x - BOUNDARY_INSET;
        ball.velocity.x = -edge_rebound(ball.velocity.x, max_velocity);
        ball.velocity.y *= BOUNDARY_TANGENT_DAMPING;
        hit = true;
    }

    if ball.position.y < lo.y {
        ball.position.y = lo.y + BOUNDARY_INSET;
        ball.velocity.y = edge_rebound(ball.velocity.y, max_velocity);
        ball.velocity.x *= BOUNDARY_TANGENT_DAMPING;
        hit = true;
    } else if ball.position.y > hi.y {
        ball.position.y = hi.y - BOUNDARY_INSET;
        ball.velocity.y = -edge_rebound(ball.velocity.y, max_velocity);
        ball.velocity.x *= BOUNDARY_TANGENT_DAMPING;
        hit = true;
    }

    hit
}

/// Outward-from-edge speed after a boundary hit (always positive)
fn edge_rebound(normal_speed: f32, max_velocity: f32) -> f32 {
    let speed = normal_speed.abs();
    speed * speed_bounce(speed, max_velocity, 0.2, 0.5) + BOUNDARY_NUDGE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::{Maze, Wall};
    use crate::physics::session::SessionOptions;

    fn maze_with_walls(walls: Vec<Wall>) -> Maze {
        Maze {
            id: "test".into(),
            name: "Test".into(),
            walls,
            laser_gates: vec![],
            coins: vec![],
            start_position: Vec2::new(140.0, 150.0),
            end_position: Vec2::new(30.0, 30.0),
            difficulty: 1,
            cols: 5,
            rows: 5,
            cell_size: 60.0,
            wall_thickness: 4.0,
        }
    }

    fn world_with_walls(walls: Vec<Wall>) -> World {
        World::from_maze(&maze_with_walls(walls), &SessionOptions::default())
    }

    fn params(max_velocity: f32) -> StepParams {
        StepParams {
            dt: 1.0 / 60.0,
            tilt: Vec2::ZERO,
            max_velocity,
            soft_cap_fraction: 0.7,
        }
    }

    fn center_wall() -> Wall {
        Wall {
            x: 150.0,
            y: 0.0,
            width: 4.0,
            height: 300.0,
        }
    }

    #[test]
    fn test_gravity_integration() {
        let mut world = world_with_walls(vec![]);
        world.gravity = Vec2::new(0.0, 600.0);
        let report = step(&mut world, &params(1.0e6));
        assert!(!report.tunneled);
        assert!((world.ball.velocity.y - 10.0).abs() < 1e-3);
        assert!((world.ball.position.y - (150.0 + 10.0 / 60.0)).abs() < 1e-3);
        assert_eq!(world.ball.prev_position, Vec2::new(140.0, 150.0));
    }

    #[test]
    fn test_fast_ball_does_not_tunnel() {
        let mut world = world_with_walls(vec![center_wall()]);
        world.ball.velocity = Vec2::new(3000.0, 0.0);
        let report = step(&mut world, &params(1.0e6));
        assert!(report.tunneled);
        assert_eq!(world.ball.position, Vec2::new(140.0, 150.0));
        assert!(world.ball.velocity.x < 0.0);
        assert!(world.ball.velocity.x.abs() < 3000.0);
    }

    #[test]
    fn test_wall_contact_pushes_ball_out() {
        let mut world = world_with_walls(vec![center_wall()]);
        world.ball.place(Vec2::new(142.0, 150.0));
        world.ball.velocity = Vec2::new(60.0, 0.0);
        let report = step(&mut world, &params(800.0));
        assert!(!report.tunneled);
        assert!(report.wall_hits >= 1);
        assert!(world.ball.position.x <= 142.0 + 1e-3);
        assert!(world.ball.velocity.x < 0.0);
    }

    #[test]
    fn test_boundary_snap_and_rebound() {
        let mut world = world_with_walls(vec![]);
        world.ball.place(Vec2::new(290.0, 150.0));
        world.ball.velocity = Vec2::new(300.0, 100.0);
        let report = step(&mut world, &params(1.0e6));
        assert!(report.boundary_hit);
        assert!((world.ball.position.x - (300.0 - 8.0 - BOUNDARY_INSET)).abs() < 1e-4);
        assert!(world.ball.velocity.x <= -BOUNDARY_NUDGE);
        assert!((world.ball.velocity.y - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_govern_below_threshold_untouched() {
        let v = Vec2::new(300.0, 0.0);
        assert_eq!(govern_velocity(v, Vec2::X, 900.0, 0.7), v);
    }

    #[test]
    fn test_govern_never_exceeds_max() {
        let v = Vec2::new(5000.0, 0.0);
        let governed = govern_velocity(v, Vec2::X, 900.0, 0.7);
        assert!(governed.length() <= 900.0 + 1e-3);
        assert!(governed.x > 0.0);
    }

    #[test]
    fn test_govern_brakes_harder_against_tilt() {
        let v = Vec2::new(850.0, 0.0);
        let aligned = govern_velocity(v, Vec2::X, 900.0, 0.7).length();
        let neutral = govern_velocity(v, Vec2::ZERO, 900.0, 0.7).length();
        let opposed = govern_velocity(v, Vec2::NEG_X, 900.0, 0.7).length();
        assert!(aligned > neutral);
        assert!(neutral > opposed);
        assert!(aligned < 850.0);
    }
}
