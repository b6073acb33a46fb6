//! Collision detection and response for a ball against axis-aligned rectangles
//!
//! Discrete overlap tests handle ordinary contact; a swept segment test
//! catches the fast cases where the ball's start and end positions straddle
//! a thin wall without either overlapping it.

use glam::Vec2;

use super::body::Aabb;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the rectangle (if hit)
    pub point: Vec2,
    /// Surface normal at contact, pointing toward the ball center
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Swept segment hit against a rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Fraction along the segment [0, 1]
    pub t: f32,
    pub point: Vec2,
    /// Normal of the face the segment entered through
    pub normal: Vec2,
}

/// Check overlap between a ball and a rectangle
pub fn ball_rect_collision(center: Vec2, radius: f32, rect: &Aabb) -> CollisionResult {
    let closest = rect.closest_point(center);
    let delta = center - closest;
    let dist_sq = delta.length_squared();

    if dist_sq >= radius * radius {
        return CollisionResult::miss();
    }

    if dist_sq > 1e-8 {
        let dist = dist_sq.sqrt();
        return CollisionResult {
            hit: true,
            point: closest,
            normal: delta / dist,
            penetration: radius - dist,
        };
    }

    // Center is inside the rectangle - push out through the nearest face
    let to_left = center.x - rect.min.x;
    let to_right = rect.max.x - center.x;
    let to_top = center.y - rect.min.y;
    let to_bottom = rect.max.y - center.y;
    let nearest = to_left.min(to_right).min(to_top).min(to_bottom);

    let (normal, point) = if nearest == to_left {
        (Vec2::NEG_X, Vec2::new(rect.min.x, center.y))
    } else if nearest == to_right {
        (Vec2::X, Vec2::new(rect.max.x, center.y))
    } else if nearest == to_top {
        (Vec2::NEG_Y, Vec2::new(center.x, rect.min.y))
    } else {
        (Vec2::Y, Vec2::new(center.x, rect.max.y))
    };

    CollisionResult {
        hit: true,
        point,
        normal,
        penetration: nearest + radius,
    }
}

/// Slab test for the segment `from → to` against a rectangle
///
/// Segments that start inside the rectangle report no hit; they are resting
/// contacts for the discrete pass, not pass-throughs.
pub fn segment_rect_hit(from: Vec2, to: Vec2, rect: &Aabb) -> Option<RayHit> {
    let delta = to - from;
    let origin = [from.x, from.y];
    let dir = [delta.x, delta.y];
    let lo = [rect.min.x, rect.min.y];
    let hi = [rect.max.x, rect.max.y];
    let axes = [Vec2::X, Vec2::Y];

    let mut t_enter = 0.0f32;
    let mut t_exit = 1.0f32;
    let mut normal = Vec2::ZERO;

    for axis in 0..2 {
        if dir[axis].abs() < 1e-9 {
            // Parallel to this slab: must already be inside it
            if origin[axis] < lo[axis] || origin[axis] > hi[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / dir[axis];
        let mut t0 = (lo[axis] - origin[axis]) * inv;
        let mut t1 = (hi[axis] - origin[axis]) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        if t0 > t_enter {
            t_enter = t0;
            // Entry face opposes the direction of travel
            normal = -axes[axis] * dir[axis].signum();
        }
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    if normal == Vec2::ZERO {
        return None;
    }

    Some(RayHit {
        t: t_enter,
        point: from + delta * t_enter,
        normal,
    })
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Bounce with restitution on the normal axis and friction on the tangent
///
/// Only applies when moving into the surface; separating velocity is kept.
pub fn bounce_velocity(velocity: Vec2, normal: Vec2, restitution: f32, friction: f32) -> Vec2 {
    let vn = velocity.dot(normal);
    if vn >= 0.0 {
        return velocity;
    }
    let normal_part = normal * vn;
    let tangent_part = velocity - normal_part;
    tangent_part * friction - normal_part * restitution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> Aabb {
        // Thin vertical wall at x = 100..104
        Aabb::from_rect(100.0, 0.0, 4.0, 200.0)
    }

    #[test]
    fn test_ball_touching_wall_face() {
        let result = ball_rect_collision(Vec2::new(95.0, 50.0), 8.0, &wall());
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::NEG_X);
        assert!((result.penetration - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_ball_clear_of_wall() {
        let result = ball_rect_collision(Vec2::new(80.0, 50.0), 8.0, &wall());
        assert!(!result.hit);
        // Exactly touching counts as clear
        let result = ball_rect_collision(Vec2::new(92.0, 50.0), 8.0, &wall());
        assert!(!result.hit);
    }

    #[test]
    fn test_ball_center_inside_wall() {
        let result = ball_rect_collision(Vec2::new(103.0, 50.0), 8.0, &wall());
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::X);
        assert!((result.penetration - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_ball_hits_corner() {
        let rect = Aabb::from_rect(0.0, 0.0, 10.0, 10.0);
        let result = ball_rect_collision(Vec2::new(13.0, 14.0), 8.0, &rect);
        assert!(result.hit);
        assert!((result.normal - Vec2::new(0.6, 0.8)).length() < 1e-4);
        assert!((result.penetration - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_segment_passes_through_thin_wall() {
        let hit = segment_rect_hit(Vec2::new(90.0, 50.0), Vec2::new(120.0, 50.0), &wall())
            .expect("segment crosses the wall");
        assert_eq!(hit.normal, Vec2::NEG_X);
        assert!((hit.point.x - 100.0).abs() < 1e-4);
        assert!((hit.t - 10.0 / 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_segment_misses() {
        // Stops short
        assert!(segment_rect_hit(Vec2::new(80.0, 50.0), Vec2::new(95.0, 50.0), &wall()).is_none());
        // Parallel alongside
        assert!(segment_rect_hit(Vec2::new(90.0, 0.0), Vec2::new(90.0, 150.0), &wall()).is_none());
        // Passes beyond the wall's end
        assert!(
            segment_rect_hit(Vec2::new(90.0, 250.0), Vec2::new(120.0, 260.0), &wall()).is_none()
        );
    }

    #[test]
    fn test_segment_starting_inside_is_not_a_hit() {
        assert!(segment_rect_hit(Vec2::new(102.0, 50.0), Vec2::new(130.0, 50.0), &wall()).is_none());
    }

    #[test]
    fn test_segment_from_below() {
        let floor = Aabb::from_rect(0.0, 100.0, 200.0, 4.0);
        let hit = segment_rect_hit(Vec2::new(50.0, 120.0), Vec2::new(60.0, 80.0), &floor).unwrap();
        assert_eq!(hit.normal, Vec2::Y);
    }

    #[test]
    fn test_reflect_velocity() {
        let reflected = reflect_velocity(Vec2::new(100.0, 0.0), Vec2::NEG_X);
        assert!((reflected.x + 100.0).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    #[test]
    fn test_bounce_velocity() {
        let v = bounce_velocity(Vec2::new(100.0, 50.0), Vec2::NEG_X, 0.5, 0.9);
        assert!((v.x + 50.0).abs() < 1e-4);
        assert!((v.y - 45.0).abs() < 1e-4);
        // Already separating: untouched
        let v = bounce_velocity(Vec2::new(-10.0, 5.0), Vec2::NEG_X, 0.5, 0.9);
        assert_eq!(v, Vec2::new(-10.0, 5.0));
    }
}
