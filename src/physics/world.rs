//! Session-owned physics world built from a maze
//!
//! The maze occupies a square area scaled uniformly to fit the world and
//! centered in it. Four boundary walls sit just outside the world rectangle.

use glam::Vec2;

use super::body::{Aabb, Ball, Body, BodyId, BodyKind, Edge};
use super::collision::{RayHit, ball_rect_collision, segment_rect_hit};
use super::session::SessionOptions;
use crate::consts::*;
use crate::maze::Maze;

/// Goal sensor side as a fraction of the corridor width
const GOAL_SENSOR_FRACTION: f32 = 0.5;
/// Coin sensor side as a fraction of the cell size
const COIN_SENSOR_FRACTION: f32 = 0.3;

/// Maze-local → world mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MazeTransform {
    pub offset: Vec2,
    pub scale: f32,
}

impl MazeTransform {
    /// Fit a square maze of side `maze_size` into `width × height`
    pub fn fit(maze_size: f32, width: f32, height: f32) -> Self {
        let scale = width.min(height) / maze_size;
        let offset = Vec2::new(
            (width - maze_size * scale) / 2.0,
            (height - maze_size * scale) / 2.0,
        );
        Self { offset, scale }
    }

    pub fn to_world(&self, p: Vec2) -> Vec2 {
        self.offset + p * self.scale
    }

    pub fn to_maze(&self, p: Vec2) -> Vec2 {
        (p - self.offset) / self.scale
    }

    pub fn rect(&self, x: f32, y: f32, width: f32, height: f32) -> Aabb {
        let min = self.to_world(Vec2::new(x, y));
        Aabb::new(min, min + Vec2::new(width, height) * self.scale)
    }
}

/// Ball plus static bodies for one play session
#[derive(Debug, Clone)]
pub struct World {
    pub(crate) ball: Ball,
    pub(crate) bodies: Vec<Body>,
    /// Engine-level gravity (world units/s²)
    pub(crate) gravity: Vec2,
    bounds: Aabb,
    transform: MazeTransform,
    start: Vec2,
    next_id: BodyId,
}

impl World {
    pub fn from_maze(maze: &Maze, options: &SessionOptions) -> Self {
        let transform = MazeTransform::fit(maze.size(), options.width, options.height);
        let bounds = Aabb::new(Vec2::ZERO, Vec2::new(options.width, options.height));
        let start = transform.to_world(maze.start_position);

        let mut world = Self {
            ball: Ball::new(start, options.ball_radius),
            bodies: Vec::with_capacity(
                maze.walls.len() + maze.laser_gates.len() + maze.coins.len() + 5,
            ),
            gravity: Vec2::ZERO,
            bounds,
            transform,
            start,
            next_id: 1,
        };

        for wall in &maze.walls {
            let shape = transform.rect(wall.x, wall.y, wall.width, wall.height);
            world.add(|id| Body::solid(id, BodyKind::Wall, shape));
        }

        let t = BOUNDARY_WALL_THICKNESS;
        let (w, h) = (options.width, options.height);
        let edges = [
            (Edge::Top, Aabb::from_rect(-t, -t, w + 2.0 * t, t)),
            (Edge::Right, Aabb::from_rect(w, -t, t, h + 2.0 * t)),
            (Edge::Bottom, Aabb::from_rect(-t, h, w + 2.0 * t, t)),
            (Edge::Left, Aabb::from_rect(-t, -t, t, h + 2.0 * t)),
        ];
        for (edge, shape) in edges {
            world.add(|id| Body::solid(id, BodyKind::Boundary(edge), shape));
        }

        let goal_shape = Aabb::centered(
            transform.to_world(maze.end_position),
            maze.corridor_width() * GOAL_SENSOR_FRACTION * transform.scale,
        );
        world.add(|id| Body::sensor(id, BodyKind::Goal, goal_shape));

        for gate in &maze.laser_gates {
            let shape = transform.rect(gate.x, gate.y, gate.width, gate.height);
            world.add(|id| Body::sensor(id, BodyKind::Hazard(gate.clone()), shape));
        }

        for coin in &maze.coins {
            let shape = Aabb::centered(
                transform.to_world(coin.position),
                maze.cell_size * COIN_SENSOR_FRACTION * transform.scale,
            );
            world.add(|id| Body::sensor(id, BodyKind::Coin(coin.clone()), shape));
        }

        world
    }

    fn add(&mut self, make: impl FnOnce(BodyId) -> Body) -> BodyId {
        let id = self.next_id;
        self.next_id += 1;
        self.bodies.push(make(id));
        id
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn transform(&self) -> MazeTransform {
        self.transform
    }

    /// Ball spawn point (world coordinates)
    pub fn start(&self) -> Vec2 {
        self.start
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let idx = self.bodies.iter().position(|b| b.id == id)?;
        Some(self.bodies.remove(idx))
    }

    /// Nearest solid body crossed by the segment `from → to`
    pub fn raycast_solids(&self, from: Vec2, to: Vec2) -> Option<(BodyId, RayHit)> {
        self.bodies
            .iter()
            .filter(|b| b.is_solid())
            .filter_map(|b| segment_rect_hit(from, to, &b.shape).map(|hit| (b.id, hit)))
            .min_by(|a, b| {
                a.1.t
                    .partial_cmp(&b.1.t)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Live sensors currently overlapping the ball, in body order
    pub fn sensor_contacts(&self) -> Vec<BodyId> {
        self.bodies
            .iter()
            .filter(|b| b.detects_ball())
            .filter(|b| ball_rect_collision(self.ball.position, self.ball.radius, &b.shape).hit)
            .map(|b| b.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::generate_with_rng;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_transform_centers_maze() {
        let t = MazeTransform::fit(300.0, 600.0, 400.0);
        assert!((t.scale - 4.0 / 3.0).abs() < 1e-6);
        assert!((t.offset.x - 100.0).abs() < 1e-4);
        assert!(t.offset.y.abs() < 1e-4);
        let p = Vec2::new(150.0, 150.0);
        assert!((t.to_maze(t.to_world(p)) - p).length() < 1e-4);
        assert!((t.to_world(p) - Vec2::new(300.0, 200.0)).length() < 1e-4);
    }

    #[test]
    fn test_bodies_match_maze() {
        let maze = generate_with_rng(16, &mut Pcg32::seed_from_u64(4));
        let world = World::from_maze(&maze, &SessionOptions::default());
        let count = |pred: fn(&BodyKind) -> bool| {
            world.bodies().iter().filter(|b| pred(&b.kind)).count()
        };
        assert_eq!(count(|k| matches!(k, BodyKind::Wall)), maze.walls.len());
        assert_eq!(count(|k| matches!(k, BodyKind::Boundary(_))), 4);
        assert_eq!(count(|k| matches!(k, BodyKind::Goal)), 1);
        assert_eq!(count(|k| matches!(k, BodyKind::Hazard(_))), maze.laser_gates.len());
        assert_eq!(count(|k| matches!(k, BodyKind::Coin(_))), maze.coins.len());

        // Unique ids
        let mut ids: Vec<_> = world.bodies().iter().map(|b| b.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), world.bodies().len());
    }

    #[test]
    fn test_ball_starts_clear_of_walls() {
        let maze = generate_with_rng(10, &mut Pcg32::seed_from_u64(1));
        let world = World::from_maze(&maze, &SessionOptions::default());
        let ball = world.ball();
        assert_eq!(ball.position, world.start());
        for body in world.bodies().iter().filter(|b| b.is_solid()) {
            assert!(!ball_rect_collision(ball.position, ball.radius, &body.shape).hit);
        }
    }

    #[test]
    fn test_remove_body_once() {
        let maze = generate_with_rng(2, &mut Pcg32::seed_from_u64(6));
        let mut world = World::from_maze(&maze, &SessionOptions::default());
        let id = world.bodies()[0].id;
        assert!(world.remove_body(id).is_some());
        assert!(world.remove_body(id).is_none());
        assert!(world.body(id).is_none());
    }

    #[test]
    fn test_raycast_returns_nearest() {
        let maze = generate_with_rng(1, &mut Pcg32::seed_from_u64(2));
        let options = SessionOptions::default();
        let world = World::from_maze(&maze, &options);
        // Starts inside the left boundary body, so the maze's outer wall is first
        let (_, hit) = world
            .raycast_solids(Vec2::new(-10.0, 150.0), Vec2::new(310.0, 150.0))
            .expect("crosses outer walls");
        assert!(hit.point.x <= 2.0);
    }
}
