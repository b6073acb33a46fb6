//! Procedural maze generation
//!
//! Pure apart from randomness: a difficulty level picks the grid size and
//! hazard budget, the RNG drives carving, hazard timing jitter and coin
//! scatter. `generate` uses the thread RNG; `generate_with_rng` takes any
//! source so tests and replays can seed it.

pub mod coins;
pub mod grid;
pub mod hazards;
pub mod walls;

pub use coins::{Coin, cell_center};
pub use grid::{Cell, CellPos, CellWalls, Direction, Grid};
pub use hazards::{GateDirection, GatePlacement, GateTiming, LaserGate, TimingPattern};
pub use walls::Wall;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// A generated maze, in maze-local coordinates (0..MAZE_SIZE on both axes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maze {
    pub id: String,
    pub name: String,
    pub walls: Vec<Wall>,
    pub laser_gates: Vec<LaserGate>,
    pub coins: Vec<Coin>,
    pub start_position: Vec2,
    pub end_position: Vec2,
    pub difficulty: u32,
    pub cols: u32,
    pub rows: u32,
    pub cell_size: f32,
    pub wall_thickness: f32,
}

impl Maze {
    /// Side length of the maze area
    pub fn size(&self) -> f32 {
        self.cols as f32 * self.cell_size
    }

    /// Clear width between two opposite walls of a cell
    pub fn corridor_width(&self) -> f32 {
        self.cell_size - self.wall_thickness
    }

    /// Grid cell containing a maze-local point
    pub fn cell_at(&self, p: Vec2) -> Option<CellPos> {
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let x = (p.x / self.cell_size) as u32;
        let y = (p.y / self.cell_size) as u32;
        (x < self.cols && y < self.rows).then_some((x, y))
    }

    pub fn start_cell(&self) -> Option<CellPos> {
        self.cell_at(self.start_position)
    }

    pub fn end_cell(&self) -> Option<CellPos> {
        self.cell_at(self.end_position)
    }

    /// Rebuild the passage grid from the wall rectangles
    pub fn passages(&self) -> Option<Grid> {
        walls::grid_from_walls(
            &self.walls,
            self.cols,
            self.rows,
            self.cell_size,
            self.wall_thickness,
        )
    }

    /// Take a coin out of the maze (collected)
    pub fn remove_coin(&mut self, id: u32) -> Option<Coin> {
        let idx = self.coins.iter().position(|c| c.id == id)?;
        Some(self.coins.remove(idx))
    }
}

/// Grid side length for a difficulty level
///
/// Levels 1–3 use the 5×5 base; every further tier of three levels adds a
/// row and column, up to four tiers.
pub fn grid_size_for(difficulty: u32) -> u32 {
    let tier = (1 + difficulty.max(1).saturating_sub(1) / LEVELS_PER_TIER).min(MAX_STRUCTURE_TIER);
    BASE_GRID_SIZE + tier - 1
}

/// Generate a maze with the thread RNG (not reproducible)
pub fn generate(difficulty_level: u32) -> Maze {
    generate_with_rng(difficulty_level, &mut rand::rng())
}

/// Generate a maze from the given random source
pub fn generate_with_rng<R: Rng + ?Sized>(difficulty_level: u32, rng: &mut R) -> Maze {
    let difficulty = if difficulty_level == 0 {
        log::warn!("Difficulty 0 requested, generating level 1");
        1
    } else {
        difficulty_level
    };

    let size = grid_size_for(difficulty);
    let cell_size = MAZE_SIZE / size as f32;
    let start: CellPos = (0, 0);
    let goal: CellPos = (size - 1, size - 1);

    let mut grid = Grid::new(size, size);
    grid.carve(start, rng);

    let walls = walls::walls_from_grid(&grid, cell_size, WALL_THICKNESS);
    let mut laser_gates = hazards::place_laser_gates(&grid, difficulty, start, goal, cell_size, rng);

    // Carving guarantees a path; the timed-hazard side is only approximated
    if !grid.path_exists(start, goal) {
        log::error!("Carved maze has no path from {:?} to {:?}", start, goal);
    }
    hazards::soften_unbeatable_gates(&mut laser_gates, &grid);

    let mut excluded = vec![start, goal];
    excluded.extend(laser_gates.iter().map(|g| g.cell));
    let coins = coins::scatter_coins(&grid, cell_size, difficulty, &excluded, rng);

    let id = format!("maze-{}-{:08x}", difficulty, rng.random::<u32>());
    log::info!(
        "Generated {} ({}x{}): {} walls, {} gates, {} coins",
        id,
        size,
        size,
        walls.len(),
        laser_gates.len(),
        coins.len()
    );

    Maze {
        id,
        name: format!("Level {}", difficulty),
        walls,
        laser_gates,
        coins,
        start_position: cell_center(start, cell_size),
        end_position: cell_center(goal, cell_size),
        difficulty,
        cols: size,
        rows: size,
        cell_size,
        wall_thickness: WALL_THICKNESS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn seeded(difficulty: u32, seed: u64) -> Maze {
        generate_with_rng(difficulty, &mut Pcg32::seed_from_u64(seed))
    }

    #[test]
    fn test_grid_size_tiers() {
        assert_eq!(grid_size_for(0), 5);
        assert_eq!(grid_size_for(1), 5);
        assert_eq!(grid_size_for(3), 5);
        assert_eq!(grid_size_for(4), 6);
        assert_eq!(grid_size_for(7), 7);
        assert_eq!(grid_size_for(10), 8);
        assert_eq!(grid_size_for(50), 8);
    }

    #[test]
    fn test_difficulty_one_has_no_gates() {
        for seed in 0..10 {
            let maze = seeded(1, seed);
            assert!(maze.laser_gates.is_empty());
            assert_eq!(maze.cols, 5);
        }
    }

    #[test]
    fn test_difficulty_zero_treated_as_one() {
        let maze = seeded(0, 1);
        assert_eq!(maze.difficulty, 1);
        assert!(maze.laser_gates.is_empty());
    }

    #[test]
    fn test_difficulty_ten_gate_count() {
        for seed in 0..20 {
            let maze = seeded(10, seed);
            let grid = maze.passages().unwrap();
            let chokepoints = grid
                .cells()
                .iter()
                .filter(|c| {
                    let p = (c.x, c.y);
                    grid.is_interior(p) && grid.open_directions(p).len() == 2
                })
                .count();
            assert_eq!(maze.laser_gates.len(), 5.min(chokepoints), "seed {seed}");
        }
    }

    #[test]
    fn test_start_and_end_are_cell_centers() {
        let maze = seeded(5, 3);
        assert_eq!(maze.start_cell(), Some((0, 0)));
        assert_eq!(maze.end_cell(), Some((5, 5)));
        assert_eq!(maze.start_position, cell_center((0, 0), maze.cell_size));
        assert!((maze.size() - MAZE_SIZE).abs() < 1e-3);
    }

    #[test]
    fn test_remove_coin_once() {
        let mut maze = seeded(2, 8);
        let id = maze.coins[0].id;
        let before = maze.coins.len();
        assert!(maze.remove_coin(id).is_some());
        assert!(maze.remove_coin(id).is_none());
        assert_eq!(maze.coins.len(), before - 1);
    }

    #[test]
    fn test_unseeded_generation_works() {
        let maze = generate(4);
        assert_eq!(maze.difficulty, 4);
        assert!(maze.passages().is_some());
    }

    #[test]
    fn test_maze_serializes() {
        let maze = seeded(12, 77);
        let json = serde_json::to_string(&maze).unwrap();
        let back: Maze = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, maze.id);
        assert_eq!(back.laser_gates.len(), maze.laser_gates.len());
    }

    proptest! {
        #[test]
        fn prop_start_reaches_end(difficulty in 1u32..=50, seed in any::<u64>()) {
            let maze = seeded(difficulty, seed);
            let grid = maze.passages().expect("walls sit on cell boundaries");
            let start = maze.start_cell().unwrap();
            let end = maze.end_cell().unwrap();
            prop_assert!(grid.path_exists(start, end));
        }

        #[test]
        fn prop_walls_close_every_boundary(difficulty in 1u32..=50, seed in any::<u64>()) {
            let maze = seeded(difficulty, seed);
            let grid = maze.passages().expect("walls sit on cell boundaries");
            for cell in grid.cells() {
                let pos = (cell.x, cell.y);
                for dir in Direction::ALL {
                    match grid.neighbor(pos, dir) {
                        // Both sides of a shared boundary agree
                        Some(n) => prop_assert_eq!(
                            cell.walls.has(dir),
                            grid.cell(n).unwrap().walls.has(dir.opposite())
                        ),
                        // Outer ring is fully closed
                        None => prop_assert!(cell.walls.has(dir)),
                    }
                }
            }
            // No duplicated wall rectangles
            for (i, a) in maze.walls.iter().enumerate() {
                for b in &maze.walls[i + 1..] {
                    prop_assert_ne!(a, b);
                }
            }
            // Spanning tree: cells - 1 carved passages
            let cells = (maze.cols * maze.rows) as usize;
            let boundaries = 2 * cells - maze.cols as usize - maze.rows as usize;
            let interior_walls = maze.walls.len() - 2 * maze.cols as usize - 2 * maze.rows as usize;
            prop_assert_eq!(boundaries - interior_walls, cells - 1);
        }

        #[test]
        fn prop_gate_duty_bounds(difficulty in 1u32..=50, seed in any::<u64>()) {
            let maze = seeded(difficulty, seed);
            prop_assert!(maze.laser_gates.len() <= MAX_LASER_GATES);
            for gate in &maze.laser_gates {
                prop_assert!(gate.timing.on_duration > 0.0);
                prop_assert!(gate.timing.on_duration < 1.0);
                if gate.placement == GatePlacement::Chokepoint {
                    prop_assert!(gate.timing.on_duration <= CHOKEPOINT_MAX_ON_DURATION);
                }
            }
            if difficulty <= HAZARD_MIN_DIFFICULTY {
                prop_assert!(maze.laser_gates.is_empty());
            }
        }

        #[test]
        fn prop_coins_unique_and_clear_of_endpoints(difficulty in 1u32..=50, seed in any::<u64>()) {
            let maze = seeded(difficulty, seed);
            prop_assert!(maze.coins.iter().filter(|c| !c.is_special).count() <= MAX_COINS);
            prop_assert!(maze.coins.iter().filter(|c| c.is_special).count() <= 1);
            for (i, coin) in maze.coins.iter().enumerate() {
                prop_assert_ne!(coin.position, maze.start_position);
                prop_assert_ne!(coin.position, maze.end_position);
                for other in &maze.coins[i + 1..] {
                    prop_assert_ne!(coin.position, other.position);
                    prop_assert_ne!(coin.id, other.id);
                }
            }
        }
    }
}
