//! Grid → wall rectangle conversion
//!
//! Each wall is a thin axis-aligned rectangle centered on the boundary line
//! between two cells and extended by half a thickness at both ends, so
//! perpendicular walls meet without leaving a corner gap.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::{CellPos, Direction, Grid};

/// Axis-aligned wall rectangle in maze-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Wall {
    /// Horizontal wall along boundary line `line_y`, spanning one cell from `x0`
    pub fn horizontal(x0: f32, line_y: f32, length: f32, thickness: f32) -> Self {
        Self {
            x: x0 - thickness / 2.0,
            y: line_y - thickness / 2.0,
            width: length + thickness,
            height: thickness,
        }
    }

    /// Vertical wall along boundary line `line_x`, spanning one cell from `y0`
    pub fn vertical(line_x: f32, y0: f32, length: f32, thickness: f32) -> Self {
        Self {
            x: line_x - thickness / 2.0,
            y: y0 - thickness / 2.0,
            width: thickness,
            height: length + thickness,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.width >= self.height
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Flatten the carved grid into wall rectangles
///
/// Top and left edges are emitted only for the first row and column; every
/// other boundary is owned by the cell above or to the left of it, so each
/// wall appears exactly once.
pub fn walls_from_grid(grid: &Grid, cell_size: f32, thickness: f32) -> Vec<Wall> {
    let mut walls = Vec::new();

    for cell in grid.cells() {
        let px = cell.x as f32 * cell_size;
        let py = cell.y as f32 * cell_size;

        if cell.y == 0 && cell.walls.top {
            walls.push(Wall::horizontal(px, py, cell_size, thickness));
        }
        if cell.x == 0 && cell.walls.left {
            walls.push(Wall::vertical(px, py, cell_size, thickness));
        }
        if cell.walls.bottom {
            walls.push(Wall::horizontal(px, py + cell_size, cell_size, thickness));
        }
        if cell.walls.right {
            walls.push(Wall::vertical(px + cell_size, py, cell_size, thickness));
        }
    }

    walls
}

/// Rebuild a wall-flag grid from rectangles produced by [`walls_from_grid`]
///
/// Returns `None` if any rectangle is not centered on a cell boundary, which
/// would mean two neighboring cells disagree about where their shared wall is.
pub fn grid_from_walls(
    walls: &[Wall],
    cols: u32,
    rows: u32,
    cell_size: f32,
    thickness: f32,
) -> Option<Grid> {
    let mut grid = Grid::new(cols, rows);
    for y in 0..rows {
        for x in 0..cols {
            for dir in Direction::ALL {
                grid.set_wall((x, y), dir, false);
            }
        }
    }

    let snap = |v: f32| -> Option<u32> {
        let idx = v / cell_size;
        let rounded = idx.round();
        ((idx - rounded).abs() < 1e-3 && rounded >= 0.0).then_some(rounded as u32)
    };

    for wall in walls {
        // Boundary line index and the cell the wall spans
        let (line, span, horizontal) = if wall.is_horizontal() {
            (
                snap(wall.y + thickness / 2.0)?,
                snap(wall.x + thickness / 2.0)?,
                true,
            )
        } else {
            (
                snap(wall.x + thickness / 2.0)?,
                snap(wall.y + thickness / 2.0)?,
                false,
            )
        };

        let (before, after, dir): (Option<CellPos>, CellPos, Direction) = if horizontal {
            (line.checked_sub(1).map(|y| (span, y)), (span, line), Direction::Bottom)
        } else {
            (line.checked_sub(1).map(|x| (x, span)), (line, span), Direction::Right)
        };

        if let Some(pos) = before {
            grid.set_wall(pos, dir, true);
        }
        grid.set_wall(after, dir.opposite(), true);
    }

    Some(grid)
}
