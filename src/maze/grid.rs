//! Cell grid and randomized depth-first carving
//!
//! The grid only lives for the duration of generation: carving produces a
//! spanning tree, the hazard pass inspects it, then it is flattened into
//! wall rectangles and dropped.

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// Grid coordinate `(x, y)`, origin top-left
pub type CellPos = (u32, u32);

/// One of the four cell sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
        Direction::Left,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
        }
    }

    /// Grid step for this direction (y grows downward)
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Top => (0, -1),
            Direction::Right => (1, 0),
            Direction::Bottom => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    /// Movement along this direction is horizontal
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Wall flags for a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellWalls {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Default for CellWalls {
    fn default() -> Self {
        Self {
            top: true,
            right: true,
            bottom: true,
            left: true,
        }
    }
}

impl CellWalls {
    pub fn has(&self, dir: Direction) -> bool {
        match dir {
            Direction::Top => self.top,
            Direction::Right => self.right,
            Direction::Bottom => self.bottom,
            Direction::Left => self.left,
        }
    }

    pub fn set(&mut self, dir: Direction, present: bool) {
        match dir {
            Direction::Top => self.top = present,
            Direction::Right => self.right = present,
            Direction::Bottom => self.bottom = present,
            Direction::Left => self.left = present,
        }
    }
}

/// A grid cell
#[derive(Debug, Clone)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
    pub visited: bool,
    pub walls: CellWalls,
}

/// Rows × cols cell grid
#[derive(Debug, Clone)]
pub struct Grid {
    cols: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Fully walled, unvisited grid
    pub fn new(cols: u32, rows: u32) -> Self {
        let mut cells = Vec::with_capacity((cols * rows) as usize);
        for y in 0..rows {
            for x in 0..cols {
                cells.push(Cell {
                    x,
                    y,
                    visited: false,
                    walls: CellWalls::default(),
                });
            }
        }
        Self { cols, rows, cells }
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn idx(&self, (x, y): CellPos) -> usize {
        (y as usize) * (self.cols as usize) + (x as usize)
    }

    pub fn contains(&self, (x, y): CellPos) -> bool {
        x < self.cols && y < self.rows
    }

    pub fn cell(&self, pos: CellPos) -> Option<&Cell> {
        if self.contains(pos) {
            Some(&self.cells[self.idx(pos)])
        } else {
            None
        }
    }

    /// Neighbor coordinate in `dir`, if it lies inside the grid
    pub fn neighbor(&self, (x, y): CellPos, dir: Direction) -> Option<CellPos> {
        let (dx, dy) = dir.offset();
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        self.contains((nx, ny)).then_some((nx, ny))
    }

    /// Passage from `pos` toward `dir` is carved (and stays inside the grid)
    pub fn is_open(&self, pos: CellPos, dir: Direction) -> bool {
        match self.cell(pos) {
            Some(cell) => !cell.walls.has(dir) && self.neighbor(pos, dir).is_some(),
            None => false,
        }
    }

    /// Carved directions out of `pos`, in `Direction::ALL` order
    pub fn open_directions(&self, pos: CellPos) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|&dir| self.is_open(pos, dir))
            .collect()
    }

    /// Cell is not on the outer ring
    pub fn is_interior(&self, (x, y): CellPos) -> bool {
        x > 0 && y > 0 && x + 1 < self.cols && y + 1 < self.rows
    }

    /// Set a single wall flag (one side only)
    pub fn set_wall(&mut self, pos: CellPos, dir: Direction, present: bool) {
        if self.contains(pos) {
            let i = self.idx(pos);
            self.cells[i].walls.set(dir, present);
        }
    }

    /// Clear the wall on both sides of the `pos`/`dir` boundary
    pub fn remove_wall_between(&mut self, pos: CellPos, dir: Direction) {
        let Some(next) = self.neighbor(pos, dir) else {
            return;
        };
        let a = self.idx(pos);
        let b = self.idx(next);
        self.cells[a].walls.set(dir, false);
        self.cells[b].walls.set(dir.opposite(), false);
    }

    /// Iterative randomized depth-first carve from `start`
    ///
    /// Produces a perfect maze: every cell is reached exactly once, so the
    /// passages form a spanning tree with one simple path between any two cells.
    pub fn carve<R: Rng + ?Sized>(&mut self, start: CellPos, rng: &mut R) {
        if !self.contains(start) {
            return;
        }
        let start_idx = self.idx(start);
        self.cells[start_idx].visited = true;
        let mut stack = vec![start];

        while let Some(&current) = stack.last() {
            let unvisited: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|&dir| {
                    self.neighbor(current, dir)
                        .is_some_and(|n| !self.cells[self.idx(n)].visited)
                })
                .collect();

            match unvisited.choose(rng) {
                Some(&dir) => {
                    let Some(next) = self.neighbor(current, dir) else {
                        stack.pop();
                        continue;
                    };
                    self.remove_wall_between(current, dir);
                    let next_idx = self.idx(next);
                    self.cells[next_idx].visited = true;
                    stack.push(next);
                }
                None => {
                    stack.pop();
                }
            }
        }
    }

    /// Breadth-first passage distance from `from` to every cell (None = unreachable)
    pub fn distances_from(&self, from: CellPos) -> Vec<Option<u32>> {
        let mut dist = vec![None; self.cells.len()];
        if !self.contains(from) {
            return dist;
        }
        let mut queue = VecDeque::new();
        dist[self.idx(from)] = Some(0);
        queue.push_back(from);

        while let Some(pos) = queue.pop_front() {
            let d = dist[self.idx(pos)].unwrap_or(0);
            for dir in Direction::ALL {
                if !self.is_open(pos, dir) {
                    continue;
                }
                if let Some(next) = self.neighbor(pos, dir) {
                    let ni = self.idx(next);
                    if dist[ni].is_none() {
                        dist[ni] = Some(d + 1);
                        queue.push_back(next);
                    }
                }
            }
        }
        dist
    }

    /// Passage distance between two cells
    pub fn distance(&self, from: CellPos, to: CellPos) -> Option<u32> {
        if !self.contains(to) {
            return None;
        }
        self.distances_from(from)[self.idx(to)]
    }

    pub fn path_exists(&self, from: CellPos, to: CellPos) -> bool {
        self.distance(from, to).is_some()
    }

    /// Cells on the shortest passage from `from` to `to`, both ends included
    pub fn shortest_path(&self, from: CellPos, to: CellPos) -> Option<Vec<CellPos>> {
        let dist_to = self.distances_from(to);
        let mut remaining = dist_to.get(self.idx(from)).copied().flatten()?;
        let mut path = vec![from];
        let mut current = from;

        // Walk downhill on the distance field toward `to`
        while remaining > 0 {
            let next = Direction::ALL.into_iter().find_map(|dir| {
                if !self.is_open(current, dir) {
                    return None;
                }
                let n = self.neighbor(current, dir)?;
                (dist_to[self.idx(n)] == Some(remaining - 1)).then_some(n)
            })?;
            path.push(next);
            current = next;
            remaining -= 1;
        }
        Some(path)
    }
}
