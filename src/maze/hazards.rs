//! Laser gate hazards
//!
//! Gates sit at chokepoints (cells with exactly two openings, so any
//! through-path must cross them) and, at high difficulty, at four-way
//! junctions as alternating pairs. Each gate runs a repeating on/off duty
//! cycle; it is only lethal while lit.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::grid::{CellPos, Direction, Grid};
use crate::consts::*;

/// Beam width as a fraction of the cell size
const LASER_WIDTH_FRACTION: f32 = 0.12;
/// Junction pairs stay under half a cycle each so they never overlap
const JUNCTION_MAX_ON_DURATION: f64 = 0.45;

/// Beam orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateDirection {
    /// Beam runs along x (blocks vertical travel)
    Horizontal,
    /// Beam runs along y (blocks horizontal travel)
    Vertical,
}

/// Where a gate was placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatePlacement {
    Chokepoint,
    Junction,
}

/// Repeating duty cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateTiming {
    /// Cycle length (ms)
    pub interval: f64,
    /// Phase offset as a fraction of the cycle [0, 1)
    pub phase: f64,
    /// Fraction of the cycle the beam is lit (0, 1)
    pub on_duration: f64,
}

impl GateTiming {
    /// Beam is lit at wall-clock time `now_ms`
    pub fn is_active(&self, now_ms: f64) -> bool {
        if self.interval <= 0.0 {
            return false;
        }
        let cycle = now_ms.rem_euclid(self.interval) / self.interval;
        (cycle + self.phase).rem_euclid(1.0) < self.on_duration
    }
}

/// Named timing patterns, unlocked by difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimingPattern {
    Steady,
    Pulse,
    Burst,
    Rapid,
}

impl TimingPattern {
    /// Base cycle length (ms)
    pub fn interval(self) -> f64 {
        match self {
            TimingPattern::Steady => 3000.0,
            TimingPattern::Pulse => 2000.0,
            TimingPattern::Burst => 1600.0,
            TimingPattern::Rapid => 900.0,
        }
    }

    /// Base lit fraction
    pub fn on_duration(self) -> f64 {
        match self {
            TimingPattern::Steady => 0.5,
            TimingPattern::Pulse => 0.4,
            TimingPattern::Burst => 0.3,
            TimingPattern::Rapid => 0.35,
        }
    }

    /// Patterns available at a difficulty level
    pub fn catalog(difficulty: u32) -> &'static [TimingPattern] {
        const EARLY: &[TimingPattern] = &[TimingPattern::Steady, TimingPattern::Pulse];
        const MID: &[TimingPattern] = &[
            TimingPattern::Steady,
            TimingPattern::Pulse,
            TimingPattern::Burst,
        ];
        const LATE: &[TimingPattern] = &[
            TimingPattern::Steady,
            TimingPattern::Pulse,
            TimingPattern::Burst,
            TimingPattern::Rapid,
        ];
        match difficulty {
            0..7 => EARLY,
            7..11 => MID,
            _ => LATE,
        }
    }

    /// Timing with jitter on interval, phase and duty so neighboring gates drift apart
    pub fn jittered<R: Rng + ?Sized>(self, rng: &mut R) -> GateTiming {
        let interval = self.interval() * rng.random_range(0.85..1.15);
        let phase = rng.random_range(0.0..1.0);
        let on_duration = (self.on_duration() + rng.random_range(-0.05..0.05))
            .clamp(0.1, MAX_ON_DURATION);
        GateTiming {
            interval,
            phase,
            on_duration,
        }
    }
}

/// A laser gate hazard (maze-local rectangle + duty cycle)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserGate {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub direction: GateDirection,
    pub timing: GateTiming,
    pub pattern: TimingPattern,
    pub placement: GatePlacement,
    /// Grid cell the gate occupies
    pub cell: CellPos,
}

impl LaserGate {
    pub fn is_active(&self, now_ms: f64) -> bool {
        self.timing.is_active(now_ms)
    }
}

/// Number of gates for a difficulty before the candidate cap
///
/// `base = min(d - 3, 3)`, `bonus = floor((d - 6) / 2)` (never negative).
pub fn gate_budget(difficulty: u32) -> usize {
    if difficulty <= HAZARD_MIN_DIFFICULTY {
        return 0;
    }
    let base = (difficulty - HAZARD_MIN_DIFFICULTY).min(3);
    let bonus = difficulty.saturating_sub(6) / 2;
    ((base + bonus) as usize).min(MAX_LASER_GATES)
}

/// A scored hazard location
#[derive(Debug, Clone, Copy)]
struct Candidate {
    cell: CellPos,
    placement: GatePlacement,
    score: f32,
}

/// Scan interior cells for chokepoints (and junctions at high difficulty),
/// ranked by how likely the player has to cross them
fn rank_candidates(grid: &Grid, difficulty: u32, start: CellPos, goal: CellPos) -> Vec<Candidate> {
    let from_start = grid.distances_from(start);
    let from_goal = grid.distances_from(goal);
    let solution_len = grid.distance(start, goal).unwrap_or(0);

    let mut candidates = Vec::new();
    for cell in grid.cells() {
        let pos = (cell.x, cell.y);
        if !grid.is_interior(pos) || pos == start || pos == goal {
            continue;
        }
        let placement = match grid.open_directions(pos).len() {
            2 => GatePlacement::Chokepoint,
            4 if difficulty >= JUNCTION_MIN_DIFFICULTY => GatePlacement::Junction,
            _ => continue,
        };

        let idx = (cell.y * grid.cols() + cell.x) as usize;
        let (Some(ds), Some(dg)) = (from_start[idx], from_goal[idx]) else {
            continue;
        };
        let total = (ds + dg) as f32;
        // 1.0 when equidistant from start and goal
        let balance = if total > 0.0 {
            1.0 - (ds as f32 - dg as f32).abs() / total
        } else {
            0.0
        };
        // Cells on the unique solution path are always crossed
        let on_path = if ds + dg == solution_len { 1.0 } else { 0.0 };

        candidates.push(Candidate {
            cell: pos,
            placement,
            score: balance + on_path,
        });
    }

    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cell.1.cmp(&b.cell.1))
            .then(a.cell.0.cmp(&b.cell.0))
    });
    candidates
}

/// Beam rectangle crossing the passage at `pos`
fn beam_rect(
    pos: CellPos,
    direction: GateDirection,
    offset: (f32, f32),
    cell_size: f32,
) -> (f32, f32, f32, f32) {
    let cx = (pos.0 as f32 + 0.5) * cell_size + offset.0;
    let cy = (pos.1 as f32 + 0.5) * cell_size + offset.1;
    let thin = cell_size * LASER_WIDTH_FRACTION;
    let long = cell_size - WALL_THICKNESS;
    let (w, h) = match direction {
        GateDirection::Horizontal => (long, thin),
        GateDirection::Vertical => (thin, long),
    };
    (cx - w / 2.0, cy - h / 2.0, w, h)
}

/// Gate across a chokepoint's passage
fn chokepoint_gate<R: Rng + ?Sized>(
    grid: &Grid,
    id: u32,
    pos: CellPos,
    difficulty: u32,
    cell_size: f32,
    rng: &mut R,
) -> LaserGate {
    let open = grid.open_directions(pos);
    let first = open.first().copied().unwrap_or(Direction::Left);
    let straight = open.len() == 2 && open[0].opposite() == open[1];

    // Beam is perpendicular to travel through the first opening; in a bend it
    // sits across that opening so cutting the corner still crosses it
    let direction = if first.is_horizontal() {
        GateDirection::Vertical
    } else {
        GateDirection::Horizontal
    };
    let offset = if straight {
        (0.0, 0.0)
    } else {
        let (dx, dy) = first.offset();
        (dx as f32 * cell_size / 4.0, dy as f32 * cell_size / 4.0)
    };

    let pattern = *TimingPattern::catalog(difficulty)
        .choose(rng)
        .unwrap_or(&TimingPattern::Steady);
    let mut timing = pattern.jittered(rng);
    timing.on_duration = timing.on_duration.min(CHOKEPOINT_MAX_ON_DURATION);

    let (x, y, width, height) = beam_rect(pos, direction, offset, cell_size);
    LaserGate {
        id,
        x,
        y,
        width,
        height,
        direction,
        timing,
        pattern,
        placement: GatePlacement::Chokepoint,
        cell: pos,
    }
}

/// Crossed pair of gates at a junction, half a cycle apart so at most one is lit
fn junction_pair<R: Rng + ?Sized>(
    first_id: u32,
    pos: CellPos,
    difficulty: u32,
    cell_size: f32,
    rng: &mut R,
) -> [LaserGate; 2] {
    let pattern = *TimingPattern::catalog(difficulty)
        .choose(rng)
        .unwrap_or(&TimingPattern::Pulse);
    let mut timing = pattern.jittered(rng);
    timing.on_duration = timing.on_duration.min(JUNCTION_MAX_ON_DURATION);
    let partner_timing = GateTiming {
        phase: (timing.phase + 0.5).rem_euclid(1.0),
        ..timing
    };

    let make = |id, direction, timing| {
        let (x, y, width, height) = beam_rect(pos, direction, (0.0, 0.0), cell_size);
        LaserGate {
            id,
            x,
            y,
            width,
            height,
            direction,
            timing,
            pattern,
            placement: GatePlacement::Junction,
            cell: pos,
        }
    };

    [
        make(first_id, GateDirection::Horizontal, timing),
        make(first_id + 1, GateDirection::Vertical, partner_timing),
    ]
}

/// Pick hazard locations and build their gates
pub fn place_laser_gates<R: Rng + ?Sized>(
    grid: &Grid,
    difficulty: u32,
    start: CellPos,
    goal: CellPos,
    cell_size: f32,
    rng: &mut R,
) -> Vec<LaserGate> {
    let budget = gate_budget(difficulty);
    if budget == 0 {
        return Vec::new();
    }

    let candidates = rank_candidates(grid, difficulty, start, goal);
    let mut gates: Vec<LaserGate> = Vec::with_capacity(budget);
    let mut next_id = 0u32;

    for candidate in candidates {
        let remaining = budget - gates.len();
        if remaining == 0 {
            break;
        }
        match candidate.placement {
            GatePlacement::Chokepoint => {
                gates.push(chokepoint_gate(
                    grid,
                    next_id,
                    candidate.cell,
                    difficulty,
                    cell_size,
                    rng,
                ));
                next_id += 1;
            }
            GatePlacement::Junction if remaining >= 2 => {
                gates.extend(junction_pair(next_id, candidate.cell, difficulty, cell_size, rng));
                next_id += 2;
            }
            GatePlacement::Junction => {}
        }
    }

    gates
}

/// Soften gates that would be lit nearly all the time on a forced passage
///
/// This is a conservative approximation of passability, not a reachability
/// proof over the timed hazard graph. Returns how many gates were changed.
pub fn soften_unbeatable_gates(gates: &mut [LaserGate], grid: &Grid) -> usize {
    let mut softened = 0;
    for gate in gates.iter_mut() {
        if gate.timing.on_duration >= UNBEATABLE_ON_DURATION
            && grid.open_directions(gate.cell).len() == 2
        {
            log::warn!(
                "Softening gate {} at {:?}: on_duration {:.2} -> {:.2}",
                gate.id,
                gate.cell,
                gate.timing.on_duration,
                SOFTENED_ON_DURATION
            );
            gate.timing.on_duration = SOFTENED_ON_DURATION;
            softened += 1;
        }
        gate.timing.on_duration = gate.timing.on_duration.min(MAX_ON_DURATION);
    }
    softened
}
