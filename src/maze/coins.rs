//! Collectible scatter

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::grid::{CellPos, Grid};
use crate::consts::*;

/// A collectible coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    /// Maze-local center
    pub position: Vec2,
    pub value: u32,
    pub is_special: bool,
}

/// Regular coins for a difficulty level (before the free-cell cap)
pub fn coin_count(difficulty: u32) -> usize {
    (BASE_COINS + difficulty as usize / 2).min(MAX_COINS)
}

/// Center of a grid cell in maze-local coordinates
pub fn cell_center((x, y): CellPos, cell_size: f32) -> Vec2 {
    Vec2::new((x as f32 + 0.5) * cell_size, (y as f32 + 0.5) * cell_size)
}

/// Place coins on shuffled cell centers, skipping `excluded` cells
///
/// One extra special coin is added when a free cell is left over.
pub fn scatter_coins<R: Rng + ?Sized>(
    grid: &Grid,
    cell_size: f32,
    difficulty: u32,
    excluded: &[CellPos],
    rng: &mut R,
) -> Vec<Coin> {
    let mut free: Vec<CellPos> = grid
        .cells()
        .iter()
        .map(|c| (c.x, c.y))
        .filter(|pos| !excluded.contains(pos))
        .collect();
    free.shuffle(rng);

    let count = coin_count(difficulty).min(free.len());
    let mut coins: Vec<Coin> = free[..count]
        .iter()
        .enumerate()
        .map(|(i, &pos)| Coin {
            id: i as u32,
            position: cell_center(pos, cell_size),
            value: COIN_VALUE,
            is_special: false,
        })
        .collect();

    if let Some(&pos) = free.get(count) {
        coins.push(Coin {
            id: count as u32,
            position: cell_center(pos, cell_size),
            value: COIN_VALUE,
            is_special: true,
        });
    }

    coins
}
