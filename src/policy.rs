//! Score-driven rules: which food tier spawns, where it lands, how much food
//! is on the board and how fast the game ticks.

use std::collections::HashSet;

use rand::seq::IteratorRandom;
use rand::Rng;
use serde::Deserialize;

use crate::food::FoodTier;
use crate::grid::{Grid, Position};

/// Ticks per second at score zero.
pub const BASE_SPEED: u32 = 8;
/// Upper bound on ticks per second.
pub const MAX_SPEED: u32 = 20;
/// Points needed for each extra tick per second.
pub const SPEED_INTERVAL: u32 = 5;

/// Random positions tried before falling back to scanning for free cells.
const SPAWN_REROLLS: usize = 64;

/// Spawn percentages for tiers 1 to 4. Always sums to 100.
pub fn spawn_chances(score: u32) -> [u32; 4] {
    match score {
        0..=9 => [85, 15, 0, 0],
        10..=24 => [70, 25, 5, 0],
        25..=49 => [60, 25, 12, 3],
        _ => [50, 30, 15, 5],
    }
}

/// Maps a roll in `1..=100` onto the cumulative bands of `chances`.
pub fn tier_for_roll(chances: [u32; 4], roll: u32) -> FoodTier {
    let mut upper = 0;
    for (tier, chance) in FoodTier::ALL.into_iter().zip(chances) {
        upper += chance;
        if roll <= upper {
            return tier;
        }
    }
    FoodTier::Epic
}

pub fn roll_tier<R: Rng>(rng: &mut R, score: u32) -> FoodTier {
    tier_for_roll(spawn_chances(score), rng.gen_range(1..=100))
}

/// Least number of active food items the board should hold.
pub fn min_food_count(score: u32) -> usize {
    (2 + score as usize / 15).min(4)
}

/// Picks a cell not in `occupied`, or `None` when every cell is taken.
///
/// A bounded number of uniform rerolls is tried first; after that the free
/// cells are enumerated so the search always terminates.
pub fn free_cell<R: Rng>(
    rng: &mut R,
    grid: &Grid,
    occupied: &HashSet<Position>,
) -> Option<Position> {
    if occupied.len() >= grid.cell_count() {
        return None;
    }
    for _ in 0..SPAWN_REROLLS {
        let pos = Position::new(
            rng.gen_range(0..grid.width()),
            rng.gen_range(0..grid.height()),
        );
        if !occupied.contains(&pos) {
            return Some(pos);
        }
    }
    grid.cells().filter(|pos| !occupied.contains(pos)).choose(rng)
}

/// Linear speed-up with score, capped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpeedCurve {
    pub base: u32,
    pub max: u32,
    pub interval: u32,
}

impl Default for SpeedCurve {
    fn default() -> Self {
        SpeedCurve {
            base: BASE_SPEED,
            max: MAX_SPEED,
            interval: SPEED_INTERVAL,
        }
    }
}

impl SpeedCurve {
    /// Ticks per second for `score`.
    pub fn speed(&self, score: u32) -> u32 {
        (self.base + score / self.interval.max(1)).min(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn chances_sum_to_100_at_boundaries() {
        for score in [0, 9, 10, 24, 25, 49, 50, 1_000] {
            assert_eq!(spawn_chances(score).iter().sum::<u32>(), 100, "score {score}");
        }
    }

    #[test]
    fn chance_steps() {
        assert_eq!(spawn_chances(9), [85, 15, 0, 0]);
        assert_eq!(spawn_chances(10), [70, 25, 5, 0]);
        assert_eq!(spawn_chances(24), [70, 25, 5, 0]);
        assert_eq!(spawn_chances(25), [60, 25, 12, 3]);
        assert_eq!(spawn_chances(49), [60, 25, 12, 3]);
        assert_eq!(spawn_chances(50), [50, 30, 15, 5]);
    }

    #[test]
    fn rolls_map_onto_bands() {
        let chances = [60, 25, 12, 3];
        assert_eq!(tier_for_roll(chances, 1), FoodTier::Common);
        assert_eq!(tier_for_roll(chances, 60), FoodTier::Common);
        assert_eq!(tier_for_roll(chances, 61), FoodTier::Uncommon);
        assert_eq!(tier_for_roll(chances, 85), FoodTier::Uncommon);
        assert_eq!(tier_for_roll(chances, 86), FoodTier::Rare);
        assert_eq!(tier_for_roll(chances, 97), FoodTier::Rare);
        assert_eq!(tier_for_roll(chances, 98), FoodTier::Epic);
        assert_eq!(tier_for_roll(chances, 100), FoodTier::Epic);
    }

    #[test]
    fn zero_chance_tiers_never_roll() {
        let chances = spawn_chances(0);
        for roll in 1..=100 {
            let tier = tier_for_roll(chances, roll);
            assert!(matches!(tier, FoodTier::Common | FoodTier::Uncommon));
        }
    }

    #[test]
    fn food_count_grows_then_caps() {
        assert_eq!(min_food_count(0), 2);
        assert_eq!(min_food_count(14), 2);
        assert_eq!(min_food_count(15), 3);
        assert_eq!(min_food_count(30), 4);
        assert_eq!(min_food_count(500), 4);
    }

    #[test]
    fn speed_curve() {
        let curve = SpeedCurve::default();
        assert_eq!(curve.speed(0), 8);
        assert_eq!(curve.speed(4), 8);
        assert_eq!(curve.speed(5), 9);
        assert_eq!(curve.speed(60), 20);
        assert_eq!(curve.speed(10_000), 20);
    }

    #[test]
    fn free_cell_finds_the_last_hole() {
        let grid = Grid::new(6, 5);
        let hole = Position::new(4, 3);
        let occupied: HashSet<_> = grid.cells().filter(|&p| p != hole).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(free_cell(&mut rng, &grid, &occupied), Some(hole));
        }
    }

    #[test]
    fn free_cell_on_a_full_grid() {
        let grid = Grid::new(3, 3);
        let occupied: HashSet<_> = grid.cells().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(free_cell(&mut rng, &grid, &occupied), None);
    }
}
