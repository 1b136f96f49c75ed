//! Food tiers and their countdowns.

use crate::grid::Position;

/// Food category. The variant order matches the spawn table columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FoodTier {
    /// Red, never expires.
    Common,
    /// Yellow.
    Uncommon,
    /// Blue.
    Rare,
    /// Purple.
    Epic,
}

impl FoodTier {
    pub const ALL: [FoodTier; 4] = [
        FoodTier::Common,
        FoodTier::Uncommon,
        FoodTier::Rare,
        FoodTier::Epic,
    ];

    /// 1-based tier number.
    pub fn number(self) -> u8 {
        match self {
            FoodTier::Common => 1,
            FoodTier::Uncommon => 2,
            FoodTier::Rare => 3,
            FoodTier::Epic => 4,
        }
    }

    pub fn points(self) -> u32 {
        match self {
            FoodTier::Common => 1,
            FoodTier::Uncommon => 2,
            FoodTier::Rare => 3,
            FoodTier::Epic => 5,
        }
    }

    /// Segments added to the snake's target length when eaten.
    pub fn growth(self) -> usize {
        match self {
            FoodTier::Common => 1,
            FoodTier::Uncommon => 2,
            FoodTier::Rare => 3,
            FoodTier::Epic => 4,
        }
    }

    /// Ticks until the food disappears, `None` for food that stays.
    pub fn lifetime(self) -> Option<u32> {
        match self {
            FoodTier::Common => None,
            FoodTier::Uncommon => Some(150),
            FoodTier::Rare => Some(100),
            FoodTier::Epic => Some(80),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Food {
    tier: FoodTier,
    position: Position,
    remaining: Option<u32>,
    active: bool,
}

impl Food {
    pub fn new(tier: FoodTier, position: Position) -> Self {
        Food {
            tier,
            position,
            remaining: tier.lifetime(),
            active: true,
        }
    }

    pub fn tier(&self) -> FoodTier {
        self.tier
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Ticks left before expiry, `None` if this food never expires.
    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Counts one tick down. Returns whether the food is still active.
    pub fn tick(&mut self) -> bool {
        if let Some(left) = self.remaining.as_mut() {
            *left = left.saturating_sub(1);
            if *left == 0 {
                self.active = false;
            }
        }
        self.active
    }

    pub fn is_at(&self, pos: Position) -> bool {
        self.active && self.position == pos
    }
}
