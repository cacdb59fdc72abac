//! Scalar resource counters and the costs paid out of them.

use std::ops::{AddAssign, Mul};

use serde::{Deserialize, Serialize};

/// Numeric type used for every resource counter.
pub type Amount = f64;

/// The six resource counters tracked by a [`GameState`](crate::state::GameState).
///
/// The same type doubles as a per-tick production delta, in which case
/// individual fields may be negative (e.g. miners drain energy).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    pub tokens: Amount,
    pub energy: Amount,
    pub knowledge: Amount,
    pub reputation: Amount,
    pub students_inspired: Amount,
    pub consensus_health: Amount,
}

impl Resources {
    /// Returns true if every counter can cover the corresponding field of
    /// `cost`.
    #[inline]
    pub fn can_afford(&self, cost: &Cost) -> bool {
        self.tokens >= cost.tokens
            && self.knowledge >= cost.knowledge
            && self.energy >= cost.energy
    }

    /// Deducts `cost` without checking affordability. Callers are expected
    /// to call [`Resources::can_afford`] first.
    pub fn pay(&mut self, cost: &Cost) {
        self.tokens -= cost.tokens;
        self.knowledge -= cost.knowledge;
        self.energy -= cost.energy;
    }

    /// Clamps the bounded counters into `0.0..=energy_max` and
    /// `0.0..=health_max` respectively.
    pub fn clamp_bounded(&mut self, energy_max: Amount, health_max: Amount) {
        self.energy = self.energy.clamp(0.0, energy_max);
        self.consensus_health = self.consensus_health.clamp(0.0, health_max);
    }
}

impl AddAssign for Resources {
    fn add_assign(&mut self, rhs: Self) {
        self.tokens += rhs.tokens;
        self.energy += rhs.energy;
        self.knowledge += rhs.knowledge;
        self.reputation += rhs.reputation;
        self.students_inspired += rhs.students_inspired;
        self.consensus_health += rhs.consensus_health;
    }
}

impl Mul<Amount> for Resources {
    type Output = Resources;

    fn mul(self, rhs: Amount) -> Self::Output {
        Resources {
            tokens: self.tokens * rhs,
            energy: self.energy * rhs,
            knowledge: self.knowledge * rhs,
            reputation: self.reputation * rhs,
            students_inspired: self.students_inspired * rhs,
            consensus_health: self.consensus_health * rhs,
        }
    }
}

/// Price of an action, paid in tokens, knowledge and energy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    pub tokens: Amount,
    pub knowledge: Amount,
    pub energy: Amount,
}

impl Cost {
    pub const fn new(tokens: Amount, knowledge: Amount, energy: Amount) -> Self {
        Cost { tokens, knowledge, energy }
    }

    /// A cost paid only in tokens.
    pub const fn tokens(tokens: Amount) -> Self {
        Cost { tokens, knowledge: 0.0, energy: 0.0 }
    }

    /// Returns true if no field is negative or NaN.
    pub fn is_valid(&self) -> bool {
        [self.tokens, self.knowledge, self.energy]
            .iter()
            .all(|x| !x.is_nan() && *x >= 0.0)
    }
}

impl std::fmt::Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} tokens, {} knowledge, {} energy",
            self.tokens, self.knowledge, self.energy
        )
    }
}
