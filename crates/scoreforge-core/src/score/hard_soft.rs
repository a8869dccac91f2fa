//! Two-level hard/soft score

use std::fmt;

use super::Score;

/// A score with a hard level that decides feasibility and a soft level
/// that ranks feasible solutions.
///
/// The hard level always dominates:
///
/// ```
/// use scoreforge_core::HardSoftScore;
///
/// let broken = HardSoftScore::of(-1, 0);
/// let costly = HardSoftScore::of(0, -500);
/// assert!(costly > broken);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardSoftScore {
    hard: i64,
    soft: i64,
}

impl HardSoftScore {
    pub const ZERO: HardSoftScore = HardSoftScore::of(0, 0);
    pub const ONE_HARD: HardSoftScore = HardSoftScore::of_hard(1);
    pub const ONE_SOFT: HardSoftScore = HardSoftScore::of_soft(1);

    pub const fn of(hard: i64, soft: i64) -> Self {
        Self { hard, soft }
    }

    pub const fn of_hard(hard: i64) -> Self {
        Self::of(hard, 0)
    }

    pub const fn of_soft(soft: i64) -> Self {
        Self::of(0, soft)
    }

    pub const fn hard(&self) -> i64 {
        self.hard
    }

    pub const fn soft(&self) -> i64 {
        self.soft
    }
}

impl Score for HardSoftScore {
    type Multiplier = i64;

    fn zero() -> Self {
        Self::ZERO
    }

    fn is_feasible(&self) -> bool {
        self.hard >= 0
    }

    fn levels_count() -> usize {
        2
    }

    fn feasible_levels_count() -> usize {
        1
    }

    fn to_level_numbers(&self) -> Vec<f64> {
        vec![self.hard as f64, self.soft as f64]
    }

    fn multiply_by(&self, multiplier: i64) -> Self {
        Self::of(self.hard * multiplier, self.soft * multiplier)
    }
}

impl_level_arithmetic!(HardSoftScore { hard, soft } => of);
impl_labeled_text!(HardSoftScore { hard => "hard", soft => "soft" }: i64 => of);

impl fmt::Debug for HardSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HardSoftScore({self})")
    }
}
