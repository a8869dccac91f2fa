//! Single-level scores over `i32`, `i64` and `Decimal`

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

simple_score_type!(
    /// A single-level score backed by an `i32`.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoreforge_core::{Score, SimpleScore};
    ///
    /// let score1 = SimpleScore::of(-5);
    /// let score2 = SimpleScore::of(-3);
    ///
    /// assert!(score2 > score1);
    /// assert_eq!(score1.multiply_by(2), SimpleScore::of(-10));
    /// ```
    SimpleScore(i32),
    zero: 0,
    one: 1,
    to_f64: |v| v as f64
);

simple_score_type!(
    /// A single-level score backed by an `i64`.
    SimpleLongScore(i64),
    zero: 0,
    one: 1,
    to_f64: |v| v as f64
);

simple_score_type!(
    /// A single-level score backed by an arbitrary-precision [`Decimal`].
    ///
    /// Weights and match multipliers stay decimal, so fractional impacts
    /// accumulate without rounding.
    SimpleDecimalScore(Decimal),
    zero: Decimal::ZERO,
    one: Decimal::ONE,
    to_f64: |v| v.to_f64().unwrap_or(0.0)
);
