//! Tests for score types.

use rust_decimal::Decimal;

use super::*;

mod simple_score {
    use super::*;

    #[test]
    fn test_creation() {
        let score = SimpleScore::of(-5);
        assert_eq!(score.score(), -5);
        assert_eq!(SimpleScore::ONE, SimpleScore::of(1));
    }

    #[test]
    fn test_always_feasible() {
        assert!(SimpleScore::of(-1).is_feasible());
        assert_eq!(SimpleScore::feasible_levels_count(), 0);
    }

    #[test]
    fn test_comparison() {
        let mut scores = vec![SimpleScore::of(0), SimpleScore::of(-10), SimpleScore::of(-5)];
        scores.sort();
        assert_eq!(scores, vec![SimpleScore::of(-10), SimpleScore::of(-5), SimpleScore::of(0)]);
        assert_eq!(scores.iter().max(), Some(&SimpleScore::ZERO));
    }

    #[test]
    fn test_arithmetic() {
        let s1 = SimpleScore::of(10);
        let s2 = SimpleScore::of(3);

        assert_eq!(s1 + s2, SimpleScore::of(13));
        assert_eq!(s1 - s2, SimpleScore::of(7));
        assert_eq!(-s1, SimpleScore::of(-10));
        assert_eq!(s1.multiply_by(-4), SimpleScore::of(-40));
    }

    #[test]
    fn test_parse() {
        assert_eq!(SimpleScore::parse("42").unwrap(), SimpleScore::of(42));
        assert_eq!(SimpleScore::parse(" -10 ").unwrap(), SimpleScore::of(-10));
        assert!(matches!(
            SimpleScore::parse("0hard/0soft"),
            Err(ScoreParseError::InvalidNumber { .. })
        ));
        assert_eq!(SimpleScore::of(-7).to_string_repr(), "-7");
    }

    #[test]
    fn test_level_numbers() {
        assert_eq!(SimpleScore::of(-5).to_level_numbers(), vec![-5.0]);
    }
}

mod simple_long_score {
    use super::*;

    #[test]
    fn test_multiply_stays_wide() {
        let weight = SimpleLongScore::of(3_000_000_000);
        assert_eq!(weight.multiply_by(2), SimpleLongScore::of(6_000_000_000));
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            SimpleLongScore::parse("-9000000000").unwrap(),
            SimpleLongScore::of(-9_000_000_000)
        );
    }
}

mod simple_decimal_score {
    use super::*;

    #[test]
    fn test_multiply_keeps_precision() {
        let weight = SimpleDecimalScore::of(Decimal::new(15, 1));
        let product = weight.multiply_by(Decimal::new(3, 0));
        assert_eq!(product, SimpleDecimalScore::of(Decimal::new(45, 1)));
    }

    #[test]
    fn test_sum_is_exact() {
        let tenth = SimpleDecimalScore::of(Decimal::new(1, 1));
        let total = (0..10).fold(SimpleDecimalScore::ZERO, |acc, _| acc + tenth);
        assert_eq!(total, SimpleDecimalScore::ONE);
    }

    #[test]
    fn test_parse_and_display() {
        let score = SimpleDecimalScore::parse("-1.25").unwrap();
        assert_eq!(score, SimpleDecimalScore::of(Decimal::new(-125, 2)));
        assert_eq!(score.to_string(), "-1.25");
        assert_eq!(score.to_level_numbers(), vec![-1.25]);
    }
}

mod hard_soft_score {
    use super::*;

    #[test]
    fn test_creation() {
        let score = HardSoftScore::of(-2, -10);
        assert_eq!(score.hard(), -2);
        assert_eq!(score.soft(), -10);
        assert_eq!(HardSoftScore::of_hard(-1), HardSoftScore::of(-1, 0));
        assert_eq!(HardSoftScore::of_soft(5), HardSoftScore::of(0, 5));
    }

    #[test]
    fn test_feasibility() {
        assert!(HardSoftScore::of(0, -1000).is_feasible());
        assert!(!HardSoftScore::of(-1, 0).is_feasible());
        assert_eq!(HardSoftScore::feasible_levels_count(), 1);
    }

    #[test]
    fn test_comparison() {
        assert!(HardSoftScore::of(0, -200) > HardSoftScore::of(-1, 0));
        assert!(HardSoftScore::of(0, -50) > HardSoftScore::of(0, -200));
    }

    #[test]
    fn test_multiply_by() {
        assert_eq!(
            HardSoftScore::ONE_HARD.multiply_by(3),
            HardSoftScore::of(3, 0)
        );
        assert_eq!(
            HardSoftScore::of(1, 2).multiply_by(-2),
            HardSoftScore::of(-2, -4)
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            HardSoftScore::parse("0hard/-10soft").unwrap(),
            HardSoftScore::of(0, -10)
        );
        assert_eq!(
            HardSoftScore::parse(" -3hard / 7soft ").unwrap(),
            HardSoftScore::of(-3, 7)
        );
        assert_eq!(
            HardSoftScore::parse("0hard").unwrap_err(),
            ScoreParseError::LevelCount {
                score_type: "HardSoftScore",
                text: "0hard".to_string(),
                expected: 2,
            }
        );
        assert!(matches!(
            HardSoftScore::parse("0soft/0hard"),
            Err(ScoreParseError::MissingLabel { label: "hard", .. })
        ));
        assert!(matches!(
            HardSoftScore::parse("0hard/xsoft"),
            Err(ScoreParseError::InvalidNumber { .. })
        ));
        assert_eq!(HardSoftScore::of(-1, 5).to_string_repr(), "-1hard/5soft");
    }

    #[test]
    fn test_display() {
        let score = HardSoftScore::of(-3, 4);
        assert_eq!(score.to_string(), "-3hard/4soft");
        assert_eq!(format!("{score:?}"), "HardSoftScore(-3hard/4soft)");
        assert_eq!(score.to_level_numbers(), vec![-3.0, 4.0]);
    }
}
