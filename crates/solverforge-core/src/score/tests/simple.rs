use crate::score::*;

#[test]
fn test_ordering_and_feasibility() {
    assert!(SimpleScore::of(0) > SimpleScore::of(-5));
    assert!(SimpleScore::of(0).is_feasible());
    assert!(!SimpleScore::of(-1).is_feasible());
    assert_eq!(SimpleScore::default(), SimpleScore::ZERO);
}

#[test]
fn test_arithmetic() {
    let a = SimpleScore::of(10);
    let b = SimpleScore::of(3);
    assert_eq!(a + b, SimpleScore::of(13));
    assert_eq!(a - b, SimpleScore::of(7));
    assert_eq!(-a, SimpleScore::of(-10));
    assert_eq!(SimpleScore::from(4), SimpleScore::of(4));
}

#[test]
fn test_levels() {
    let score = SimpleScore::of(-5);
    assert_eq!(SimpleScore::levels_count(), 1);
    assert_eq!(score.to_level_numbers(), vec![-5]);
    assert_eq!(SimpleScore::level_label(0), Some(ScoreLevel::Soft));
    assert_eq!(SimpleScore::level_label(1), None);
}

#[test]
fn test_scale_is_exact() {
    let score = SimpleScore::of(-7);
    assert_eq!(score.scale(3), SimpleScore::of(-21));
    assert!(score.scale(0).is_zero());
    assert!(!score.is_zero());
}

#[test]
fn test_text_form() {
    assert_eq!(SimpleScore::of(-10).to_string(), "-10");
    assert_eq!(format!("{:?}", SimpleScore::of(2)), "SimpleScore(2)");
    assert_eq!(SimpleScore::parse(" 42 ").unwrap(), SimpleScore::of(42));
    assert!(SimpleScore::parse("").is_err());
    assert!(SimpleScore::parse("1/2").is_err());
    assert!(SimpleScore::parse("0hard").is_err());
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn add_then_sub_restores(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
            let total = SimpleScore::of(a) + SimpleScore::of(b);
            prop_assert_eq!(total - SimpleScore::of(b), SimpleScore::of(a));
        }

        #[test]
        fn parse_reads_to_string_repr(v in any::<i32>()) {
            let score = SimpleScore::of(v as i64);
            prop_assert_eq!(SimpleScore::parse(&score.to_string_repr()).unwrap(), score);
        }
    }
}
