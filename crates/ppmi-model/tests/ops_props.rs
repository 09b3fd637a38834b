//! Property tests for the operator interpreters.

use ppmi_model::{ItemTransform, Reducer};
use proptest::prelude::*;

proptest! {
    #[test]
    fn reciprocal_is_multiplicative_inverse(x in -1.0e6f64..1.0e6) {
        prop_assume!(x != 0.0);
        let inverted = ItemTransform::Reciprocal.apply(x);
        prop_assert!((inverted - 1.0 / x).abs() <= f64::EPSILON * (1.0 / x).abs());
    }

    #[test]
    fn any_true_matches_manual_or(values in prop::collection::vec(0.0f64..5.0, 1..8)) {
        let expected = if values.iter().any(|v| *v != 0.0) { 1.0 } else { 0.0 };
        prop_assert_eq!(Reducer::AnyTrue.reduce(&values), expected);
    }

    #[test]
    fn reverse_scale_is_an_involution(x in -100.0f64..100.0, pivot in -10.0f64..10.0) {
        let transform = ItemTransform::ReverseScale { pivot };
        let twice = transform.apply(transform.apply(x));
        prop_assert!((twice - x).abs() < 1.0e-9);
    }

    #[test]
    fn nan_mean_never_exceeds_max_input(values in prop::collection::vec(-50.0f64..50.0, 1..8)) {
        let mean = Reducer::NanMean.reduce(&values);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        prop_assert!(mean <= max + 1.0e-9 && mean >= min - 1.0e-9);
    }
}

#[test]
fn reciprocal_of_zero_is_positive_infinity() {
    assert_eq!(ItemTransform::Reciprocal.apply(0.0), f64::INFINITY);
}

#[test]
fn operator_enums_round_trip_through_serde() {
    let transform = ItemTransform::RecodeSentinel {
        sentinel: 9.0,
        replacement: 3.0,
    };
    let encoded = serde_json::to_string(&transform).unwrap();
    let decoded: ItemTransform = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, transform);

    let encoded = serde_json::to_string(&Reducer::NanMean).unwrap();
    let decoded: Reducer = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, Reducer::NanMean);
}
