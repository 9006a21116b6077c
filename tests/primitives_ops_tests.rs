use approx::assert_abs_diff_eq;
use parafold::prelude::*;

#[test]
fn test_combine_identities() {
    assert_eq!(Sum.identity::<i32>(), 0);
    assert_eq!(Product.identity::<i32>(), 1);
    assert_eq!(Min.identity::<i32>(), i32::MAX);
    assert_eq!(Max.identity::<i32>(), i32::MIN);

    assert_abs_diff_eq!(Sum.identity::<f32>(), 0.0);
    assert_abs_diff_eq!(Product.identity::<f32>(), 1.0);
    assert_eq!(Min.identity::<f32>(), f32::MAX);
    assert_eq!(Max.identity::<f32>(), f32::MIN);

    assert_eq!(Min.identity::<u32>(), u32::MAX);
    assert_eq!(Max.identity::<u32>(), u32::MIN);
}

#[test]
fn test_identity_is_neutral_under_apply() {
    for op in [Sum, Product, Min, Max] {
        for x in [-5i32, 0, 1, 42] {
            assert_eq!(op.apply(op.identity::<i32>(), x), x);
            assert_eq!(op.apply(x, op.identity::<i32>()), x);
        }
    }
}

#[test]
fn test_combine_apply() {
    assert_eq!(Sum.apply(3, 4), 7);
    assert_eq!(Product.apply(3, 4), 12);
    assert_eq!(Min.apply(3, 4), 3);
    assert_eq!(Max.apply(3, 4), 4);
    assert_abs_diff_eq!(Min.apply(-1.5f32, 2.0), -1.5);
}

#[test]
fn test_map_apply() {
    assert_eq!(Identity.apply(7i32), 7);
    assert_eq!(Square.apply(-3i32), 9);
    assert_eq!(Abs.apply(-3i32), 3);
    assert_eq!(Abs.apply(3u32), 3);
    assert_abs_diff_eq!(Square.apply(1.5f32), 2.25);
}

#[test]
fn test_wrapping_abs_on_signed_minimum() {
    // i32::MIN has no positive counterpart; the map must not overflow.
    assert_eq!(Abs.apply(i32::MIN), i32::MIN.wrapping_abs());
}
