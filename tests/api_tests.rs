use approx::assert_abs_diff_eq;
use parafold::prelude::*;

// ============================================================================
// Reduce
// ============================================================================

#[test]
fn test_reduce_sum_with_init_across_four_workers() {
    let data: Vec<i32> = (0..16).collect();
    let result = reduce(&ExecutionPolicy::host_with_workers(4), &data, 42, Sum).unwrap();
    assert_eq!(result, 120 + 42);
}

#[test]
fn test_reduce_empty_returns_init() {
    let data: Vec<i32> = vec![];
    for policy in [ExecutionPolicy::Sequential, ExecutionPolicy::host()] {
        assert_eq!(reduce(&policy, &data, 7, Sum).unwrap(), 7);
        assert_eq!(reduce(&policy, &data, 7, Max).unwrap(), 7);
    }
}

#[test]
fn test_reduce_single_element() {
    let data = vec![5i32];
    let result = reduce(&ExecutionPolicy::host_with_workers(8), &data, 2, Sum).unwrap();
    assert_eq!(result, 7);
}

#[test]
fn test_reduce_policies_agree() {
    let data: Vec<u32> = (0..1000).map(|i| i * 7 % 256).collect();
    for op in [Sum, Min, Max] {
        let baseline = reduce(&ExecutionPolicy::Sequential, &data, op.identity(), op).unwrap();
        for workers in [1, 3, 7] {
            let got = reduce(
                &ExecutionPolicy::host_with_workers(workers),
                &data,
                op.identity(),
                op,
            )
            .unwrap();
            assert_eq!(got, baseline, "op {op:?}, workers {workers}");
        }
    }
}

#[test]
fn test_reduce_product() {
    let data = vec![1i32, 2, 3, 4];
    let result = reduce(&ExecutionPolicy::host_with_workers(2), &data, 2, Product).unwrap();
    assert_eq!(result, 48);
}

#[test]
fn test_reduce_f64_on_host() {
    let data: Vec<f64> = (1..=100).map(f64::from).collect();
    let result = reduce(&ExecutionPolicy::host(), &data, 0.0, Sum).unwrap();
    assert_abs_diff_eq!(result, 5050.0, epsilon = 1e-9);
}

// ============================================================================
// Transform
// ============================================================================

#[test]
fn test_transform_abs() {
    let data = vec![-2i32, 3, -5, 7];
    let mut out = vec![0i32; 4];
    transform(&ExecutionPolicy::host_with_workers(2), &data, &mut out, Abs).unwrap();
    assert_eq!(out, [2, 3, 5, 7]);
}

#[test]
fn test_transform_rejects_mismatched_lengths() {
    let data = vec![1.0f32; 8];
    let mut out = vec![0.0f32; 7];
    let err = transform(&ExecutionPolicy::Sequential, &data, &mut out, Identity).unwrap_err();
    match err {
        ParafoldError::MismatchedLengths { input, output } => {
            assert_eq!(input, 8);
            assert_eq!(output, 7);
        }
        other => panic!("expected MismatchedLengths, got {other}"),
    }
}

#[test]
fn test_transform_empty_is_a_no_op() {
    let data: Vec<f32> = vec![];
    let mut out: Vec<f32> = vec![];
    transform(&ExecutionPolicy::host(), &data, &mut out, Square).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_transform_policies_agree() {
    let data: Vec<f32> = (0..500).map(|i| (i as f32) * 0.25 - 60.0).collect();
    let mut baseline = vec![0.0f32; data.len()];
    transform(&ExecutionPolicy::Sequential, &data, &mut baseline, Square).unwrap();

    let mut out = vec![0.0f32; data.len()];
    transform(&ExecutionPolicy::host_with_workers(3), &data, &mut out, Square).unwrap();
    for (a, b) in out.iter().zip(&baseline) {
        assert_abs_diff_eq!(a, b);
    }
}

// ============================================================================
// Transform-Reduce
// ============================================================================

#[test]
fn test_transform_reduce_sum_of_squares() {
    let data: Vec<i32> = (1..=10).collect();
    let result =
        transform_reduce(&ExecutionPolicy::host_with_workers(4), &data, 0, Sum, Square).unwrap();
    assert_eq!(result, 385);
}

#[test]
fn test_transform_reduce_max_abs() {
    let data = vec![3.0f32, -9.5, 4.0, -1.0];
    let result = transform_reduce(
        &ExecutionPolicy::host(),
        &data,
        0.0,
        Max,
        Abs,
    )
    .unwrap();
    assert_abs_diff_eq!(result, 9.5);
}

#[test]
fn test_transform_reduce_empty_returns_init() {
    let data: Vec<i32> = vec![];
    let result = transform_reduce(&ExecutionPolicy::host(), &data, 9, Sum, Square).unwrap();
    assert_eq!(result, 9);
}

// ============================================================================
// Inclusive Scan
// ============================================================================

#[test]
fn test_inclusive_scan_running_sum_with_init() {
    let data = vec![1i32, 2, 3, 4];
    let mut out = vec![0i32; 4];
    inclusive_scan(
        &ExecutionPolicy::host_with_workers(2),
        &data,
        &mut out,
        10,
        Sum,
    )
    .unwrap();
    assert_eq!(out, [11, 13, 16, 20]);
}

#[test]
fn test_inclusive_scan_policies_agree() {
    let data: Vec<u32> = (0..777).map(|i| i % 13).collect();
    let mut baseline = vec![0u32; data.len()];
    inclusive_scan(&ExecutionPolicy::Sequential, &data, &mut baseline, 0, Sum).unwrap();

    for workers in [1, 2, 5] {
        let mut out = vec![0u32; data.len()];
        inclusive_scan(
            &ExecutionPolicy::host_with_workers(workers),
            &data,
            &mut out,
            0,
            Sum,
        )
        .unwrap();
        assert_eq!(out, baseline, "workers = {workers}");
    }
}

#[test]
fn test_inclusive_scan_rejects_mismatched_lengths() {
    let data = vec![1i32, 2, 3];
    let mut out = vec![0i32; 2];
    let err =
        inclusive_scan(&ExecutionPolicy::Sequential, &data, &mut out, 0, Sum).unwrap_err();
    assert!(matches!(err, ParafoldError::MismatchedLengths { .. }));
}

#[test]
fn test_inclusive_scan_last_element_equals_reduce() {
    let data: Vec<i32> = (0..16).collect();
    let policy = ExecutionPolicy::host_with_workers(4);
    let mut out = vec![0i32; data.len()];
    inclusive_scan(&policy, &data, &mut out, 42, Sum).unwrap();
    let total = reduce(&policy, &data, 42, Sum).unwrap();
    assert_eq!(*out.last().unwrap(), total);
}
