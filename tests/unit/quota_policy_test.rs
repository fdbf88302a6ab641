//! Unit tests for the advisory storage quota.

use classroom_offline::services::quota_policy::{QuotaPolicy, DEFAULT_STORAGE_LIMIT_MB};
use rstest::rstest;

#[test]
fn test_default_limit() {
    assert_eq!(QuotaPolicy::default().limit_mb(), DEFAULT_STORAGE_LIMIT_MB);
    assert_eq!(DEFAULT_STORAGE_LIMIT_MB, 5120);
}

#[test]
fn test_three_downloads_sum_to_display_figure() {
    let total = 104_857_600u64 + 262_563_430 + 10_485_760;
    let usage = QuotaPolicy::default().usage(total);
    assert_eq!(usage.used_mb, 360.4);
    assert_eq!(usage.display(), "360.4 MB / 5120 MB");
    assert!((usage.fraction - 360.4 / 5120.0).abs() < 1e-9);
    assert!(!usage.is_over_limit());
}

#[rstest]
#[case(0, 0.0)]
#[case(1_048_576, 1.0)]
#[case(1_572_864, 1.5)]
#[case(52_428, 0.0)]
#[case(52_429, 0.1)]
fn test_used_mb_rounds_to_one_decimal(#[case] bytes: u64, #[case] expected: f64) {
    assert_eq!(QuotaPolicy::default().usage(bytes).used_mb, expected);
}

#[test]
fn test_fraction_is_clamped_when_over_limit() {
    let usage = QuotaPolicy::new(1).usage(3 * 1_048_576);
    assert_eq!(usage.fraction, 1.0);
    assert!(usage.is_over_limit());
    assert_eq!(usage.display(), "3.0 MB / 1 MB");
}

#[test]
fn test_zero_limit_reads_as_full() {
    let usage = QuotaPolicy::new(0).usage(0);
    assert_eq!(usage.fraction, 1.0);
    assert_eq!(usage.limit_mb, 0);
}
