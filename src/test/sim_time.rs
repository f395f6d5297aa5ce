use crate::sim::SimTime;

#[test]
fn sim_time_unit_conversions() {
    assert_eq!(SimTime::from_micros(1), SimTime(1_000));
    assert_eq!(SimTime::from_millis(1), SimTime(1_000_000));
    assert_eq!(SimTime::from_secs(1), SimTime(1_000_000_000));
    assert_eq!(SimTime::from_secs_f64(0.5), SimTime(500_000_000));
    assert_eq!(SimTime::from_secs(3).as_secs_f64(), 3.0);
}

#[test]
fn sim_time_unit_conversions_saturate_on_overflow() {
    assert_eq!(SimTime::from_micros(u64::MAX), SimTime(u64::MAX));
    assert_eq!(SimTime::from_millis(u64::MAX), SimTime(u64::MAX));
    assert_eq!(SimTime::from_secs(u64::MAX), SimTime(u64::MAX));
    assert_eq!(SimTime::from_secs_f64(1e30), SimTime::MAX);
    assert_eq!(SimTime::MAX.saturating_add(SimTime(1)), SimTime::MAX);
}

#[test]
fn sim_time_from_negative_or_nan_secs_is_zero() {
    assert_eq!(SimTime::from_secs_f64(-1.0), SimTime::ZERO);
    assert_eq!(SimTime::from_secs_f64(f64::NAN), SimTime::ZERO);
    assert_eq!(SimTime(3).saturating_sub(SimTime(5)), SimTime::ZERO);
}
