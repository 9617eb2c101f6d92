use super::*;
use chrono::TimeZone;

#[test]
fn test_manual_clock_advances() {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let clock = ManualClock::new(start);

    clock.advance(TimeDelta::minutes(9));

    assert_eq!(clock.now(), start + TimeDelta::minutes(9));
}

#[test]
fn test_manual_clock_set() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    let later = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    clock.set(later);

    assert_eq!(clock.now(), later);
}

#[test]
fn test_system_clock_is_monotonic_enough() {
    let clock = SystemClock;
    let first = clock.now();
    let second = clock.now();
    assert!(second >= first);
}
