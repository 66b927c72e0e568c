use wata_core::countdown::{remaining_ms, tick, MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE};
use wata_core::CountdownState;

#[test]
fn decomposes_remaining_time_into_panels() {
    let target = 3 * MS_PER_DAY + 4 * MS_PER_HOUR + 5 * MS_PER_MINUTE + 6_999;
    let state = tick(0, target);
    assert_eq!(
        state,
        CountdownState {
            days: 3,
            hours: 4,
            minutes: 5,
            seconds: 6,
        }
    );
    assert_eq!(state.to_string(), "03d 04:05:06");
}

#[test]
fn fields_stay_within_clock_bounds() {
    let target = 400 * MS_PER_DAY;
    for now in (0..target).step_by(7_919_993) {
        let state = tick(now, target);
        assert!(state.hours < 24);
        assert!(state.minutes < 60);
        assert!(state.seconds < 60);
        assert!(state.total_ms() <= remaining_ms(now, target));
        assert!(remaining_ms(now, target) - state.total_ms() < 1_000);
    }
}

#[test]
fn zero_at_and_after_target() {
    let target = 1_767_225_600_000;
    assert!(tick(target, target).is_zero());
    assert!(tick(target + 1, target).is_zero());
    assert!(tick(target + 10 * MS_PER_DAY, target).is_zero());
}

#[test]
fn sub_second_remainder_floors_to_zero_seconds() {
    let state = tick(0, 999);
    assert!(state.is_zero());
    assert!(remaining_ms(0, 999) > 0);
}

#[test]
fn panels_are_zero_padded() {
    let state = tick(0, 2 * MS_PER_DAY + 9_000);
    let panels = state.panels();
    assert_eq!(panels[0], ("Days", "02".to_string()));
    assert_eq!(panels[3], ("Sec", "09".to_string()));
}
