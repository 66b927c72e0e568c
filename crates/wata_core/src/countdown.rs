//! Countdown engine.
//!
//! # Responsibility
//! - Break the time left until the target into days/hours/minutes/seconds.
//!
//! # Invariants
//! - `tick` is pure; it never looks at the wall clock itself.
//! - A target at or before `now` yields all zeros.
//! - Every unit is floored; nothing is rounded up.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Milliseconds in one day.
pub const MS_PER_DAY: i64 = 86_400_000;
/// Milliseconds in one hour.
pub const MS_PER_HOUR: i64 = 3_600_000;
/// Milliseconds in one minute.
pub const MS_PER_MINUTE: i64 = 60_000;
/// Milliseconds in one second.
pub const MS_PER_SECOND: i64 = 1_000;

/// Remaining-time breakdown shown on the countdown panels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownState {
    pub days: u64,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl CountdownState {
    /// Whether every unit is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Milliseconds represented by this breakdown.
    pub fn total_ms(&self) -> i64 {
        self.days as i64 * MS_PER_DAY
            + i64::from(self.hours) * MS_PER_HOUR
            + i64::from(self.minutes) * MS_PER_MINUTE
            + i64::from(self.seconds) * MS_PER_SECOND
    }

    /// Panel labels paired with two-digit values, in display order.
    pub fn panels(&self) -> [(&'static str, String); 4] {
        [
            ("Days", format!("{:02}", self.days)),
            ("Hours", format!("{:02}", self.hours)),
            ("Min", format!("{:02}", self.minutes)),
            ("Sec", format!("{:02}", self.seconds)),
        ]
    }
}

impl Display for CountdownState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}d {:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Signed milliseconds left until `target_ms`.
pub fn remaining_ms(now_ms: i64, target_ms: i64) -> i64 {
    target_ms.saturating_sub(now_ms)
}

/// Computes the countdown breakdown for one tick.
pub fn tick(now_ms: i64, target_ms: i64) -> CountdownState {
    let remaining = remaining_ms(now_ms, target_ms);
    if remaining <= 0 {
        return CountdownState::default();
    }

    CountdownState {
        days: (remaining / MS_PER_DAY) as u64,
        hours: ((remaining / MS_PER_HOUR) % 24) as u32,
        minutes: ((remaining / MS_PER_MINUTE) % 60) as u32,
        seconds: ((remaining / MS_PER_SECOND) % 60) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::{tick, CountdownState};

    #[test]
    fn panels_pad_to_two_digits() {
        let state = CountdownState {
            days: 3,
            hours: 4,
            minutes: 0,
            seconds: 59,
        };
        let values = state.panels().map(|(_, value)| value);
        assert_eq!(values, ["03", "04", "00", "59"]);
    }

    #[test]
    fn sub_second_remainder_floors_to_zero() {
        let state = tick(0, 999);
        assert!(state.is_zero());
    }

    #[test]
    fn display_is_compact() {
        let state = tick(0, 90_061_000);
        assert_eq!(state.to_string(), "01d 01:01:01");
    }
}
