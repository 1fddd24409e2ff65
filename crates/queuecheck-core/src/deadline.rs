use crate::policy::PolicyEntry;
use chrono::{Duration, NaiveDateTime};

/// Deadline arithmetic for one ticket against its policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub deadline: NaiveDateTime,
    pub age: Duration,
    pub overdue: bool,
}

/// `deadline = last_active + slow`, `age = now - last_active`.
///
/// Only `slow` participates; `fast` has no effect on the result. Returns
/// `None` when the deadline falls outside the representable date range.
pub fn timing(
    policy: &PolicyEntry,
    last_active: NaiveDateTime,
    now: NaiveDateTime,
) -> Option<Timing> {
    let deadline = last_active.checked_add_signed(policy.slow()?)?;
    Some(Timing {
        deadline,
        age: now - last_active,
        overdue: now > deadline,
    })
}

/// Whole days in `age`, rounded toward negative infinity.
pub fn whole_days(age: Duration) -> i64 {
    age.num_seconds().div_euclid(86_400)
}

/// `age` rendered as `"{days} days {h}:{mm}:{ss}"`, days floored and the
/// remainder always positive.
pub fn format_age(age: Duration) -> String {
    let total = age.num_seconds();
    let days = total.div_euclid(86_400);
    let rem = total.rem_euclid(86_400);
    format!(
        "{} days {}:{:02}:{:02}",
        days,
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActivityAttribute;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn policy(slow: f64) -> PolicyEntry {
        PolicyEntry::new(ActivityAttribute::Updated, 4.0, slow)
    }

    #[test]
    fn on_time_boundary() {
        let before = timing(&policy(24.0), now() - Duration::minutes(23 * 60 + 59), now()).unwrap();
        assert!(!before.overdue);
        let after = timing(&policy(24.0), now() - Duration::minutes(24 * 60 + 1), now()).unwrap();
        assert!(after.overdue);
    }

    #[test]
    fn exactly_at_deadline_is_not_overdue() {
        let t = timing(&policy(24.0), now() - Duration::hours(24), now()).unwrap();
        assert_eq!(t.deadline, now());
        assert!(!t.overdue);
    }

    #[test]
    fn fast_does_not_move_deadline() {
        let last = now() - Duration::hours(10);
        let a = timing(&PolicyEntry::new(ActivityAttribute::Updated, 1.0, 48.0), last, now()).unwrap();
        let b = timing(&PolicyEntry::new(ActivityAttribute::Updated, 40.0, 48.0), last, now()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.age, Duration::hours(10));
        assert_eq!(a.deadline, last + Duration::hours(48));
    }

    #[test]
    fn days_floor() {
        assert_eq!(whole_days(Duration::hours(47)), 1);
        assert_eq!(whole_days(Duration::hours(48)), 2);
        assert_eq!(whole_days(Duration::hours(-1)), -1);
    }

    #[test]
    fn deadline_past_the_calendar_is_none() {
        let far = NaiveDate::from_ymd_opt(262_142, 12, 31)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert!(timing(&policy(48.0), far, now()).is_none());
        assert!(timing(&policy(48.0), now(), now()).is_some());
    }

    #[test]
    fn age_formatting() {
        let age = Duration::days(3) + Duration::hours(4) + Duration::minutes(5) + Duration::seconds(6);
        assert_eq!(format_age(age), "3 days 4:05:06");
        assert_eq!(format_age(Duration::seconds(-1)), "-1 days 23:59:59");
    }
}
