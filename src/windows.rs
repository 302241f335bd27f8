//! Date Window Resolver
//!
//! Resolves named reporting windows against an injected reference instant.
//! The resolver never reads the system clock itself; callers pass "now" (or a
//! fixed instant under test), keeping resolution pure and deterministic.
//!
//! Business weeks run Sunday 00:00:00 through Saturday 23:59:59 in local
//! business time.

use crate::models::{DateWindow, WindowKind};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

fn day_start(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn day_end(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 59, 59).unwrap_or_else(|| day_start(date))
}

/// Resolve a window kind against a reference instant.
///
/// `all_time_start` anchors the `AllTime` window; it is a deployment constant,
/// not derived from data. The returned window always satisfies `start <= end`
/// and carries a populated label and both formatted range strings.
pub fn resolve(kind: WindowKind, reference: NaiveDateTime, all_time_start: NaiveDate) -> DateWindow {
    let today = reference.date();
    let current_week_start = week_start(today);
    // Saturday closing the most recent complete week.
    let last_complete_saturday = current_week_start - Duration::days(1);

    let (label, start, end) = match kind {
        WindowKind::CurrentWeek => {
            // Partial by design: never extends past the reference day.
            let week_saturday_end = day_end(current_week_start + Duration::days(6));
            (
                "Current Week",
                day_start(current_week_start),
                day_end(today).min(week_saturday_end),
            )
        }
        WindowKind::LastWeek => {
            let start = current_week_start - Duration::days(7);
            ("Last Week", day_start(start), day_end(start + Duration::days(6)))
        }
        WindowKind::TwoWeeksAgo => {
            let start = current_week_start - Duration::days(14);
            ("Two Weeks Ago", day_start(start), day_end(start + Duration::days(6)))
        }
        WindowKind::Trailing4Weeks => (
            "Trailing 4 Weeks",
            day_start(last_complete_saturday - Duration::days(27)),
            day_end(last_complete_saturday),
        ),
        WindowKind::Previous4Weeks => {
            let end = last_complete_saturday - Duration::days(28);
            (
                "Previous 4 Weeks",
                day_start(end - Duration::days(27)),
                day_end(end),
            )
        }
        WindowKind::AllTime => ("All Time", day_start(all_time_start), reference),
    };

    // start <= end must hold for every resolved window, even degenerate
    // AllTime references before the business start date.
    let end = end.max(start);

    DateWindow {
        kind,
        start,
        end,
        label: label.to_string(),
        range: format!(
            "{} - {}",
            start.format("%d/%m/%Y"),
            end.format("%d/%m/%Y")
        ),
        short_range: format!("{} - {}", start.format("%d/%m"), end.format("%d/%m")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [WindowKind; 6] = [
        WindowKind::CurrentWeek,
        WindowKind::LastWeek,
        WindowKind::TwoWeeksAgo,
        WindowKind::Trailing4Weeks,
        WindowKind::Previous4Weeks,
        WindowKind::AllTime,
    ];

    fn business_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    // Wednesday 18/06/2025 15:30:00; week starts Sunday 15/06.
    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 18)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_current_week_is_partial() {
        let w = resolve(WindowKind::CurrentWeek, reference(), business_start());
        assert_eq!(w.start.to_string(), "2025-06-15 00:00:00");
        assert_eq!(w.end.to_string(), "2025-06-18 23:59:59");
        assert_eq!(w.active_days(), 4);
    }

    #[test]
    fn test_last_week_and_two_weeks_ago_are_complete_weeks() {
        let last = resolve(WindowKind::LastWeek, reference(), business_start());
        assert_eq!(last.start.to_string(), "2025-06-08 00:00:00");
        assert_eq!(last.end.to_string(), "2025-06-14 23:59:59");
        assert_eq!(last.active_days(), 7);

        let two = resolve(WindowKind::TwoWeeksAgo, reference(), business_start());
        assert_eq!(two.start.to_string(), "2025-06-01 00:00:00");
        assert_eq!(two.end.to_string(), "2025-06-07 23:59:59");
    }

    #[test]
    fn test_trailing_and_previous_4_weeks() {
        let trailing = resolve(WindowKind::Trailing4Weeks, reference(), business_start());
        assert_eq!(trailing.end.to_string(), "2025-06-14 23:59:59");
        assert_eq!(trailing.start.to_string(), "2025-05-18 00:00:00");
        assert_eq!(trailing.active_days(), 28);

        let previous = resolve(WindowKind::Previous4Weeks, reference(), business_start());
        assert_eq!(previous.end.to_string(), "2025-05-17 23:59:59");
        assert_eq!(previous.start.to_string(), "2025-04-20 00:00:00");
        assert_eq!(previous.active_days(), 28);

        // Blocks are adjacent with no gap or overlap
        assert_eq!(previous.end + Duration::seconds(1), trailing.start);
    }

    #[test]
    fn test_all_time_runs_to_reference() {
        let w = resolve(WindowKind::AllTime, reference(), business_start());
        assert_eq!(w.start.to_string(), "2024-01-01 00:00:00");
        assert_eq!(w.end, reference());
    }

    #[test]
    fn test_start_never_exceeds_end_for_any_kind() {
        let references = [
            reference(),
            // Sunday morning, current week just started
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap().and_hms_opt(0, 0, 1).unwrap(),
            // Saturday night, week about to roll over
            NaiveDate::from_ymd_opt(2025, 6, 21).unwrap().and_hms_opt(23, 59, 58).unwrap(),
            // Reference before the business start date
            NaiveDate::from_ymd_opt(2023, 3, 1).unwrap().and_hms_opt(12, 0, 0).unwrap(),
        ];

        for reference in references {
            for kind in ALL_KINDS {
                let w = resolve(kind, reference, business_start());
                assert!(w.start <= w.end, "{:?} at {}", kind, reference);
                assert!(!w.label.is_empty());
                assert!(!w.range.is_empty());
                assert!(!w.short_range.is_empty());
            }
        }
    }

    #[test]
    fn test_current_week_on_sunday_spans_one_day() {
        let sunday = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap().and_hms_opt(9, 0, 0).unwrap();
        let w = resolve(WindowKind::CurrentWeek, sunday, business_start());
        assert_eq!(w.active_days(), 1);
    }

    #[test]
    fn test_unknown_kind_string_falls_back_to_current_week() {
        assert_eq!(WindowKind::parse("no-such-window"), WindowKind::CurrentWeek);
        assert_eq!(WindowKind::parse("last-week"), WindowKind::LastWeek);
        assert_eq!(WindowKind::parse("Trailing 4 Weeks"), WindowKind::Trailing4Weeks);
        assert_eq!(WindowKind::parse("all"), WindowKind::AllTime);
    }
}
