use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::Serialize;

use super::domain::RequirementsLength;

/// Derived deadlines for a published brief. Absent entirely while the brief
/// is a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BriefDates {
    pub published_at: DateTime<Utc>,
    /// Application deadline.
    pub closing_at: DateTime<Utc>,
    /// Last moment sellers may lodge clarification questions.
    pub questions_closing_at: DateTime<Utc>,
    /// Buyers must publish clarification answers by this time.
    pub answers_published_by: DateTime<Utc>,
}

/// Compute the date window for a publication timestamp.
///
/// The publish timestamp is normalized to end-of-day before the window length
/// is added, so a brief published at 09:00 and one published at 17:00 on the
/// same day close at the same instant.
pub fn window(
    published_at: Option<DateTime<Utc>>,
    length: RequirementsLength,
) -> Option<BriefDates> {
    let published_at = published_at?;

    let publish_day = published_at.date_naive();
    let closing_at = end_of_day(publish_day + Duration::days(length.open_days()));

    let mut questions_closing_at =
        end_of_day(add_workdays(publish_day, length.questions_open_workdays()));
    if questions_closing_at > closing_at {
        questions_closing_at = closing_at;
    }

    let answers_published_by = end_of_day(add_workdays(closing_at.date_naive(), -1));

    Some(BriefDates {
        published_at,
        closing_at,
        questions_closing_at,
        answers_published_by,
    })
}

fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(23, 59, 59)
        .expect("23:59:59 is a valid wall-clock time")
        .and_utc()
}

/// Step `count` workdays from `day`, skipping weekends. Negative counts step
/// backwards. A zero count returns the next workday on or after `day`.
fn add_workdays(day: NaiveDate, count: i64) -> NaiveDate {
    let step = if count < 0 { -1 } else { 1 };
    let mut remaining = count.abs();
    let mut current = day;

    while remaining > 0 {
        current += Duration::days(step);
        if is_workday(current) {
            remaining -= 1;
        }
    }

    while !is_workday(current) {
        current += Duration::days(step);
    }

    current
}

fn is_workday(day: NaiveDate) -> bool {
    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn published(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single().expect("valid timestamp")
    }

    #[test]
    fn draft_briefs_have_no_dates() {
        assert!(window(None, RequirementsLength::TwoWeeks).is_none());
    }

    #[test]
    fn default_window_closes_fourteen_days_after_publish_day() {
        let dates = window(Some(published(2026, 3, 2, 9)), RequirementsLength::TwoWeeks)
            .expect("published brief has dates");
        assert_eq!(
            dates.closing_at,
            Utc.with_ymd_and_hms(2026, 3, 16, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn one_week_window_closes_seven_days_after_publish_day() {
        let dates = window(Some(published(2026, 3, 2, 9)), RequirementsLength::OneWeek)
            .expect("published brief has dates");
        assert_eq!(
            dates.closing_at,
            Utc.with_ymd_and_hms(2026, 3, 9, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn publish_time_of_day_does_not_move_the_deadline() {
        let morning = window(Some(published(2026, 3, 2, 1)), RequirementsLength::TwoWeeks)
            .expect("dates");
        let evening = window(Some(published(2026, 3, 2, 22)), RequirementsLength::TwoWeeks)
            .expect("dates");
        assert_eq!(morning.closing_at, evening.closing_at);
        assert_eq!(morning.questions_closing_at, evening.questions_closing_at);
    }

    #[test]
    fn questions_close_after_workdays_skipping_weekends() {
        // Thursday 2026-03-05 + 2 workdays lands on Monday 2026-03-09.
        let dates = window(Some(published(2026, 3, 5, 9)), RequirementsLength::OneWeek)
            .expect("dates");
        assert_eq!(
            dates.questions_closing_at,
            Utc.with_ymd_and_hms(2026, 3, 9, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn answers_are_due_one_workday_before_close() {
        // Closing Monday 2026-03-16; the prior workday is Friday 2026-03-13.
        let dates = window(Some(published(2026, 3, 2, 9)), RequirementsLength::TwoWeeks)
            .expect("dates");
        assert_eq!(
            dates.answers_published_by,
            Utc.with_ymd_and_hms(2026, 3, 13, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn questions_never_close_after_applications() {
        let dates = window(Some(published(2026, 3, 2, 9)), RequirementsLength::OneWeek)
            .expect("dates");
        assert!(dates.questions_closing_at <= dates.closing_at);
    }
}
