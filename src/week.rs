use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{Submission, WEEK_MAX, WEEK_MIN};

/// Monday of the calendar week containing the earliest parsed timestamp in
/// the set. `None` when no record has a parseable timestamp.
pub fn term_start(records: &[Submission]) -> Option<NaiveDate> {
    let min = records.iter().filter_map(|r| r.date).min()?;
    Some(min - Duration::days(i64::from(min.weekday().num_days_from_monday())))
}

pub fn week_for(date: NaiveDate, term_start: NaiveDate) -> i64 {
    let elapsed_days = (date - term_start).num_days();
    (elapsed_days.div_euclid(7) + 1).clamp(WEEK_MIN, WEEK_MAX)
}

/// Fill in missing week numbers from the data-dependent term start.
///
/// Stored week values are kept but re-clamped into [WEEK_MIN, WEEK_MAX], so
/// stored and derived values obey the same band. Records whose timestamp
/// fails to parse keep `week = None`; a set with no parseable timestamps is
/// left untouched. Running this on already-derived output changes nothing.
pub fn assign_weeks(records: &mut [Submission]) {
    for record in records.iter_mut() {
        if let Some(week) = record.week {
            record.week = Some(week.clamp(WEEK_MIN, WEEK_MAX));
        }
    }

    let Some(start) = term_start(records) else {
        return;
    };

    for record in records.iter_mut() {
        if record.week.is_none() {
            if let Some(date) = record.date {
                record.week = Some(week_for(date, start));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GRADE;

    fn dated_submission(id: i64, ts: &str) -> Submission {
        Submission {
            id,
            keyword: "run".to_string(),
            category: "Vocabulary".to_string(),
            grade: GRADE.to_string(),
            class_num: 1,
            student_no: 1,
            student_name: String::new(),
            note: String::new(),
            ts: ts.to_string(),
            date: ts.parse::<NaiveDate>().ok(),
            week: None,
        }
    }

    #[test]
    fn term_start_snaps_back_to_monday() {
        // 2026-03-04 is a Wednesday; the containing week starts 2026-03-02.
        let records = vec![dated_submission(1, "2026-03-04")];
        assert_eq!(
            term_start(&records),
            Some(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
        );
    }

    #[test]
    fn seven_days_after_term_start_is_week_two() {
        let mut records = vec![
            dated_submission(1, "2026-03-04"),
            dated_submission(2, "2026-03-09"),
        ];
        assign_weeks(&mut records);
        assert_eq!(records[0].week, Some(1));
        assert_eq!(records[1].week, Some(2));
    }

    #[test]
    fn derived_weeks_stay_in_band() {
        let mut records = vec![
            dated_submission(1, "2026-03-02"),
            dated_submission(2, "2027-03-02"),
        ];
        assign_weeks(&mut records);
        assert_eq!(records[0].week, Some(WEEK_MIN));
        assert_eq!(records[1].week, Some(WEEK_MAX));
    }

    #[test]
    fn stored_weeks_are_reclamped_not_rederived() {
        let mut records = vec![dated_submission(1, "2026-03-02")];
        records[0].week = Some(25);
        assign_weeks(&mut records);
        assert_eq!(records[0].week, Some(WEEK_MAX));

        let mut records = vec![
            dated_submission(1, "2026-03-02"),
            dated_submission(2, "2026-03-09"),
        ];
        records[1].week = Some(5);
        assign_weeks(&mut records);
        assert_eq!(records[1].week, Some(5));
    }

    #[test]
    fn unparseable_timestamp_leaves_week_absent() {
        let mut records = vec![
            dated_submission(1, "2026-03-02"),
            dated_submission(2, "not-a-date"),
        ];
        assign_weeks(&mut records);
        assert_eq!(records[0].week, Some(1));
        assert_eq!(records[1].week, None);
    }

    #[test]
    fn no_parseable_timestamps_means_no_weeks() {
        let mut records = vec![
            dated_submission(1, "garbage"),
            dated_submission(2, "also garbage"),
        ];
        assign_weeks(&mut records);
        assert!(records.iter().all(|r| r.week.is_none()));
    }

    #[test]
    fn assign_weeks_is_idempotent() {
        let mut records = vec![
            dated_submission(1, "2026-03-04"),
            dated_submission(2, "2026-03-20"),
            dated_submission(3, "bad"),
        ];
        assign_weeks(&mut records);
        let first_pass: Vec<Option<i64>> = records.iter().map(|r| r.week).collect();
        assign_weeks(&mut records);
        let second_pass: Vec<Option<i64>> = records.iter().map(|r| r.week).collect();
        assert_eq!(first_pass, second_pass);
    }
}
