use crate::models::{BoardFilter, Submission};

/// Apply the explicit view preferences to a record sequence.
///
/// An empty class set imposes no class restriction, matching the board's
/// default of showing every class. Records with no week value never pass the
/// week-range predicate.
pub fn apply(records: &[Submission], filter: &BoardFilter) -> Vec<Submission> {
    let (lo, hi) = filter.week_range;
    records
        .iter()
        .filter(|record| {
            (filter.classes.is_empty() || filter.classes.contains(&record.class_num))
                && filter
                    .category
                    .map_or(true, |category| record.matches_category(category))
                && record.week.map_or(false, |week| lo <= week && week <= hi)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, GRADE};
    use std::collections::BTreeSet;

    fn submission(id: i64, category: &str, class_num: i64, week: Option<i64>) -> Submission {
        Submission {
            id,
            keyword: format!("kw{id}"),
            category: category.to_string(),
            grade: GRADE.to_string(),
            class_num,
            student_no: 1,
            student_name: String::new(),
            note: String::new(),
            ts: String::new(),
            date: None,
            week,
        }
    }

    /// Deterministic pseudo-random fixture, no external RNG needed.
    fn synthetic_records(n: i64) -> Vec<Submission> {
        let categories = ["Vocabulary", "Grammar", "Reading", "Else"];
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move |modulus: u64| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 33) % modulus
        };
        (1..=n)
            .map(|id| {
                let category = categories[next(4) as usize];
                let class_num = 1 + next(12) as i64;
                let week = if next(10) == 0 {
                    None
                } else {
                    Some(1 + next(17) as i64)
                };
                submission(id, category, class_num, week)
            })
            .collect()
    }

    #[test]
    fn empty_class_set_means_no_restriction() {
        let records = vec![
            submission(1, "Grammar", 3, Some(2)),
            submission(2, "Grammar", 9, Some(2)),
        ];
        let filter = BoardFilter::default();
        assert_eq!(apply(&records, &filter).len(), 2);
    }

    #[test]
    fn undefined_week_is_always_excluded() {
        let records = vec![
            submission(1, "Grammar", 3, Some(2)),
            submission(2, "Grammar", 3, None),
        ];
        let filter = BoardFilter::default();
        let kept = apply(&records, &filter);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 1);
    }

    #[test]
    fn combined_predicates_match_brute_force() {
        let records = synthetic_records(100);
        let filter = BoardFilter {
            classes: BTreeSet::from([3, 5]),
            category: Some(Category::Grammar),
            week_range: (2, 2),
        };

        let kept = apply(&records, &filter);
        let expected: Vec<i64> = records
            .iter()
            .filter(|r| r.category == "Grammar")
            .filter(|r| r.class_num == 3 || r.class_num == 5)
            .filter(|r| r.week == Some(2))
            .map(|r| r.id)
            .collect();

        assert_eq!(kept.iter().map(|r| r.id).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn narrowing_the_filter_never_grows_the_result() {
        let records = synthetic_records(100);
        let wide = BoardFilter::default();
        let narrower_weeks = BoardFilter {
            week_range: (3, 9),
            ..BoardFilter::default()
        };
        let narrower_classes = BoardFilter {
            classes: BTreeSet::from([1, 2, 3]),
            week_range: (3, 9),
            ..BoardFilter::default()
        };

        let wide_len = apply(&records, &wide).len();
        let weeks_len = apply(&records, &narrower_weeks).len();
        let classes_len = apply(&records, &narrower_classes).len();
        assert!(weeks_len <= wide_len);
        assert!(classes_len <= weeks_len);
    }
}
