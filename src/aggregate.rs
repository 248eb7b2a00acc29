use std::collections::HashMap;

use crate::models::{Category, CategoryCount, KeywordCount, Submission, WeekRow};

/// Count submissions per stored category over the full (unfiltered) set.
/// Feeds the overview chart, so it ignores the active filter by design.
pub fn category_counts(records: &[Submission]) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, (i64, usize)> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        let entry = counts.entry(record.category.as_str()).or_insert((0, index));
        entry.0 += 1;
    }

    let mut summaries: Vec<(&str, (i64, usize))> = counts.into_iter().collect();
    summaries.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    summaries
        .into_iter()
        .map(|(category, (count, _))| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect()
}

/// Keyword frequency ranking: count descending, exact ties broken by which
/// keyword was seen first in insertion order.
pub fn keyword_ranking(records: &[Submission]) -> Vec<KeywordCount> {
    rank(records.iter().map(|record| record.keyword.as_str()))
}

/// Most frequent keyword per (week, category) cell across the requested
/// week range. Cells with no matching records stay `None`.
pub fn pivot(records: &[Submission], week_range: (i64, i64)) -> Vec<WeekRow> {
    let (lo, hi) = week_range;
    (lo..=hi)
        .map(|week| WeekRow {
            week,
            cells: Category::ALL
                .iter()
                .map(|&category| {
                    let cell = rank(
                        records
                            .iter()
                            .filter(|r| r.week == Some(week) && r.matches_category(category))
                            .map(|r| r.keyword.as_str()),
                    );
                    cell.into_iter().next()
                })
                .collect(),
        })
        .collect()
}

fn rank<'a>(keywords: impl Iterator<Item = &'a str>) -> Vec<KeywordCount> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (index, keyword) in keywords.enumerate() {
        let entry = counts.entry(keyword).or_insert((0, index));
        entry.0 += 1;
    }

    let mut ranked: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked
        .into_iter()
        .map(|(keyword, (count, _))| KeywordCount {
            keyword: keyword.to_string(),
            count,
        })
        .collect()
}
