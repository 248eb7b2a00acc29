use std::fmt::Write;

use crate::aggregate;
use crate::models::{BoardFilter, Category, Submission};

pub fn build_report(filter: &BoardFilter, all: &[Submission], filtered: &[Submission]) -> String {
    let counts = aggregate::category_counts(all);
    let ranking = aggregate::keyword_ranking(filtered);
    let rows = aggregate::pivot(filtered, filter.week_range);

    let mut output = String::new();

    let _ = writeln!(output, "# Exit Ticket Board Report");
    let _ = writeln!(output, "Scope: {}", describe_filter(filter));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Category Mix");

    if counts.is_empty() {
        let _ = writeln!(output, "No submissions yet.");
    } else {
        for count in &counts {
            let _ = writeln!(output, "- {}: {} submissions", count.category, count.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Keyword Ranking");

    if ranking.is_empty() {
        let _ = writeln!(output, "No submissions match the current filter.");
    } else {
        for keyword in ranking.iter().take(10) {
            let _ = writeln!(output, "- {} ({})", keyword.keyword, keyword.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Weekly Top Keywords");

    if filtered.is_empty() {
        let _ = writeln!(output, "No submissions match the current filter.");
    } else {
        let _ = write!(output, "| Week |");
        for category in Category::ALL {
            let _ = write!(output, " {category} |");
        }
        let _ = writeln!(output);
        let _ = write!(output, "|---|");
        for _ in Category::ALL {
            let _ = write!(output, "---|");
        }
        let _ = writeln!(output);

        for row in &rows {
            let _ = write!(output, "| {} |", row.week);
            for cell in &row.cells {
                match cell {
                    Some(top) => {
                        let _ = write!(output, " {} ({}) |", top.keyword, top.count);
                    }
                    None => {
                        let _ = write!(output, " |");
                    }
                }
            }
            let _ = writeln!(output);
        }
    }

    let mut recent = filtered.to_vec();
    recent.sort_by(|a, b| b.id.cmp(&a.id));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Notes");

    let with_notes: Vec<&Submission> = recent.iter().filter(|s| !s.note.is_empty()).collect();
    if with_notes.is_empty() {
        let _ = writeln!(output, "No notes in the current filter.");
    } else {
        for submission in with_notes.iter().take(5) {
            let name = if submission.student_name.is_empty() {
                "anonymous"
            } else {
                submission.student_name.as_str()
            };
            let _ = writeln!(
                output,
                "- {} (class {}, no. {}) on \"{}\": {}",
                name,
                submission.class_num,
                submission.student_no,
                submission.keyword,
                submission.note
            );
        }
    }

    output
}

fn describe_filter(filter: &BoardFilter) -> String {
    let category = filter
        .category
        .map_or_else(|| "all categories".to_string(), |c| c.to_string());
    let classes = if filter.classes.is_empty() {
        "all classes".to_string()
    } else {
        let listed: Vec<String> = filter.classes.iter().map(|c| format!("{c}")).collect();
        format!("classes {}", listed.join(", "))
    };
    format!(
        "{category}, {classes}, weeks {}-{}",
        filter.week_range.0, filter.week_range.1
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GRADE;

    fn submission(id: i64, keyword: &str, note: &str, week: i64) -> Submission {
        Submission {
            id,
            keyword: keyword.to_string(),
            category: "Vocabulary".to_string(),
            grade: GRADE.to_string(),
            class_num: 3,
            student_no: id,
            student_name: String::new(),
            note: note.to_string(),
            ts: String::new(),
            date: None,
            week: Some(week),
        }
    }

    #[test]
    fn report_names_the_top_keyword_per_cell() {
        let records = vec![
            submission(1, "run", "run vs jog?", 1),
            submission(2, "run", "", 1),
            submission(3, "jog", "", 1),
        ];
        let filter = BoardFilter {
            week_range: (1, 1),
            ..BoardFilter::default()
        };
        let report = build_report(&filter, &records, &records);
        assert!(report.contains("| 1 | run (2) |"));
        assert!(report.contains("- run (2)"));
        assert!(report.contains("anonymous (class 3, no. 1) on \"run\": run vs jog?"));
    }

    #[test]
    fn empty_input_renders_placeholders_not_panics() {
        let filter = BoardFilter::default();
        let report = build_report(&filter, &[], &[]);
        assert!(report.contains("No submissions yet."));
        assert!(report.contains("No submissions match the current filter."));
        assert!(report.contains("No notes in the current filter."));
    }
}
