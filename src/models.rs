use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Academic weeks are bucketed into this fixed band.
pub const WEEK_MIN: i64 = 1;
pub const WEEK_MAX: i64 = 17;

/// Grade is constant at the write boundary for now.
pub const GRADE: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum Category {
    Vocabulary,
    Grammar,
    Reading,
    Else,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Vocabulary,
        Category::Grammar,
        Category::Reading,
        Category::Else,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Vocabulary => "Vocabulary",
            Category::Grammar => "Grammar",
            Category::Reading => "Reading",
            Category::Else => "Else",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One student-reported confusion point, as stored.
///
/// `category` stays a raw string: rows written before the category list was
/// fixed may carry values outside the enumeration, and those rows must still
/// load (they just never match a filter or pivot bucket).
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: i64,
    pub keyword: String,
    pub category: String,
    pub grade: String,
    pub class_num: i64,
    pub student_no: i64,
    pub student_name: String,
    pub note: String,
    /// Raw stored timestamp text.
    pub ts: String,
    /// Calendar date parsed from `ts`; `None` when `ts` is unparseable.
    pub date: Option<NaiveDate>,
    /// Academic week, stored or derived; `None` when neither is available.
    pub week: Option<i64>,
}

impl Submission {
    pub fn matches_category(&self, category: Category) -> bool {
        self.category == category.as_str()
    }
}

/// View preferences for the teacher pages, passed explicitly by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardFilter {
    /// Classes to keep. Empty means no class restriction.
    pub classes: BTreeSet<i64>,
    /// `None` means all categories.
    pub category: Option<Category>,
    /// Inclusive week range, both ends within [WEEK_MIN, WEEK_MAX].
    pub week_range: (i64, i64),
}

impl Default for BoardFilter {
    fn default() -> Self {
        BoardFilter {
            classes: BTreeSet::new(),
            category: None,
            week_range: (WEEK_MIN, WEEK_MAX),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// One row of the week x category pivot; `cells` is aligned with
/// `Category::ALL`, `None` marking a cell with no submissions.
#[derive(Debug, Clone, Serialize)]
pub struct WeekRow {
    pub week: i64,
    pub cells: Vec<Option<KeywordCount>>,
}

/// Note lookup result for a selected keyword.
#[derive(Debug, Clone)]
pub struct NoteRecord {
    pub student_name: String,
    pub class_num: i64,
    pub student_no: i64,
    pub note: String,
    pub ts: String,
}

/// Overview payload for the `board` command's JSON output.
#[derive(Debug, Serialize)]
pub struct BoardView {
    pub category_counts: Vec<CategoryCount>,
    pub ranking: Vec<KeywordCount>,
}
