use anyhow::{bail, Context};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use sqlx::{Row, SqlitePool};

use crate::models::{Category, CategoryCount, NoteRecord, Submission, GRADE};

pub async fn init_db(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Read submissions oldest-first, optionally restricted to one category.
///
/// Legacy rows predate the `week` column migration and carry NULL there;
/// non-numeric stored values are coerced to absent rather than failing the
/// batch. A missing table is the one fatal case.
pub async fn fetch_submissions(
    pool: &SqlitePool,
    limit: i64,
    category: Option<Category>,
) -> anyhow::Result<Vec<Submission>> {
    let mut query = String::from(
        "SELECT id, keyword, category, grade, class_num, student_no, \
         student_name, note, ts, week FROM submissions",
    );
    if category.is_some() {
        query.push_str(" WHERE category = ?");
    }
    query.push_str(" ORDER BY id DESC LIMIT ?");

    let mut rows = sqlx::query(&query);
    if let Some(category) = category {
        rows = rows.bind(category.as_str());
    }
    rows = rows.bind(limit);

    let records = rows
        .fetch_all(pool)
        .await
        .context("failed to read submissions; run `exit-ticket-board init-db` first")?;

    let mut submissions = Vec::with_capacity(records.len());
    for row in records.iter().rev() {
        let ts: String = row.get("ts");
        submissions.push(Submission {
            id: row.get("id"),
            keyword: row.get("keyword"),
            category: row.get("category"),
            grade: row.get("grade"),
            class_num: row.get("class_num"),
            student_no: row.get("student_no"),
            student_name: row.get("student_name"),
            note: row.get("note"),
            date: parse_ts(&ts),
            week: row.try_get::<Option<i64>, _>("week").ok().flatten(),
            ts,
        });
    }

    Ok(submissions)
}

pub async fn insert_submission(
    pool: &SqlitePool,
    keyword: &str,
    category: Category,
    class_num: i64,
    student_no: i64,
    student_name: &str,
    note: &str,
) -> anyhow::Result<i64> {
    validate_submission(keyword, class_num, student_no)?;
    let ts = Local::now().to_rfc3339();

    let id = sqlx::query(
        r#"
        INSERT INTO submissions
        (keyword, category, grade, class_num, student_no, student_name, note, ts)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(keyword.trim())
    .bind(category.as_str())
    .bind(GRADE)
    .bind(class_num)
    .bind(student_no)
    .bind(student_name)
    .bind(note)
    .bind(&ts)
    .fetch_one(pool)
    .await
    .context("failed to insert submission; run `exit-ticket-board init-db` first")?
    .get("id");

    Ok(id)
}

/// Notes and submitter metadata for one keyword, most recent first.
pub async fn fetch_notes(
    pool: &SqlitePool,
    keyword: &str,
    category: Option<Category>,
    limit: i64,
) -> anyhow::Result<Vec<NoteRecord>> {
    let mut query = String::from(
        "SELECT student_name, class_num, student_no, note, ts \
         FROM submissions WHERE keyword = ?",
    );
    if category.is_some() {
        query.push_str(" AND category = ?");
    }
    query.push_str(" ORDER BY id DESC LIMIT ?");

    let mut rows = sqlx::query(&query).bind(keyword);
    if let Some(category) = category {
        rows = rows.bind(category.as_str());
    }
    rows = rows.bind(limit);

    let records = rows.fetch_all(pool).await?;
    let mut notes = Vec::with_capacity(records.len());
    for row in records {
        notes.push(NoteRecord {
            student_name: row.get("student_name"),
            class_num: row.get("class_num"),
            student_no: row.get("student_no"),
            note: row.get("note"),
            ts: row.get("ts"),
        });
    }

    Ok(notes)
}

pub async fn count_by_category(pool: &SqlitePool) -> anyhow::Result<Vec<CategoryCount>> {
    let rows = sqlx::query(
        "SELECT category, COUNT(*) AS count FROM submissions \
         GROUP BY category ORDER BY count DESC, MIN(id) ASC",
    )
    .fetch_all(pool)
    .await
    .context("failed to count submissions; run `exit-ticket-board init-db` first")?;

    Ok(rows
        .into_iter()
        .map(|row| CategoryCount {
            category: row.get("category"),
            count: row.get("count"),
        })
        .collect())
}

/// Full-table wipe for the board reset feature. Returns how many rows went.
pub async fn delete_all(pool: &SqlitePool) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM submissions").execute(pool).await?;
    Ok(result.rows_affected())
}

pub async fn seed(pool: &SqlitePool) -> anyhow::Result<()> {
    let submissions = vec![
        ("run", Category::Vocabulary, 3, 12, "Minji", "run vs jog?", "2026-03-02T09:10:00+09:00"),
        ("run", Category::Vocabulary, 3, 7, "Jiho", "", "2026-03-02T09:12:00+09:00"),
        ("present perfect", Category::Grammar, 5, 21, "Seoyeon", "have been vs was", "2026-03-04T10:05:00+09:00"),
        ("skimming", Category::Reading, 5, 3, "", "how fast should I read", "2026-03-09T09:30:00+09:00"),
        ("jog", Category::Vocabulary, 3, 18, "Haneul", "", "2026-03-09T09:31:00+09:00"),
        ("articles", Category::Grammar, 7, 9, "Doyun", "a vs the again", "2026-03-11T11:20:00+09:00"),
    ];

    for (keyword, category, class_num, student_no, student_name, note, ts) in submissions {
        sqlx::query(
            r#"
            INSERT INTO submissions
            (keyword, category, grade, class_num, student_no, student_name, note, ts)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(keyword)
        .bind(category.as_str())
        .bind(GRADE)
        .bind(class_num)
        .bind(student_no)
        .bind(student_name)
        .bind(note)
        .bind(ts)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn import_csv(pool: &SqlitePool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        keyword: String,
        category: String,
        class_num: i64,
        student_no: i64,
        #[serde(default)]
        student_name: String,
        #[serde(default)]
        note: String,
        ts: String,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("bad CSV record at data row {}", line + 1))?;
        validate_submission(&row.keyword, row.class_num, row.student_no)
            .with_context(|| format!("invalid submission at data row {}", line + 1))?;

        sqlx::query(
            r#"
            INSERT INTO submissions
            (keyword, category, grade, class_num, student_no, student_name, note, ts)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(row.keyword.trim())
        .bind(&row.category)
        .bind(GRADE)
        .bind(row.class_num)
        .bind(row.student_no)
        .bind(&row.student_name)
        .bind(&row.note)
        .bind(&row.ts)
        .execute(pool)
        .await?;
        inserted += 1;
    }

    Ok(inserted)
}

fn validate_submission(keyword: &str, class_num: i64, student_no: i64) -> anyhow::Result<()> {
    if keyword.trim().is_empty() {
        bail!("keyword must not be empty");
    }
    if !(1..=12).contains(&class_num) {
        bail!("class_num must be between 1 and 12, got {class_num}");
    }
    if !(1..=32).contains(&student_no) {
        bail!("student_no must be between 1 and 32, got {student_no}");
    }
    Ok(())
}

/// Timestamps are written as RFC 3339, but older rows may hold bare ISO
/// datetimes with no offset; both parse, anything else is absent.
fn parse_ts(ts: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.date_naive());
    }
    ts.parse::<NaiveDateTime>().ok().map(|dt| dt.date())
}
