use std::collections::BTreeSet;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

mod aggregate;
mod db;
mod filter;
mod models;
mod report;
mod week;

use models::{BoardFilter, BoardView, Category, WEEK_MAX, WEEK_MIN};

#[derive(Parser)]
#[command(name = "exit-ticket-board")]
#[command(about = "Classroom exit-ticket keyword board", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    /// Class to include (repeatable); omit for all classes
    #[arg(long = "class")]
    classes: Vec<i64>,
    #[arg(long, value_enum)]
    category: Option<Category>,
    /// Inclusive academic week range
    #[arg(long, num_args = 2, value_names = ["LO", "HI"], default_values_t = [WEEK_MIN, WEEK_MAX])]
    weeks: Vec<i64>,
}

impl FilterArgs {
    fn into_filter(self) -> anyhow::Result<BoardFilter> {
        let (lo, hi) = (self.weeks[0], self.weeks[1]);
        if lo > hi || lo < WEEK_MIN || hi > WEEK_MAX {
            bail!("week range must satisfy {WEEK_MIN} <= LO <= HI <= {WEEK_MAX}");
        }
        for class in &self.classes {
            if !(1..=12).contains(class) {
                bail!("class must be between 1 and 12, got {class}");
            }
        }
        Ok(BoardFilter {
            classes: BTreeSet::from_iter(self.classes),
            category: self.category,
            week_range: (lo, hi),
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Record one submission
    Submit {
        keyword: String,
        #[arg(long, value_enum)]
        category: Category,
        #[arg(long)]
        class: i64,
        #[arg(long)]
        student_no: i64,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Overview: category counts plus keyword frequency ranking
    Board {
        #[arg(long, value_enum)]
        category: Option<Category>,
        #[arg(long, default_value_t = 500)]
        limit: i64,
        #[arg(long)]
        json: bool,
    },
    /// Week x category grid of the most frequent keywords
    Pivot {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value_t = 2000)]
        limit: i64,
    },
    /// Notes submitted for one keyword, most recent first
    Notes {
        keyword: String,
        #[arg(long, value_enum)]
        category: Option<Category>,
        #[arg(long, default_value_t = 200)]
        limit: i64,
    },
    /// Import submissions from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Write a markdown report
    Report {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Delete every submission (full board reset)
    Reset {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:exit_tickets.db".to_string());

    let options = SqliteConnectOptions::from_str(&database_url)
        .context("DATABASE_URL is not a valid sqlite URL")?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("failed to open the submissions database")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Submit {
            keyword,
            category,
            class,
            student_no,
            name,
            note,
        } => {
            let id =
                db::insert_submission(&pool, &keyword, category, class, student_no, &name, &note)
                    .await?;
            println!("Submission #{id} recorded.");
        }
        Commands::Board {
            category,
            limit,
            json,
        } => {
            let category_counts = db::count_by_category(&pool).await?;
            let submissions = db::fetch_submissions(&pool, limit, category).await?;
            let ranking = aggregate::keyword_ranking(&submissions);

            if json {
                let view = BoardView {
                    category_counts,
                    ranking,
                };
                println!("{}", serde_json::to_string_pretty(&view)?);
                return Ok(());
            }

            println!("Submissions by category:");
            if category_counts.is_empty() {
                println!("  (none yet)");
            }
            for count in &category_counts {
                println!("  {} - {}", count.category, count.count);
            }

            println!();
            match category {
                Some(category) => println!("Keyword ranking ({category}):"),
                None => println!("Keyword ranking (all categories):"),
            }
            if ranking.is_empty() {
                println!("  (no submissions)");
            }
            for keyword in &ranking {
                println!("  {} - {}", keyword.keyword, keyword.count);
            }
        }
        Commands::Pivot { filter, limit } => {
            let mut submissions = db::fetch_submissions(&pool, limit, None).await?;
            week::assign_weeks(&mut submissions);
            let board_filter = filter.into_filter()?;
            let filtered = crate::filter::apply(&submissions, &board_filter);

            if filtered.is_empty() {
                println!("No submissions match this filter.");
                return Ok(());
            }

            let rows = aggregate::pivot(&filtered, board_filter.week_range);
            print!("{:<6}", "week");
            for category in Category::ALL {
                print!("{:<24}", category.as_str());
            }
            println!();
            for row in &rows {
                print!("{:<6}", row.week);
                for cell in &row.cells {
                    match cell {
                        Some(top) => print!("{:<24}", format!("{} ({})", top.keyword, top.count)),
                        None => print!("{:<24}", ""),
                    }
                }
                println!();
            }
        }
        Commands::Notes {
            keyword,
            category,
            limit,
        } => {
            let notes = db::fetch_notes(&pool, &keyword, category, limit).await?;
            if notes.is_empty() {
                println!("No notes for \"{keyword}\".");
                return Ok(());
            }
            println!("Notes for \"{keyword}\":");
            for record in &notes {
                let name = if record.student_name.is_empty() {
                    "anonymous"
                } else {
                    record.student_name.as_str()
                };
                let note = if record.note.is_empty() {
                    "(no note)"
                } else {
                    record.note.as_str()
                };
                println!(
                    "- {} (class {}, no. {}) at {}: {}",
                    name, record.class_num, record.student_no, record.ts, note
                );
            }
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} submissions from {}.", csv.display());
        }
        Commands::Report { filter, out } => {
            let mut submissions = db::fetch_submissions(&pool, 2000, None).await?;
            week::assign_weeks(&mut submissions);
            let board_filter = filter.into_filter()?;
            let filtered = crate::filter::apply(&submissions, &board_filter);
            let report = report::build_report(&board_filter, &submissions, &filtered);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Reset { yes } => {
            if !yes {
                bail!("refusing to wipe the board without --yes");
            }
            let removed = db::delete_all(&pool).await?;
            println!("Removed {removed} submissions.");
        }
    }

    Ok(())
}
