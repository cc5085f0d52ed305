//! Command-line host for the sheet sync engine.
//!
//! # Responsibility
//! - Wire the engine to the local persistence service and a snapshot database.
//! - Print sheet summaries, search results and duplicate reports.

use clap::{Parser, Subcommand};
use log::info;
use sheetsync_core::db::{open_db, open_db_in_memory};
use sheetsync_core::search::highlight::highlight;
use sheetsync_core::{
    default_log_level, init_logging, CoreConfig, LocalSheetService, QuestionId, SheetService,
    SqliteSnapshotRepository,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

type Service = SheetService<LocalSheetService<SqliteSnapshotRepository>>;

#[derive(Debug, Parser)]
#[command(name = "sheetsync", version, about = "Inspect and edit a checklist sheet")]
struct Cli {
    /// Snapshot database file; an in-memory database is used when omitted.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Absolute directory for rotating log files.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[arg(long, global = true, default_value_t = default_log_level().to_string())]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Topics and sub-topics with solved counts.
    Summary,
    /// Filter the sheet by topic, sub-topic or question text.
    Search { query: String },
    /// List questions sharing a problem link.
    Duplicates {
        url: String,
        /// Question to leave out of the report.
        #[arg(long)]
        exclude: Option<String>,
    },
    /// Flip the solved flag of a question.
    Toggle { question_id: String },
    /// Discard all changes and restore the default sheet.
    Reset,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = CoreConfig {
        log_level: cli.log_level,
        log_dir: cli.log_dir,
        db_path: cli.db,
        ..CoreConfig::default()
    };
    config.validate()?;
    if let Some(dir) = &config.log_dir {
        init_logging(&config.log_level, dir)?;
    }

    let conn = match &config.db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let repo = SqliteSnapshotRepository::try_new(conn)?;
    let service = SheetService::with_config(LocalSheetService::new(repo), &config);

    info!(
        "event=cli_start module=cli status=ok storage={}",
        if config.db_path.is_some() { "file" } else { "memory" }
    );

    service.load_sheet().await?;
    match cli.command {
        Command::Summary => print_summary(&service),
        Command::Search { query } => print_search(&service, &query),
        Command::Duplicates { url, exclude } => {
            let exclude = exclude.map(QuestionId::new);
            print_duplicates(&service, &url, exclude.as_ref());
        }
        Command::Toggle { question_id } => {
            let solved = service.toggle_solved(&QuestionId::new(question_id)).await?;
            println!("solved={solved}");
        }
        Command::Reset => {
            service.reset_data().await?;
            println!("Sheet reset to defaults");
            print_summary(&service);
        }
    }
    Ok(())
}

fn print_summary(service: &Service) {
    let progress = service.progress();
    service.read(|state| {
        if let Some(sheet) = state.sheet() {
            println!(
                "{} ({}/{} solved)",
                sheet.name, progress.sheet.solved, progress.sheet.total
            );
        }
        for topic in state.topics_in_order() {
            let counts = progress.topics.get(&topic.id).copied().unwrap_or_default();
            println!(
                "  {} [{}] {}/{}",
                topic.name, topic.id, counts.solved, counts.total
            );
            for sub_topic in state.sub_topics_of(topic) {
                let counts = progress
                    .sub_topics
                    .get(&sub_topic.id)
                    .copied()
                    .unwrap_or_default();
                println!(
                    "    {} [{}] {}%",
                    sub_topic.name,
                    sub_topic.id,
                    counts.percent()
                );
            }
        }
    });
}

fn print_search(service: &Service, query: &str) {
    let Some(matches) = service.search(query) else {
        println!("empty query, nothing filtered");
        return;
    };
    println!("{} matches", matches.total_matches);
    service.read(|state| {
        for topic in state.topics_in_order() {
            if !matches.visible_topic_ids.contains(&topic.id) {
                continue;
            }
            println!("  {}", marked(&topic.name, query));
            for sub_topic in state.sub_topics_of(topic) {
                if !matches.visible_sub_topic_ids.contains(&sub_topic.id) {
                    continue;
                }
                println!("    {}", marked(&sub_topic.name, query));
                for question in state.questions_of(sub_topic) {
                    if matches.visible_question_ids.contains(&question.id) {
                        println!("      {} [{}]", marked(&question.title, query), question.id);
                    }
                }
            }
        }
    });
}

fn print_duplicates(service: &Service, url: &str, exclude: Option<&QuestionId>) {
    let locations = service.find_duplicates(url, exclude);
    if locations.is_empty() {
        println!("no other question uses this link");
        return;
    }
    for location in locations {
        println!(
            "{} [{}] in {} / {}",
            location.title, location.question_id, location.topic_name, location.sub_topic_name
        );
    }
}

/// Wraps every matched run in `*`.
fn marked(text: &str, query: &str) -> String {
    highlight(text, query)
        .into_iter()
        .map(|segment| {
            if segment.matched {
                format!("*{}*", segment.text)
            } else {
                segment.text.to_string()
            }
        })
        .collect()
}
