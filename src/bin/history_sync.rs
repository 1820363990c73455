use std::path::PathBuf;

use anyhow::{Context, Result};

use courtside_terminal::demo_feed;
use courtside_terminal::history_store;
use courtside_terminal::http_client::{ApiClient, ApiConfig};
use courtside_terminal::prediction_fetch;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let db_path = parse_db_path_arg()
        .or_else(history_store::default_db_path)
        .context("unable to resolve sqlite path")?;
    let offline = std::env::args().any(|arg| arg == "--offline");

    let (records, rejected) = if offline {
        let mut rng = rand::thread_rng();
        (demo_feed::sample_history(&mut rng, 24), Vec::new())
    } else {
        let client = ApiClient::new(ApiConfig::from_env())?;
        let history = prediction_fetch::fetch_history(&client)
            .map_err(|err| anyhow::anyhow!("history fetch failed: {err}"))?;
        (history.records, history.rejected)
    };

    let mut conn = history_store::open_db(&db_path)?;
    let upserted = history_store::upsert_predictions(&mut conn, &records)?;
    let summary = history_store::accuracy_summary(&conn)?;

    println!("History sync complete");
    println!("DB: {}", db_path.display());
    println!("Upserted: {upserted}");
    if !rejected.is_empty() {
        println!("Rejected: {}", rejected.len());
        for entry in rejected.iter().take(6) {
            println!(" - {entry}");
        }
    }
    println!(
        "Stored: {} | settled: {} | correct: {}",
        summary.total, summary.settled, summary.correct
    );
    match summary.accuracy() {
        Some(accuracy) => println!("Accuracy: {:.1}%", accuracy * 100.0),
        None => println!("Accuracy: n/a (no settled predictions yet)"),
    }
    println!("Mean confidence: {:.1}%", summary.mean_confidence * 100.0);

    Ok(())
}

fn parse_db_path_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--db" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
