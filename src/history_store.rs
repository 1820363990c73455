use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};

use crate::state::{PredictionRecord, Team};

const CACHE_DIR: &str = "courtside_terminal";
const DB_FILE: &str = "prediction_history.sqlite";

pub fn default_db_path() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(DB_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(DB_FILE),
    )
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS predictions (
            id INTEGER PRIMARY KEY,
            ts TEXT NOT NULL,
            home_team_id INTEGER NOT NULL,
            home_team TEXT NOT NULL,
            home_abbr TEXT NOT NULL,
            away_team_id INTEGER NOT NULL,
            away_team TEXT NOT NULL,
            away_abbr TEXT NOT NULL,
            home_win_probability REAL NOT NULL,
            predicted_winner_id INTEGER NOT NULL,
            predicted_winner TEXT NOT NULL,
            predicted_winner_abbr TEXT NOT NULL,
            confidence REAL NOT NULL,
            actual_winner_id INTEGER NULL,
            actual_winner TEXT NULL,
            is_correct INTEGER NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_predictions_ts ON predictions(ts);
        "#,
    )
    .context("init predictions schema")?;
    Ok(())
}

pub fn upsert_predictions(conn: &mut Connection, records: &[PredictionRecord]) -> Result<usize> {
    let tx = conn.transaction().context("begin upsert transaction")?;
    let mut upserted = 0usize;
    for record in records {
        upsert_prediction(&tx, record)?;
        upserted += 1;
    }
    tx.commit().context("commit upsert transaction")?;
    Ok(upserted)
}

fn upsert_prediction(tx: &rusqlite::Transaction<'_>, record: &PredictionRecord) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO predictions (
            id, ts,
            home_team_id, home_team, home_abbr,
            away_team_id, away_team, away_abbr,
            home_win_probability,
            predicted_winner_id, predicted_winner, predicted_winner_abbr,
            confidence, actual_winner_id, actual_winner, is_correct, updated_at
        ) VALUES (
            ?1, ?2,
            ?3, ?4, ?5,
            ?6, ?7, ?8,
            ?9,
            ?10, ?11, ?12,
            ?13, ?14, ?15, ?16, ?17
        )
        ON CONFLICT(id) DO UPDATE SET
            ts = excluded.ts,
            home_team_id = excluded.home_team_id,
            home_team = excluded.home_team,
            home_abbr = excluded.home_abbr,
            away_team_id = excluded.away_team_id,
            away_team = excluded.away_team,
            away_abbr = excluded.away_abbr,
            home_win_probability = excluded.home_win_probability,
            predicted_winner_id = excluded.predicted_winner_id,
            predicted_winner = excluded.predicted_winner,
            predicted_winner_abbr = excluded.predicted_winner_abbr,
            confidence = excluded.confidence,
            actual_winner_id = COALESCE(excluded.actual_winner_id, predictions.actual_winner_id),
            actual_winner = COALESCE(excluded.actual_winner, predictions.actual_winner),
            is_correct = COALESCE(excluded.is_correct, predictions.is_correct),
            updated_at = excluded.updated_at
        "#,
        params![
            record.id as i64,
            record.timestamp,
            record.home_team.id as i64,
            record.home_team.name,
            record.home_team.abbreviation,
            record.away_team.id as i64,
            record.away_team.name,
            record.away_team.abbreviation,
            record.home_win_probability,
            record.predicted_winner.id as i64,
            record.predicted_winner.name,
            record.predicted_winner.abbreviation,
            record.confidence,
            record.actual_winner.as_ref().map(|t| t.id as i64),
            record.actual_winner.as_ref().map(|t| t.name.clone()),
            record.is_correct.map(i64::from),
            Utc::now().to_rfc3339(),
        ],
    )
    .context("upsert prediction")?;
    Ok(())
}

pub fn load_predictions(conn: &Connection) -> Result<Vec<PredictionRecord>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT id, ts,
                   home_team_id, home_team, home_abbr,
                   away_team_id, away_team, away_abbr,
                   home_win_probability,
                   predicted_winner_id, predicted_winner, predicted_winner_abbr,
                   confidence, actual_winner_id, actual_winner, is_correct
            FROM predictions
            ORDER BY ts ASC, id ASC
            "#,
        )
        .context("prepare load predictions")?;

    let rows = stmt
        .query_map([], |row| {
            let actual_winner_id: Option<i64> = row.get(13)?;
            let actual_winner_name: Option<String> = row.get(14)?;
            let actual_winner = match (actual_winner_id, actual_winner_name) {
                (Some(id), Some(name)) => Some(Team {
                    id: id as u32,
                    name,
                    abbreviation: String::new(),
                }),
                _ => None,
            };
            Ok(PredictionRecord {
                id: row.get::<_, i64>(0)? as u64,
                timestamp: row.get(1)?,
                home_team: Team {
                    id: row.get::<_, i64>(2)? as u32,
                    name: row.get(3)?,
                    abbreviation: row.get(4)?,
                },
                away_team: Team {
                    id: row.get::<_, i64>(5)? as u32,
                    name: row.get(6)?,
                    abbreviation: row.get(7)?,
                },
                home_win_probability: row.get(8)?,
                predicted_winner: Team {
                    id: row.get::<_, i64>(9)? as u32,
                    name: row.get(10)?,
                    abbreviation: row.get(11)?,
                },
                confidence: row.get(12)?,
                actual_winner,
                is_correct: row.get::<_, Option<i64>>(15)?.map(|v| v != 0),
            })
        })
        .context("query load predictions")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode prediction row")?);
    }
    Ok(out)
}

/// Settles a stored prediction against the real result. Returns false when
/// the id is unknown.
pub fn record_outcome(conn: &Connection, prediction_id: u64, winner: &Team) -> Result<bool> {
    let changed = conn
        .execute(
            r#"
            UPDATE predictions
            SET actual_winner_id = ?2,
                actual_winner = ?3,
                is_correct = (predicted_winner_id = ?2),
                updated_at = ?4
            WHERE id = ?1
            "#,
            params![
                prediction_id as i64,
                winner.id as i64,
                winner.name,
                Utc::now().to_rfc3339(),
            ],
        )
        .context("record outcome")?;
    Ok(changed > 0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccuracySummary {
    pub total: usize,
    pub settled: usize,
    pub correct: usize,
    pub mean_confidence: f64,
}

impl AccuracySummary {
    pub fn accuracy(&self) -> Option<f64> {
        if self.settled == 0 {
            None
        } else {
            Some(self.correct as f64 / self.settled as f64)
        }
    }
}

pub fn accuracy_summary(conn: &Connection) -> Result<AccuracySummary> {
    conn.query_row(
        r#"
        SELECT COUNT(*),
               COUNT(is_correct),
               COALESCE(SUM(is_correct), 0),
               COALESCE(AVG(confidence), 0.0)
        FROM predictions
        "#,
        [],
        |row| {
            Ok(AccuracySummary {
                total: row.get::<_, i64>(0)? as usize,
                settled: row.get::<_, i64>(1)? as usize,
                correct: row.get::<_, i64>(2)? as usize,
                mean_confidence: row.get(3)?,
            })
        },
    )
    .context("query accuracy summary")
}
