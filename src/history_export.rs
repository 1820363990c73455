use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::history_view::{format_confidence, format_timestamp};
use crate::state::PredictionRecord;

pub struct ExportReport {
    pub rows: usize,
}

/// Writes the given rows (usually the currently visible, filtered and
/// sorted subset) to a single-sheet workbook.
pub fn export_history(path: &Path, records: &[&PredictionRecord]) -> Result<ExportReport> {
    let mut rows = vec![vec![
        "ID".to_string(),
        "Date".to_string(),
        "Home Team".to_string(),
        "Away Team".to_string(),
        "Predicted Winner".to_string(),
        "Home Win %".to_string(),
        "Confidence".to_string(),
        "Result".to_string(),
    ]];
    rows.extend(records.iter().map(|record| prediction_row(record)));

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Predictions")?;
        write_rows(sheet, &rows)?;
        sheet.autofit();
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        rows: rows.len().saturating_sub(1),
    })
}

fn prediction_row(record: &PredictionRecord) -> Vec<String> {
    vec![
        record.id.to_string(),
        format_timestamp(&record.timestamp),
        record.home_team.name.clone(),
        record.away_team.name.clone(),
        record.predicted_winner.name.clone(),
        format!("{:.1}", record.home_win_probability * 100.0),
        format_confidence(record.confidence),
        result_label(record),
    ]
}

fn result_label(record: &PredictionRecord) -> String {
    match record.is_correct {
        Some(true) => "CORRECT".to_string(),
        Some(false) => "WRONG".to_string(),
        None => record
            .actual_winner
            .as_ref()
            .map(|team| team.name.clone())
            .unwrap_or_else(|| "-".to_string()),
    }
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
