use serde::Serialize;
use serde_json::Value;

use crate::http_client::{ApiClient, decode_json};
use crate::state::{ErrorKind, FetchCause, PredictionRecord, TeamStats, validate_prediction};

const HISTORY_PATH: &str = "/predictions";
const HISTORY_FALLBACK_PATH: &str = "/predictions/history";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPredictionRequest {
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub home_team_stats: TeamStats,
    pub away_team_stats: TeamStats,
}

pub fn predict_match(
    client: &ApiClient,
    request: &MatchPredictionRequest,
) -> Result<PredictionRecord, ErrorKind> {
    let body = client.post_json_text("/predict", request)?;
    parse_prediction_json(&body)
}

pub fn parse_prediction_json(raw: &str) -> Result<PredictionRecord, ErrorKind> {
    let record: PredictionRecord = decode_json(raw)?;
    validate_prediction(&record)?;
    Ok(record)
}

/// History fetch result. Entries that fail validation are flagged rather
/// than sinking the whole response.
pub struct HistoryFetch {
    pub records: Vec<PredictionRecord>,
    pub rejected: Vec<String>,
}

pub fn fetch_history(client: &ApiClient) -> Result<HistoryFetch, ErrorKind> {
    match client.get_text(HISTORY_PATH) {
        Ok(body) => parse_history_json(&body),
        // Older backends only expose the wrapped endpoint.
        Err(ErrorKind::FetchFailed(FetchCause::HttpStatus { status: 404, .. })) => {
            let body = client.get_text(HISTORY_FALLBACK_PATH)?;
            parse_history_json(&body)
        }
        Err(err) => Err(err),
    }
}

/// Accepts both history shapes: bare prediction records, or
/// `{id, prediction, actualWinner, isCorrect}` wrappers. Bare entries
/// without ids get one from their list position.
pub fn parse_history_json(raw: &str) -> Result<HistoryFetch, ErrorKind> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(HistoryFetch {
            records: Vec::new(),
            rejected: Vec::new(),
        });
    }
    let value: Value = decode_json(trimmed)?;
    let Some(entries) = value.as_array() else {
        return Err(ErrorKind::Validation(
            "history response is not a list".to_string(),
        ));
    };

    let mut records = Vec::new();
    let mut rejected = Vec::new();
    for (idx, entry) in entries.iter().enumerate() {
        match flatten_history_entry(entry, idx as u64 + 1) {
            Ok(record) => records.push(record),
            Err(err) => rejected.push(format!("entry {}: {err}", idx + 1)),
        }
    }
    Ok(HistoryFetch { records, rejected })
}

fn flatten_history_entry(entry: &Value, fallback_id: u64) -> Result<PredictionRecord, ErrorKind> {
    let mut record: PredictionRecord = if let Some(inner) = entry.get("prediction") {
        let mut record: PredictionRecord = from_value(inner.clone())?;
        if let Some(id) = entry.get("id").and_then(|v| v.as_u64()) {
            record.id = id;
        }
        if let Some(actual) = entry.get("actualWinner")
            && !actual.is_null()
        {
            record.actual_winner = Some(from_value(actual.clone())?);
        }
        if let Some(correct) = entry.get("isCorrect").and_then(|v| v.as_bool()) {
            record.is_correct = Some(correct);
        }
        record
    } else {
        from_value(entry.clone())?
    };

    if record.id == 0 {
        record.id = fallback_id;
    }
    validate_prediction(&record)?;
    Ok(record)
}

fn from_value<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ErrorKind> {
    serde_json::from_value(value)
        .map_err(|err| ErrorKind::Validation(format!("response schema mismatch: {err}")))
}
