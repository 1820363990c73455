use serde_json::Value;

use crate::http_client::{ApiClient, decode_json};
use crate::state::{ErrorKind, NextGame, Team};

const TEAMS_PATH: &str = "/teams";
const NEXT_GAME_PATH: &str = "/next-game";

pub fn fetch_teams(client: &ApiClient) -> Result<Vec<Team>, ErrorKind> {
    let body = client.get_text(TEAMS_PATH)?;
    parse_teams_json(&body)
}

pub fn parse_teams_json(raw: &str) -> Result<Vec<Team>, ErrorKind> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    decode_json(trimmed)
}

pub fn fetch_next_game(client: &ApiClient) -> Result<NextGame, ErrorKind> {
    let body = client.get_text(NEXT_GAME_PATH)?;
    parse_next_game_json(&body)
}

/// Accepts the canonical single object, or the older list-of-games shape
/// (first entry wins).
pub fn parse_next_game_json(raw: &str) -> Result<NextGame, ErrorKind> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(ErrorKind::Validation(
            "no upcoming game in response".to_string(),
        ));
    }
    let value: Value = decode_json(trimmed)?;
    let game = match value {
        Value::Array(items) => items.into_iter().next().ok_or_else(|| {
            ErrorKind::Validation("no upcoming game in response".to_string())
        })?,
        other => other,
    };
    serde_json::from_value(game)
        .map_err(|err| ErrorKind::Validation(format!("response schema mismatch: {err}")))
}
