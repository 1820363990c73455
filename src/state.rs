use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub abbreviation: String,
}

impl Team {
    pub fn new(id: u32, name: &str, abbreviation: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            abbreviation: abbreviation.to_string(),
        }
    }

    pub fn short_label(&self) -> &str {
        if self.abbreviation.is_empty() {
            &self.name
        } else {
            &self.abbreviation
        }
    }
}

/// Snapshot of a team's current form. Immutable once fetched; a refresh
/// replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub team_id: u32,
    pub points_per_game: f64,
    pub field_goal_percentage: f64,
    pub three_point_percentage: f64,
    pub free_throw_percentage: f64,
    pub assists_per_game: f64,
    pub rebounds_per_game: f64,
    pub win_streak: i32,
    pub last_ten_games: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    #[serde(default)]
    pub id: u64,
    pub timestamp: String,
    pub home_team: Team,
    pub away_team: Team,
    #[serde(default)]
    pub home_win_probability: f64,
    pub predicted_winner: Team,
    pub confidence: f64,
    #[serde(default)]
    pub actual_winner: Option<Team>,
    #[serde(default)]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextGame {
    pub home_team: Team,
    pub away_team: Team,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamComparisonSide {
    pub info: Team,
    pub stats: TeamStats,
}

/// Per-metric deltas, team1 minus team2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonDeltas {
    pub points_per_game: f64,
    pub field_goal_percentage: f64,
    pub three_point_percentage: f64,
    pub free_throw_percentage: f64,
    pub assists_per_game: f64,
    pub rebounds_per_game: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamComparison {
    pub team1: TeamComparisonSide,
    pub team2: TeamComparisonSide,
    pub comparison: ComparisonDeltas,
}

/// One printable metric line for a two-team table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRow {
    pub name: String,
    pub home: String,
    pub away: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchCause {
    #[error("http {status}: {d}", d = .detail.as_deref().unwrap_or("no detail"))]
    HttpStatus { status: u16, detail: Option<String> },
    #[error("no response: {0}")]
    NoResponse(String),
    #[error("request setup failed: {0}")]
    RequestSetup(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("fetch failed: {0}")]
    FetchFailed(FetchCause),
}

/// Lifecycle of one remote load. Exactly one variant at a time; a fresh load
/// restarts at `Loading` no matter which terminal state came before.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Failure(ErrorKind),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            FetchState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&ErrorKind> {
        match self {
            FetchState::Failure(err) => Some(err),
            _ => None,
        }
    }
}

/// Boundary check for prediction payloads. Records that fail are rejected
/// instead of flowing through the views untyped.
pub fn validate_prediction(record: &PredictionRecord) -> Result<(), ErrorKind> {
    if !(0.0..=1.0).contains(&record.confidence) {
        return Err(ErrorKind::Validation(format!(
            "confidence {} outside [0, 1]",
            record.confidence
        )));
    }
    if !(0.0..=1.0).contains(&record.home_win_probability) {
        return Err(ErrorKind::Validation(format!(
            "home win probability {} outside [0, 1]",
            record.home_win_probability
        )));
    }
    let winner = record.predicted_winner.id;
    if winner != record.home_team.id && winner != record.away_team.id {
        return Err(ErrorKind::Validation(format!(
            "predicted winner {} is neither home {} nor away {}",
            winner, record.home_team.id, record.away_team.id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PredictionRecord {
        PredictionRecord {
            id: 1,
            timestamp: "2024-02-20T19:30:00".to_string(),
            home_team: Team::new(1, "Los Angeles Lakers", "LAL"),
            away_team: Team::new(2, "Boston Celtics", "BOS"),
            home_win_probability: 0.61,
            predicted_winner: Team::new(1, "Los Angeles Lakers", "LAL"),
            confidence: 0.8,
            actual_winner: None,
            is_correct: None,
        }
    }

    #[test]
    fn valid_record_passes() {
        assert!(validate_prediction(&record()).is_ok());
    }

    #[test]
    fn confidence_out_of_range_is_rejected() {
        let mut bad = record();
        bad.confidence = 1.2;
        assert!(matches!(
            validate_prediction(&bad),
            Err(ErrorKind::Validation(_))
        ));
    }

    #[test]
    fn winner_must_be_a_participant() {
        let mut bad = record();
        bad.predicted_winner = Team::new(9, "Denver Nuggets", "DEN");
        assert!(matches!(
            validate_prediction(&bad),
            Err(ErrorKind::Validation(_))
        ));
    }

    #[test]
    fn fetch_state_accessors() {
        let state: FetchState<u32> = FetchState::Success(7);
        assert_eq!(state.success(), Some(&7));
        assert!(!state.is_loading());
        let failed: FetchState<u32> = FetchState::Failure(ErrorKind::FetchFailed(
            FetchCause::NoResponse("connection refused".to_string()),
        ));
        assert!(failed.failure().is_some());
    }
}
