use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::list_view::{ListView, SortDirection, ViewRecord};
use crate::state::PredictionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySortKey {
    Date,
    HomeTeam,
    AwayTeam,
    Winner,
    Confidence,
}

pub type HistoryView = ListView<PredictionRecord>;

/// Fresh history table: newest predictions first, like the dashboard's
/// default ordering.
pub fn new_history_view() -> HistoryView {
    ListView::with_sort(HistorySortKey::Date, SortDirection::Descending)
}

impl ViewRecord for PredictionRecord {
    type SortKey = HistorySortKey;

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.home_team.name.as_str(),
            self.away_team.name.as_str(),
            self.predicted_winner.name.as_str(),
        ]
    }

    // A record belongs to both teams on the floor.
    fn category_values(&self) -> Vec<&str> {
        vec![self.home_team.name.as_str(), self.away_team.name.as_str()]
    }

    fn compare_by(&self, other: &Self, key: HistorySortKey) -> Ordering {
        match key {
            HistorySortKey::Date => cmp_timestamps(&self.timestamp, &other.timestamp),
            HistorySortKey::HomeTeam => cmp_names(&self.home_team.name, &other.home_team.name),
            HistorySortKey::AwayTeam => cmp_names(&self.away_team.name, &other.away_team.name),
            HistorySortKey::Winner => {
                cmp_names(&self.predicted_winner.name, &other.predicted_winner.name)
            }
            HistorySortKey::Confidence => self
                .confidence
                .partial_cmp(&other.confidence)
                .unwrap_or(Ordering::Equal),
        }
    }
}

/// Case-insensitive name ordering with a bytewise tiebreak so that
/// case-variant names still order deterministically.
fn cmp_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Chronological when both sides parse; text order keeps unparseable
/// timestamps stable instead of erroring.
fn cmp_timestamps(a: &str, b: &str) -> Ordering {
    match (parse_timestamp(a), parse_timestamp(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let cleaned = raw.trim().trim_end_matches('Z');
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(dt);
        }
    }
    // Date-only values sort at midnight.
    chrono::NaiveDate::parse_from_str(cleaned, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn format_timestamp(raw: &str) -> String {
    if let Some(dt) = parse_timestamp(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    let cleaned = raw.trim();
    if cleaned.len() >= 16 {
        cleaned[..16].replace('T', " ")
    } else {
        cleaned.replace('T', " ")
    }
}

pub fn format_confidence(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

pub fn sort_key_label(key: HistorySortKey) -> &'static str {
    match key {
        HistorySortKey::Date => "DATE",
        HistorySortKey::HomeTeam => "HOME",
        HistorySortKey::AwayTeam => "AWAY",
        HistorySortKey::Winner => "WINNER",
        HistorySortKey::Confidence => "CONF",
    }
}

pub fn parse_sort_key(raw: &str) -> Option<HistorySortKey> {
    match raw.trim().to_lowercase().as_str() {
        "date" | "ts" | "time" => Some(HistorySortKey::Date),
        "home" | "hometeam" => Some(HistorySortKey::HomeTeam),
        "away" | "awayteam" => Some(HistorySortKey::AwayTeam),
        "winner" => Some(HistorySortKey::Winner),
        "conf" | "confidence" => Some(HistorySortKey::Confidence),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_parse_across_formats() {
        assert!(parse_timestamp("2024-02-20T19:30:00").is_some());
        assert!(parse_timestamp("2024-02-20 19:30:00").is_some());
        assert!(parse_timestamp("2024-02-20T19:30:00.123456").is_some());
        assert!(parse_timestamp("2024-02-20").is_some());
        assert!(parse_timestamp("tbd").is_none());
    }

    #[test]
    fn date_only_sorts_before_same_day_evening() {
        assert_eq!(
            cmp_timestamps("2024-02-20", "2024-02-20T19:30:00"),
            Ordering::Less
        );
    }

    #[test]
    fn name_ordering_ignores_case_first() {
        assert_eq!(cmp_names("boston", "Boston"), Ordering::Greater);
        assert_eq!(cmp_names("Atlanta", "boston"), Ordering::Less);
    }
}
