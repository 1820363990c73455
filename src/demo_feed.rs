use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;

use crate::next_game::NextGameBundle;
use crate::state::{NextGame, PredictionRecord, Team, TeamStats};

/// Offline stand-ins for the backend so the dashboard stays usable without
/// a network.
pub fn sample_teams() -> Vec<Team> {
    vec![
        Team::new(1, "Atlanta Hawks", "ATL"),
        Team::new(2, "Boston Celtics", "BOS"),
        Team::new(3, "Denver Nuggets", "DEN"),
        Team::new(4, "Golden State Warriors", "GSW"),
        Team::new(5, "Los Angeles Lakers", "LAL"),
        Team::new(6, "Milwaukee Bucks", "MIL"),
        Team::new(7, "New York Knicks", "NYK"),
        Team::new(8, "Portland Trail Blazers", "POR"),
    ]
}

pub fn sample_stats(team_id: u32, rng: &mut impl Rng) -> TeamStats {
    // Base form scales with the id so the table is not uniform.
    let base = 108.0 + (team_id % 5) as f64 * 2.5;
    TeamStats {
        team_id,
        points_per_game: base + rng.gen_range(-3.0..3.0),
        field_goal_percentage: 45.0 + rng.gen_range(-2.0..4.0),
        three_point_percentage: 34.0 + rng.gen_range(-2.0..4.0),
        free_throw_percentage: 76.0 + rng.gen_range(-3.0..6.0),
        assists_per_game: 24.0 + rng.gen_range(-2.0..4.0),
        rebounds_per_game: 42.0 + rng.gen_range(-3.0..4.0),
        win_streak: rng.gen_range(-4..5),
        last_ten_games: rng.gen_range(2..9) as f64,
    }
}

pub fn sample_history(rng: &mut impl Rng, count: usize) -> Vec<PredictionRecord> {
    let teams = sample_teams();
    let now = Utc::now().naive_utc();
    let mut out = Vec::with_capacity(count);
    for idx in 0..count {
        let home = teams[rng.gen_range(0..teams.len())].clone();
        let mut away = teams[rng.gen_range(0..teams.len())].clone();
        while away.id == home.id {
            away = teams[rng.gen_range(0..teams.len())].clone();
        }
        let home_win_probability = rng.gen_range(0.25..0.75);
        let predicted_winner = if home_win_probability > 0.5 {
            home.clone()
        } else {
            away.clone()
        };
        let settled = rng.gen_bool(0.6);
        let actual_winner = if settled {
            Some(if rng.gen_bool(home_win_probability) {
                home.clone()
            } else {
                away.clone()
            })
        } else {
            None
        };
        let is_correct = actual_winner
            .as_ref()
            .map(|winner| winner.id == predicted_winner.id);
        let tipoff = now - ChronoDuration::days((count - idx) as i64);

        out.push(PredictionRecord {
            id: idx as u64 + 1,
            timestamp: tipoff.format("%Y-%m-%dT%H:%M:%S").to_string(),
            home_team: home,
            away_team: away,
            home_win_probability,
            predicted_winner,
            confidence: rng.gen_range(0.5..0.95),
            actual_winner,
            is_correct,
        })
    }
    out
}

pub fn sample_next_game_bundle(rng: &mut impl Rng) -> NextGameBundle {
    let teams = sample_teams();
    let home = teams[rng.gen_range(0..teams.len())].clone();
    let mut away = teams[rng.gen_range(0..teams.len())].clone();
    while away.id == home.id {
        away = teams[rng.gen_range(0..teams.len())].clone();
    }

    let tipoff = Utc::now().naive_utc() + ChronoDuration::days(1);
    let home_stats = sample_stats(home.id, rng);
    let away_stats = sample_stats(away.id, rng);
    let home_win_probability = rng.gen_range(0.3..0.7);
    let predicted_winner = if home_win_probability > 0.5 {
        home.clone()
    } else {
        away.clone()
    };

    NextGameBundle {
        game: NextGame {
            home_team: home.clone(),
            away_team: away.clone(),
            date: tipoff.format("%Y-%m-%d").to_string(),
            time: "19:30".to_string(),
        },
        home_stats,
        away_stats,
        prediction: PredictionRecord {
            id: 0,
            timestamp: Utc::now().naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string(),
            home_team: home,
            away_team: away,
            home_win_probability,
            predicted_winner,
            confidence: rng.gen_range(0.55..0.9),
            actual_winner: None,
            is_correct: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::validate_prediction;

    #[test]
    fn sample_history_records_are_valid() {
        let mut rng = rand::thread_rng();
        let records = sample_history(&mut rng, 25);
        assert_eq!(records.len(), 25);
        for record in &records {
            assert!(validate_prediction(record).is_ok());
            assert_ne!(record.home_team.id, record.away_team.id);
        }
    }

    #[test]
    fn sample_bundle_is_valid() {
        let mut rng = rand::thread_rng();
        let bundle = sample_next_game_bundle(&mut rng);
        assert!(validate_prediction(&bundle.prediction).is_ok());
        assert_eq!(bundle.home_stats.team_id, bundle.game.home_team.id);
    }
}
