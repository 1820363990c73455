use std::sync::Arc;
use std::thread;

use crate::http_client::ApiClient;
use crate::pipeline::{FetchPipeline, Fetcher, run_dependent, run_independent};
use crate::prediction_fetch::{self, MatchPredictionRequest};
use crate::schedule_fetch;
use crate::state::{ErrorKind, FetchState, NextGame, PredictionRecord, StatRow, TeamStats};
use crate::stats_fetch;

/// Everything the next-game panel needs, produced by one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct NextGameBundle {
    pub game: NextGame,
    pub home_stats: TeamStats,
    pub away_stats: TeamStats,
    pub prediction: PredictionRecord,
}

/// Next scheduled game, both teams' stats in parallel, then the dependent
/// prediction call.
pub struct NextGameLoader {
    client: Arc<ApiClient>,
    pipeline: FetchPipeline<NextGameBundle>,
}

impl NextGameLoader {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            pipeline: FetchPipeline::new(),
        }
    }

    pub fn pipeline(&self) -> &FetchPipeline<NextGameBundle> {
        &self.pipeline
    }

    pub fn state(&self) -> FetchState<NextGameBundle> {
        self.pipeline.state()
    }

    pub fn load(&self) -> thread::JoinHandle<()> {
        let client = Arc::clone(&self.client);
        self.pipeline.load(move || load_bundle(client))
    }
}

fn load_bundle(client: Arc<ApiClient>) -> Result<NextGameBundle, ErrorKind> {
    let game = schedule_fetch::fetch_next_game(&client)?;
    let home_id = game.home_team.id;
    let away_id = game.away_team.id;

    let fetchers: Vec<Fetcher<TeamStats>> = vec![
        Box::new({
            let client = Arc::clone(&client);
            move || stats_fetch::fetch_team_stats(&client, home_id)
        }),
        Box::new({
            let client = Arc::clone(&client);
            move || stats_fetch::fetch_team_stats(&client, away_id)
        }),
    ];
    let stats = run_independent(fetchers)?;
    let mut stats = stats.into_iter();
    let (Some(home_stats), Some(away_stats)) = (stats.next(), stats.next()) else {
        return Err(ErrorKind::Validation(
            "stats pipeline returned the wrong number of results".to_string(),
        ));
    };

    let prediction = run_dependent(&[home_stats.clone(), away_stats.clone()], |prior| {
        let request = MatchPredictionRequest {
            home_team_id: home_id,
            away_team_id: away_id,
            home_team_stats: prior[0].clone(),
            away_team_stats: prior[1].clone(),
        };
        prediction_fetch::predict_match(&client, &request)
    })?;

    Ok(NextGameBundle {
        game,
        home_stats,
        away_stats,
        prediction,
    })
}

/// Side-by-side metric rows for the matchup table.
pub fn comparison_rows(bundle: &NextGameBundle) -> Vec<StatRow> {
    let home = &bundle.home_stats;
    let away = &bundle.away_stats;
    vec![
        stat_row("Points per game", home.points_per_game, away.points_per_game),
        stat_row(
            "Field goal %",
            home.field_goal_percentage,
            away.field_goal_percentage,
        ),
        stat_row(
            "Three point %",
            home.three_point_percentage,
            away.three_point_percentage,
        ),
        stat_row(
            "Free throw %",
            home.free_throw_percentage,
            away.free_throw_percentage,
        ),
        stat_row(
            "Assists per game",
            home.assists_per_game,
            away.assists_per_game,
        ),
        stat_row(
            "Rebounds per game",
            home.rebounds_per_game,
            away.rebounds_per_game,
        ),
        StatRow {
            name: "Win streak".to_string(),
            home: format_streak(home.win_streak),
            away: format_streak(away.win_streak),
        },
        stat_row("Last ten games", home.last_ten_games, away.last_ten_games),
    ]
}

fn stat_row(name: &str, home: f64, away: f64) -> StatRow {
    StatRow {
        name: name.to_string(),
        home: format!("{home:.1}"),
        away: format!("{away:.1}"),
    }
}

fn format_streak(streak: i32) -> String {
    if streak > 0 {
        format!("W{streak}")
    } else if streak < 0 {
        format!("L{}", -streak)
    } else {
        "-".to_string()
    }
}
