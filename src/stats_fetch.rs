use std::env;

use rayon::prelude::*;

use crate::http_client::{ApiClient, decode_json};
use crate::state::{ErrorKind, Team, TeamComparison, TeamStats};

pub fn fetch_team_stats(client: &ApiClient, team_id: u32) -> Result<TeamStats, ErrorKind> {
    let body = client.get_text(&format!("/teams/{team_id}/stats"))?;
    parse_team_stats_json(&body)
}

pub fn parse_team_stats_json(raw: &str) -> Result<TeamStats, ErrorKind> {
    decode_json(raw)
}

pub fn fetch_comparison(
    client: &ApiClient,
    team1_id: u32,
    team2_id: u32,
) -> Result<TeamComparison, ErrorKind> {
    let body = client.get_text(&format!("/teams/compare/{team1_id}/{team2_id}"))?;
    parse_comparison_json(&body)
}

pub fn parse_comparison_json(raw: &str) -> Result<TeamComparison, ErrorKind> {
    decode_json(raw)
}

/// League-wide stat sweep. Per-team failures land in `errors` so one bad
/// team does not sink the table.
pub struct LeagueStats {
    pub rows: Vec<(Team, TeamStats)>,
    pub errors: Vec<String>,
}

pub fn fetch_league_stats(client: &ApiClient, teams: &[Team]) -> LeagueStats {
    let results: Vec<(Team, Result<TeamStats, ErrorKind>)> = match stats_pool() {
        Some(pool) => pool.install(|| {
            teams
                .par_iter()
                .map(|team| (team.clone(), fetch_team_stats(client, team.id)))
                .collect()
        }),
        None => teams
            .iter()
            .map(|team| (team.clone(), fetch_team_stats(client, team.id)))
            .collect(),
    };

    let mut rows = Vec::new();
    let mut errors = Vec::new();
    for (team, outcome) in results {
        match outcome {
            Ok(stats) => rows.push((team, stats)),
            Err(err) => errors.push(format!("{} ({}): {err}", team.name, team.id)),
        }
    }
    LeagueStats { rows, errors }
}

fn stats_pool() -> Option<rayon::ThreadPool> {
    let threads = stats_parallelism();
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .ok()
}

fn stats_parallelism() -> usize {
    env::var("STATS_FETCH_PARALLELISM")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(6)
        .clamp(2, 32)
}
