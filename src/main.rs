use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Receiver;

use anyhow::{Context, Result};

use courtside_terminal::demo_feed;
use courtside_terminal::history_export;
use courtside_terminal::history_store;
use courtside_terminal::history_view::{
    HistoryView, format_confidence, format_timestamp, new_history_view, parse_sort_key,
    sort_key_label,
};
use courtside_terminal::http_client::{ApiClient, ApiConfig};
use courtside_terminal::list_view::{SortDirection, ViewChange};
use courtside_terminal::next_game::{NextGameBundle, NextGameLoader, comparison_rows};
use courtside_terminal::pipeline::PipelineEvent;
use courtside_terminal::prediction_fetch;
use courtside_terminal::schedule_fetch;
use courtside_terminal::state::{FetchState, PredictionRecord, Team, TeamStats};
use courtside_terminal::stats_fetch;

struct App {
    client: Arc<ApiClient>,
    view: HistoryView,
    view_events: Receiver<ViewChange>,
    next_game: NextGameLoader,
    offline: bool,
    logs: VecDeque<String>,
}

impl App {
    fn new(client: Arc<ApiClient>, offline: bool) -> Self {
        let mut view = new_history_view();
        let view_events = view.subscribe();
        let next_game = NextGameLoader::new(Arc::clone(&client));
        Self {
            client,
            view,
            view_events,
            next_game,
            offline,
            logs: VecDeque::new(),
        }
    }

    fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        let msg = msg.into();
        println!("{msg}");
        self.logs.push_back(msg);
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    fn reload_history(&mut self) {
        if self.offline {
            let mut rng = rand::thread_rng();
            let records = demo_feed::sample_history(&mut rng, 24);
            self.view.set_records(records);
            self.push_log("[INFO] Loaded offline sample history");
            self.drain_view_events();
            return;
        }
        match prediction_fetch::fetch_history(&self.client) {
            Ok(history) => {
                for rejected in &history.rejected {
                    self.push_log(format!("[WARN] History entry rejected: {rejected}"));
                }
                let count = history.records.len();
                self.view.set_records(history.records);
                self.push_log(format!("[INFO] Loaded {count} predictions"));
            }
            Err(err) => self.push_log(format!("[WARN] History fetch error: {err}")),
        }
        self.drain_view_events();
    }

    // The view notifies on every transition; the terminal just reprints.
    fn drain_view_events(&mut self) {
        let mut dirty = false;
        while self.view_events.try_recv().is_ok() {
            dirty = true;
        }
        if dirty {
            print_history_table(&self.view);
        }
    }

    fn show_next_game(&mut self) {
        if self.offline {
            let mut rng = rand::thread_rng();
            let bundle = demo_feed::sample_next_game_bundle(&mut rng);
            print_next_game(&bundle);
            return;
        }

        let events = self.next_game.pipeline().subscribe();
        let handle = self.next_game.load();
        while let Ok(event) = events.try_recv() {
            if event == PipelineEvent::Loading {
                self.push_log("[INFO] Loading next game...");
            }
        }
        if handle.join().is_err() {
            self.push_log("[WARN] Next game load thread panicked");
            return;
        }
        match self.next_game.state() {
            FetchState::Success(bundle) => print_next_game(&bundle),
            FetchState::Failure(err) => self.push_log(format!("[WARN] Next game error: {err}")),
            FetchState::Idle | FetchState::Loading => {
                self.push_log("[WARN] Next game load did not resolve");
            }
        }
    }

    fn show_teams(&mut self) {
        let teams = if self.offline {
            demo_feed::sample_teams()
        } else {
            match schedule_fetch::fetch_teams(&self.client) {
                Ok(teams) => teams,
                Err(err) => {
                    self.push_log(format!("[WARN] Teams fetch error: {err}"));
                    return;
                }
            }
        };
        if teams.is_empty() {
            self.push_log("[INFO] No teams returned");
            return;
        }

        if self.offline {
            let mut rng = rand::thread_rng();
            let rows: Vec<_> = teams
                .iter()
                .map(|t| (t.clone(), demo_feed::sample_stats(t.id, &mut rng)))
                .collect();
            print_league_table(&rows);
            return;
        }

        let league = stats_fetch::fetch_league_stats(&self.client, &teams);
        for err in &league.errors {
            self.push_log(format!("[WARN] Stats fetch: {err}"));
        }
        print_league_table(&league.rows);
    }

    fn compare(&mut self, team1_id: u32, team2_id: u32) {
        match stats_fetch::fetch_comparison(&self.client, team1_id, team2_id) {
            Ok(cmp) => {
                println!(
                    "{} vs {} (deltas are {} minus {})",
                    cmp.team1.info.name, cmp.team2.info.name, cmp.team1.info.name, cmp.team2.info.name
                );
                let d = &cmp.comparison;
                println!("  Points per game   {:+.1}", d.points_per_game);
                println!("  Field goal %      {:+.1}", d.field_goal_percentage);
                println!("  Three point %     {:+.1}", d.three_point_percentage);
                println!("  Free throw %      {:+.1}", d.free_throw_percentage);
                println!("  Assists per game  {:+.1}", d.assists_per_game);
                println!("  Rebounds per game {:+.1}", d.rebounds_per_game);
            }
            Err(err) => self.push_log(format!("[WARN] Comparison error: {err}")),
        }
    }

    fn export(&mut self, path: &str) {
        let visible = self.view.visible_records();
        match history_export::export_history(&PathBuf::from(path), &visible) {
            Ok(report) => self.push_log(format!("[INFO] Exported {} rows to {path}", report.rows)),
            Err(err) => self.push_log(format!("[WARN] Export failed: {err:#}")),
        }
    }

    fn sync(&mut self) {
        let Some(db_path) = history_store::default_db_path() else {
            self.push_log("[WARN] No cache directory available for the history db");
            return;
        };
        let records: Vec<PredictionRecord> = self.view.records().to_vec();
        if records.is_empty() {
            self.push_log("[INFO] Nothing to sync; load history first");
            return;
        }
        let outcome = history_store::open_db(&db_path).and_then(|mut conn| {
            let upserted = history_store::upsert_predictions(&mut conn, &records)?;
            let summary = history_store::accuracy_summary(&conn)?;
            Ok((upserted, summary))
        });
        match outcome {
            Ok((upserted, summary)) => {
                self.push_log(format!(
                    "[INFO] Synced {upserted} predictions to {}",
                    db_path.display()
                ));
                print_accuracy(&summary);
            }
            Err(err) => self.push_log(format!("[WARN] Sync failed: {err:#}")),
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let offline = std::env::args().any(|arg| arg == "--offline");
    let client = Arc::new(ApiClient::new(ApiConfig::from_env())?);

    println!("courtside terminal | backend: {}", client.base_url());
    print_help();

    let mut app = App::new(client, offline);
    app.reload_history();

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().ok();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("read command")? == 0 {
            break;
        }
        if !dispatch(&mut app, line.trim_end_matches(['\r', '\n'])) {
            break;
        }
    }
    Ok(())
}

fn dispatch(app: &mut App, line: &str) -> bool {
    let (cmd, rest) = match line.split_once(' ') {
        Some((cmd, rest)) => (cmd, rest),
        None => (line, ""),
    };
    match cmd {
        "q" | "quit" | "exit" => return false,
        "help" | "?" => print_help(),
        // Search terms are passed through verbatim, whitespace included.
        "search" => app.view.set_search_term(rest),
        "filter" => {
            let value = rest.trim_end();
            if value.is_empty() || value == "-" {
                app.view.set_category_filter(None);
            } else {
                app.view.set_category_filter(Some(value.to_string()));
            }
        }
        "sort" => match parse_sort_key(rest) {
            Some(key) => app.view.set_sort(key),
            None => println!("unknown sort key; try date/home/away/winner/conf"),
        },
        "teams" => app.show_teams(),
        "next" => app.show_next_game(),
        "compare" => {
            let mut parts = rest.split_whitespace();
            match (
                parts.next().and_then(|p| p.parse::<u32>().ok()),
                parts.next().and_then(|p| p.parse::<u32>().ok()),
            ) {
                (Some(a), Some(b)) => app.compare(a, b),
                _ => println!("usage: compare <team1-id> <team2-id>"),
            }
        }
        "export" => {
            let path = rest.trim();
            if path.is_empty() {
                println!("usage: export <path.xlsx>");
            } else {
                app.export(path);
            }
        }
        "sync" => app.sync(),
        "reload" => app.reload_history(),
        "show" => print_history_table(&app.view),
        "log" | "logs" => {
            for line in app.logs.iter().rev().take(10).collect::<Vec<_>>().into_iter().rev() {
                println!("{line}");
            }
        }
        "cats" | "categories" => {
            for team in app.view.unique_categories() {
                println!("{team}");
            }
        }
        "" => {}
        other => println!("unknown command: {other} (try help)"),
    }
    app.drain_view_events();
    true
}

fn print_help() {
    println!(
        "search <term> | filter <team|-> | sort date|home|away|winner|conf | show | cats\n\
         next | teams | compare <id1> <id2> | export <path.xlsx> | sync | reload | logs | quit"
    );
}

fn print_history_table(view: &HistoryView) {
    let direction = match view.direction() {
        SortDirection::Ascending => "asc",
        SortDirection::Descending => "desc",
    };
    let mut header = format!(
        "Historical predictions | sort: {} {direction}",
        sort_key_label(view.sort_key())
    );
    if !view.search_term().is_empty() {
        header.push_str(&format!(" | search: {:?}", view.search_term()));
    }
    if let Some(team) = view.category_filter() {
        header.push_str(&format!(" | team: {team}"));
    }
    println!("{header}");

    let visible = view.visible_records();
    if visible.is_empty() {
        println!("  no matching predictions");
        return;
    }
    println!(
        "  {:<17} {:<24} {:<24} {:<24} {:>6} {:>8}",
        "Date", "Home", "Away", "Predicted winner", "Conf", "Result"
    );
    for record in visible {
        println!(
            "  {:<17} {:<24} {:<24} {:<24} {:>6} {:>8}",
            format_timestamp(&record.timestamp),
            record.home_team.name,
            record.away_team.name,
            record.predicted_winner.name,
            format_confidence(record.confidence),
            result_cell(record),
        );
    }
}

fn result_cell(record: &PredictionRecord) -> &'static str {
    match record.is_correct {
        Some(true) => "hit",
        Some(false) => "miss",
        None => "-",
    }
}

fn print_next_game(bundle: &NextGameBundle) {
    let game = &bundle.game;
    println!(
        "Next game: {} vs {} on {} at {}",
        game.home_team.name, game.away_team.name, game.date, game.time
    );
    println!(
        "Predicted winner: {} | home win {:.1}% | confidence {}",
        bundle.prediction.predicted_winner.name,
        bundle.prediction.home_win_probability * 100.0,
        format_confidence(bundle.prediction.confidence)
    );
    println!(
        "  {:<18} {:>10} {:>10}",
        "Metric",
        game.home_team.short_label(),
        game.away_team.short_label()
    );
    for row in comparison_rows(bundle) {
        println!("  {:<18} {:>10} {:>10}", row.name, row.home, row.away);
    }
}

fn print_league_table(rows: &[(Team, TeamStats)]) {
    println!(
        "  {:>4} {:<26} {:>6} {:>6} {:>6} {:>6} {:>6}",
        "ID", "Team", "PPG", "FG%", "3P%", "APG", "RPG"
    );
    for (team, stats) in rows {
        println!(
            "  {:>4} {:<26} {:>6.1} {:>6.1} {:>6.1} {:>6.1} {:>6.1}",
            team.id,
            team.name,
            stats.points_per_game,
            stats.field_goal_percentage,
            stats.three_point_percentage,
            stats.assists_per_game,
            stats.rebounds_per_game,
        );
    }
}

fn print_accuracy(summary: &history_store::AccuracySummary) {
    println!(
        "Accuracy: {} of {} settled correct ({}) | {} stored | mean confidence {:.1}%",
        summary.correct,
        summary.settled,
        summary
            .accuracy()
            .map(|a| format!("{:.1}%", a * 100.0))
            .unwrap_or_else(|| "n/a".to_string()),
        summary.total,
        summary.mean_confidence * 100.0,
    );
}
