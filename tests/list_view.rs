use courtside_terminal::history_view::{HistorySortKey, new_history_view};
use courtside_terminal::list_view::{ListView, SortDirection, ViewChange};
use courtside_terminal::state::{PredictionRecord, Team};

fn record(id: u64, ts: &str, home: &str, away: &str, winner_home: bool, conf: f64) -> PredictionRecord {
    let home = Team::new(id as u32 * 2, home, "");
    let away = Team::new(id as u32 * 2 + 1, away, "");
    PredictionRecord {
        id,
        timestamp: ts.to_string(),
        home_team: home.clone(),
        away_team: away.clone(),
        home_win_probability: 0.5,
        predicted_winner: if winner_home { home } else { away },
        confidence: conf,
        actual_winner: None,
        is_correct: None,
    }
}

fn sample_records() -> Vec<PredictionRecord> {
    vec![
        record(1, "2024-02-20T19:30:00", "Los Angeles Lakers", "Boston Celtics", true, 0.8),
        record(2, "2024-02-19T19:00:00", "Boston Celtics", "New York Knicks", false, 0.6),
        record(3, "2024-02-21T20:00:00", "Denver Nuggets", "Portland Trail Blazers", true, 0.8),
        record(4, "2024-02-18T18:00:00", "Golden State Warriors", "Los Angeles Lakers", false, 0.6),
    ]
}

fn view_with(records: Vec<PredictionRecord>) -> ListView<PredictionRecord> {
    let mut view = ListView::new(HistorySortKey::Date);
    view.set_records(records);
    view
}

#[test]
fn every_visible_record_matches_the_search_term() {
    let mut view = view_with(sample_records());
    view.set_search_term("lakers");

    let visible = view.visible_records();
    assert_eq!(visible.len(), 2);
    for record in visible {
        let hit = record.home_team.name.to_lowercase().contains("lakers")
            || record.away_team.name.to_lowercase().contains("lakers")
            || record.predicted_winner.name.to_lowercase().contains("lakers");
        assert!(hit);
    }
}

#[test]
fn empty_search_keeps_everything() {
    let view = view_with(sample_records());
    assert_eq!(view.visible_records().len(), 4);
}

#[test]
fn whitespace_search_term_is_a_real_term() {
    let mut view = view_with(sample_records());
    view.set_search_term(" ");

    // Only multi-word team names contain a space.
    let visible = view.visible_records();
    assert!(!visible.is_empty());
    assert!(visible.iter().all(|r| {
        r.home_team.name.contains(' ')
            || r.away_team.name.contains(' ')
            || r.predicted_winner.name.contains(' ')
    }));

    view.set_search_term("   zz   ");
    assert!(view.visible_records().is_empty());
}

#[test]
fn category_filter_requires_participation() {
    let mut view = view_with(sample_records());
    view.set_category_filter(Some("Boston Celtics".to_string()));

    let visible = view.visible_records();
    assert_eq!(visible.len(), 2);
    for record in visible {
        assert!(
            record.home_team.name == "Boston Celtics" || record.away_team.name == "Boston Celtics"
        );
    }
}

#[test]
fn unique_categories_ignore_active_filters() {
    let mut view = view_with(sample_records());
    let before = view.unique_categories();

    view.set_search_term("nuggets");
    view.set_category_filter(Some("Denver Nuggets".to_string()));
    let after = view.unique_categories();

    assert_eq!(before, after);
    // Sorted and deduplicated over both home and away names.
    assert_eq!(
        before,
        vec![
            "Boston Celtics",
            "Denver Nuggets",
            "Golden State Warriors",
            "Los Angeles Lakers",
            "New York Knicks",
            "Portland Trail Blazers",
        ]
    );
}

#[test]
fn date_ascending_puts_earlier_games_first() {
    let mut view = ListView::new(HistorySortKey::HomeTeam);
    view.set_records(vec![
        record(1, "2024-02-20", "Los Angeles Lakers", "Boston Celtics", true, 0.8),
        record(2, "2024-02-19", "Boston Celtics", "Los Angeles Lakers", true, 0.7),
    ]);
    view.set_sort(HistorySortKey::Date);

    let visible = view.visible_records();
    assert_eq!(visible[0].home_team.name, "Boston Celtics");
    assert_eq!(visible[1].home_team.name, "Los Angeles Lakers");
}

#[test]
fn ties_keep_input_order_in_both_directions() {
    let mut view = view_with(sample_records());

    view.set_sort(HistorySortKey::Confidence); // new key starts ascending
    let asc: Vec<u64> = view.visible_records().iter().map(|r| r.id).collect();
    // 0.6 ties (ids 2, 4) and 0.8 ties (ids 1, 3) stay in input order.
    assert_eq!(asc, vec![2, 4, 1, 3]);

    view.set_sort(HistorySortKey::Confidence); // toggle to descending
    let desc: Vec<u64> = view.visible_records().iter().map(|r| r.id).collect();
    assert_eq!(desc, vec![1, 3, 2, 4]);
}

#[test]
fn toggling_sort_twice_restores_the_original_order() {
    let mut view = view_with(sample_records());
    view.set_sort(HistorySortKey::Confidence);
    let original: Vec<u64> = view.visible_records().iter().map(|r| r.id).collect();
    let direction = view.direction();

    view.set_sort(HistorySortKey::Confidence);
    view.set_sort(HistorySortKey::Confidence);

    assert_eq!(view.direction(), direction);
    let round_trip: Vec<u64> = view.visible_records().iter().map(|r| r.id).collect();
    assert_eq!(round_trip, original);
}

#[test]
fn switching_keys_resets_to_ascending() {
    let mut view = view_with(sample_records());
    view.set_sort(HistorySortKey::Confidence);
    view.set_sort(HistorySortKey::Confidence);
    assert_eq!(view.direction(), SortDirection::Descending);

    view.set_sort(HistorySortKey::Winner);
    assert_eq!(view.direction(), SortDirection::Ascending);
    assert_eq!(view.sort_key(), HistorySortKey::Winner);
}

#[test]
fn empty_records_produce_empty_views() {
    let view: ListView<PredictionRecord> = ListView::new(HistorySortKey::Date);
    assert!(view.visible_records().is_empty());
    assert!(view.unique_categories().is_empty());
}

#[test]
fn default_history_view_is_newest_first() {
    let mut view = new_history_view();
    view.set_records(sample_records());
    assert_eq!(view.sort_key(), HistorySortKey::Date);
    assert_eq!(view.direction(), SortDirection::Descending);

    let visible = view.visible_records();
    assert_eq!(visible[0].id, 3);
    assert_eq!(visible.last().unwrap().id, 4);
}

#[test]
fn every_transition_notifies_subscribers() {
    let mut view: ListView<PredictionRecord> = ListView::new(HistorySortKey::Date);
    let events = view.subscribe();

    view.set_records(sample_records());
    view.set_search_term("lakers");
    view.set_category_filter(None);
    view.set_sort(HistorySortKey::Winner);

    let seen: Vec<ViewChange> = events.try_iter().collect();
    assert_eq!(
        seen,
        vec![
            ViewChange::Records,
            ViewChange::Search,
            ViewChange::Category,
            ViewChange::Sort,
        ]
    );
}
