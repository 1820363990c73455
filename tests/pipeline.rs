use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;

use courtside_terminal::pipeline::{
    FetchPipeline, Fetcher, PipelineEvent, run_dependent, run_independent,
};
use courtside_terminal::state::{ErrorKind, FetchCause, FetchState};

fn ok_fetcher(value: i32) -> Fetcher<i32> {
    Box::new(move || Ok(value))
}

fn no_response(msg: &str) -> ErrorKind {
    ErrorKind::FetchFailed(FetchCause::NoResponse(msg.to_string()))
}

#[test]
fn independent_results_come_back_in_fetcher_order() {
    let values = run_independent(vec![ok_fetcher(10), ok_fetcher(20), ok_fetcher(30)])
        .expect("all fetchers succeed");
    assert_eq!(values, vec![10, 20, 30]);
}

#[test]
fn three_fetchers_and_a_dependent_sum_resolve_to_success() {
    let pipeline: FetchPipeline<i32> = FetchPipeline::new();
    let handle = pipeline.load(|| {
        let parts = run_independent(vec![ok_fetcher(1), ok_fetcher(2), ok_fetcher(3)])?;
        run_dependent(&parts, |prior| Ok(prior.iter().sum()))
    });
    handle.join().expect("load thread");

    assert_eq!(pipeline.state(), FetchState::Success(6));
}

#[test]
fn first_failure_wins_and_dependent_never_runs() {
    let dependent_ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&dependent_ran);

    let pipeline: FetchPipeline<i32> = FetchPipeline::new();
    let handle = pipeline.load(move || {
        let fetchers: Vec<Fetcher<i32>> = vec![
            ok_fetcher(1),
            Box::new(|| Err(no_response("connection refused"))),
        ];
        let parts = run_independent(fetchers)?;
        run_dependent(&parts, |prior| {
            flag.store(true, Ordering::SeqCst);
            Ok(prior.iter().sum())
        })
    });
    handle.join().expect("load thread");

    assert_eq!(
        pipeline.state(),
        FetchState::Failure(no_response("connection refused"))
    );
    assert!(!dependent_ran.load(Ordering::SeqCst));
}

#[test]
fn failure_returns_before_slow_fetchers_finish() {
    let (release_tx, release_rx) = channel::<()>();
    let fetchers: Vec<Fetcher<i32>> = vec![
        Box::new(move || {
            // Held open until the test releases it.
            let _ = release_rx.recv();
            Ok(1)
        }),
        Box::new(|| Err(no_response("timed out"))),
    ];

    let outcome = run_independent(fetchers);
    assert_eq!(outcome, Err(no_response("timed out")));
    // The slow fetcher is still parked; its eventual result is discarded.
    release_tx.send(()).expect("release slow fetcher");
}

#[test]
fn load_flips_to_loading_before_the_job_resolves() {
    let (release_tx, release_rx) = channel::<()>();
    let pipeline: FetchPipeline<i32> = FetchPipeline::new();
    assert_eq!(pipeline.state(), FetchState::Idle);

    let handle = pipeline.load(move || {
        let _ = release_rx.recv();
        Ok(5)
    });
    assert_eq!(pipeline.state(), FetchState::Loading);

    release_tx.send(()).expect("release job");
    handle.join().expect("load thread");
    assert_eq!(pipeline.state(), FetchState::Success(5));
}

#[test]
fn a_newer_load_discards_the_stale_result() {
    let (release_tx, release_rx) = channel::<()>();
    let pipeline: FetchPipeline<i32> = FetchPipeline::new();
    let events = pipeline.subscribe();

    let first = pipeline.load(move || {
        let _ = release_rx.recv();
        Ok(1)
    });
    let second = pipeline.load(|| Ok(2));
    second.join().expect("second load thread");
    assert_eq!(pipeline.state(), FetchState::Success(2));

    // Let the superseded job resolve; its result must be dropped.
    release_tx.send(()).expect("release first job");
    first.join().expect("first load thread");
    assert_eq!(pipeline.state(), FetchState::Success(2));

    let seen: Vec<PipelineEvent> = events.try_iter().collect();
    assert_eq!(
        seen,
        vec![
            PipelineEvent::Loading,
            PipelineEvent::Loading,
            PipelineEvent::Resolved,
            PipelineEvent::Discarded,
        ]
    );
}

#[test]
fn reload_after_failure_restarts_at_loading() {
    let pipeline: FetchPipeline<i32> = FetchPipeline::new();
    pipeline
        .load(|| Err(no_response("backend down")))
        .join()
        .expect("first load");
    assert!(pipeline.state().failure().is_some());

    let (release_tx, release_rx) = channel::<()>();
    let handle = pipeline.load(move || {
        let _ = release_rx.recv();
        Ok(9)
    });
    assert_eq!(pipeline.state(), FetchState::Loading);
    release_tx.send(()).expect("release job");
    handle.join().expect("second load");
    assert_eq!(pipeline.state(), FetchState::Success(9));
}
