use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::state::{ErrorKind, FetchCause, FetchState};

/// A zero-argument remote operation producing one typed result.
pub type Fetcher<T> = Box<dyn FnOnce() -> Result<T, ErrorKind> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    Loading,
    Resolved,
    Discarded,
}

/// Runs every fetcher on its own thread and collects results back in fetcher
/// order. The first failure wins: the error is returned immediately and any
/// results still in flight are dropped, not cancelled.
pub fn run_independent<I: Send + 'static>(fetchers: Vec<Fetcher<I>>) -> Result<Vec<I>, ErrorKind> {
    let total = fetchers.len();
    let (tx, rx) = channel();
    for (idx, fetcher) in fetchers.into_iter().enumerate() {
        let tx = tx.clone();
        thread::spawn(move || {
            let _ = tx.send((idx, fetcher()));
        });
    }
    drop(tx);

    let mut slots: Vec<Option<I>> = (0..total).map(|_| None).collect();
    let mut filled = 0usize;
    while filled < total {
        let Ok((idx, outcome)) = rx.recv() else {
            // A fetcher thread died without reporting.
            return Err(ErrorKind::FetchFailed(FetchCause::NoResponse(
                "fetcher exited without a result".to_string(),
            )));
        };
        match outcome {
            Ok(value) => {
                if slots[idx].replace(value).is_none() {
                    filled += 1;
                }
            }
            Err(err) => return Err(err),
        }
    }
    Ok(slots.into_iter().flatten().collect())
}

/// The dependent stage: runs only once every independent fetch has
/// succeeded, with the full result set in hand.
pub fn run_dependent<I, U>(
    prior: &[I],
    fetch: impl FnOnce(&[I]) -> Result<U, ErrorKind>,
) -> Result<U, ErrorKind> {
    fetch(prior)
}

/// State machine around one logical load. `load` flips the state to
/// `Loading` before returning and runs the job on a background thread; if a
/// newer load starts before the job resolves, the stale result is discarded
/// when it finally arrives (last invocation wins).
pub struct FetchPipeline<T> {
    state: Arc<Mutex<FetchState<T>>>,
    token: Arc<AtomicU64>,
    subscribers: Arc<Mutex<Vec<Sender<PipelineEvent>>>>,
}

impl<T: Send + 'static> FetchPipeline<T> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FetchState::Idle)),
            token: Arc::new(AtomicU64::new(0)),
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn state(&self) -> FetchState<T>
    where
        T: Clone,
    {
        self.state
            .lock()
            .expect("pipeline state lock poisoned")
            .clone()
    }

    pub fn subscribe(&self) -> Receiver<PipelineEvent> {
        let (tx, rx) = channel();
        self.subscribers
            .lock()
            .expect("pipeline subscribers lock poisoned")
            .push(tx);
        rx
    }

    pub fn load<F>(&self, job: F) -> thread::JoinHandle<()>
    where
        F: FnOnce() -> Result<T, ErrorKind> + Send + 'static,
    {
        let token = self.token.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.lock().expect("pipeline state lock poisoned");
            *state = FetchState::Loading;
        }
        notify_all(&self.subscribers, PipelineEvent::Loading);

        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.token);
        let subscribers = Arc::clone(&self.subscribers);
        thread::spawn(move || {
            let outcome = job();
            let mut guard = state.lock().expect("pipeline state lock poisoned");
            if current.load(Ordering::SeqCst) != token {
                drop(guard);
                notify_all(&subscribers, PipelineEvent::Discarded);
                return;
            }
            *guard = match outcome {
                Ok(value) => FetchState::Success(value),
                Err(err) => FetchState::Failure(err),
            };
            drop(guard);
            notify_all(&subscribers, PipelineEvent::Resolved);
        })
    }
}

impl<T: Send + 'static> Default for FetchPipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn notify_all(subscribers: &Arc<Mutex<Vec<Sender<PipelineEvent>>>>, event: PipelineEvent) {
    let mut guard = subscribers
        .lock()
        .expect("pipeline subscribers lock poisoned");
    guard.retain(|tx| tx.send(event).is_ok());
}
