//! Running the engine on a dedicated worker thread

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver};
use fancycrack_keyspace::{KeyspaceSize, SourceKind};
use serde::Serialize;
use tracing::{debug, info};

use crate::control::{CancellationToken, Throttle};
use crate::progress::ProgressSample;
use crate::search::{CrackEngine, CrackRequest, Outcome, SearchEvent};

/// Events buffered before the worker waits on the caller
pub const EVENT_CAPACITY: usize = 1024;

/// Owned event sent from the worker to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CrackEvent {
    Started { kind: SourceKind, total: KeyspaceSize },
    Attempt { candidate: String, tried: u64 },
    Progress(ProgressSample),
    /// Always the last event of a job
    Finished(Outcome),
}

/// Handle to a search running on its own thread
///
/// Dropping the handle cancels the search.
pub struct CrackHandle {
    events: Receiver<CrackEvent>,
    token: CancellationToken,
    throttle: Throttle,
    thread: Option<JoinHandle<Outcome>>,
}

impl CrackHandle {
    /// Start `request` on a new worker thread
    pub fn spawn(engine: Arc<CrackEngine>, request: CrackRequest) -> io::Result<Self> {
        let (tx, rx) = bounded(EVENT_CAPACITY);
        let token = CancellationToken::new();
        let throttle = engine.throttle();
        let forward_attempts = engine.config().forward_attempts;

        let worker_token = token.clone();
        let thread = thread::Builder::new()
            .name("fancycrack-search".to_string())
            .spawn(move || {
                let outcome = engine.run(&request, &worker_token, |event| {
                    let owned = match event {
                        SearchEvent::Started { kind, total } => {
                            CrackEvent::Started { kind, total }
                        }
                        SearchEvent::Attempt { candidate, tried } => {
                            if !forward_attempts {
                                return;
                            }
                            CrackEvent::Attempt {
                                candidate: candidate.to_string(),
                                tried,
                            }
                        }
                        SearchEvent::Progress(sample) => CrackEvent::Progress(sample.clone()),
                    };
                    if tx.send(owned).is_err() {
                        debug!("event receiver gone, cancelling search");
                        worker_token.cancel();
                    }
                });
                let _ = tx.send(CrackEvent::Finished(outcome.clone()));
                outcome
            })?;

        info!("search job spawned");
        Ok(Self {
            events: rx,
            token,
            throttle,
            thread: Some(thread),
        })
    }

    /// Event stream; disconnects after [`CrackEvent::Finished`]
    pub fn events(&self) -> &Receiver<CrackEvent> {
        &self.events
    }

    /// Ask the worker to stop at the next candidate boundary
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Token that cancels this job, for handing to other tasks
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Change the per-attempt delay while the job runs
    pub fn set_delay_ms(&self, delay_ms: u64) {
        self.throttle.set_delay_ms(delay_ms);
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the worker and return its outcome
    ///
    /// Unread events are discarded so a full channel cannot stall the worker.
    pub fn join(mut self) -> Outcome {
        for _ in self.events.iter() {}
        match self.thread.take() {
            Some(thread) => thread.join().unwrap_or_else(|_| Outcome::Failed {
                message: "search thread panicked".to_string(),
            }),
            None => Outcome::Failed {
                message: "search thread already joined".to_string(),
            },
        }
    }
}

impl Drop for CrackHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.token.cancel();
        }
    }
}
