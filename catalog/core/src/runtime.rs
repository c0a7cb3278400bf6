//! Session Runtime
//!
//! Executes the commands a [`Session`] emits. Fetches run on spawned tasks so
//! the render loop never waits on the network; their outcomes come back over
//! a channel and are handed to the session as ordinary events.
//!
//! Each fetch is tagged with a generation. Only the outcome of the most
//! recent fetch is delivered; anything older is discarded. Ending the
//! session aborts whatever is still in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::commands::SessionCommand;
use crate::events::SessionEvent;
use crate::item::Item;
use crate::repository::{FetchError, ItemRepository};
use crate::session::{Session, Viewport};

/// Result of one spawned fetch
#[derive(Debug)]
struct FetchOutcome {
    generation: u64,
    result: Result<Vec<Item>, FetchError>,
}

/// Drives one [`Session`] against an [`ItemRepository`]
pub struct SessionRuntime<R: ItemRepository + 'static> {
    session: Session,
    repository: Arc<R>,
    fetch_timeout: Duration,

    outcome_tx: mpsc::UnboundedSender<FetchOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<FetchOutcome>,

    /// Generation of the most recently spawned fetch
    generation: u64,
    in_flight: Option<AbortHandle>,
}

impl<R: ItemRepository + 'static> SessionRuntime<R> {
    pub fn new(repository: Arc<R>, fetch_timeout: Duration, viewport: Viewport) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(viewport),
            repository,
            fetch_timeout,
            outcome_tx,
            outcome_rx,
            generation: 0,
            in_flight: None,
        }
    }

    /// Start the session. Must be called from within a tokio runtime.
    pub fn start(&mut self) -> bool {
        let commands = self.session.start();
        self.execute(commands)
    }

    /// Feed one event to the session and carry out its commands.
    ///
    /// Returns `false` once the session has ended.
    pub fn dispatch(&mut self, event: SessionEvent) -> bool {
        tracing::trace!(session = %self.session.id(), kind = event.kind(), "Dispatching event");
        let commands = self.session.handle_event(event);
        self.execute(commands)
    }

    /// Wait for the current fetch to finish and return it as an event.
    ///
    /// Cancel-safe: dropping the future loses nothing. Stale outcomes are
    /// skipped. Pends forever while no fetch is running, which makes it a
    /// good `select!` branch.
    pub async fn next_fetch_event(&mut self) -> Option<SessionEvent> {
        loop {
            let outcome = self.outcome_rx.recv().await?;
            if let Some(event) = self.accept(outcome) {
                return Some(event);
            }
        }
    }

    /// Non-blocking variant of [`Self::next_fetch_event`]
    pub fn try_fetch_event(&mut self) -> Option<SessionEvent> {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            if let Some(event) = self.accept(outcome) {
                return Some(event);
            }
        }
        None
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_ended(&self) -> bool {
        self.session.is_ended()
    }

    /// Abort in-flight work; any outcome that still arrives is discarded
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            tracing::debug!(session = %self.session.id(), "Aborting in-flight fetch");
            handle.abort();
        }
        self.generation += 1;
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn execute(&mut self, commands: Vec<SessionCommand>) -> bool {
        let mut alive = true;
        for command in commands {
            match command {
                SessionCommand::Fetch => self.spawn_fetch(),
                SessionCommand::Quit => {
                    self.shutdown();
                    alive = false;
                }
            }
        }
        alive
    }

    fn spawn_fetch(&mut self) {
        // A newer fetch supersedes the old one
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }

        self.generation += 1;
        let generation = self.generation;
        let repository = Arc::clone(&self.repository);
        let timeout = self.fetch_timeout;
        let tx = self.outcome_tx.clone();
        let session_id = self.session.id().clone();

        tracing::debug!(
            session = %session_id,
            repository = repository.name(),
            generation,
            "Spawning catalog fetch"
        );

        let task = tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, repository.fetch()).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::ConnectionFailed(format!(
                    "timed out after {}ms",
                    timeout.as_millis()
                ))),
            };

            // Receiver gone means the session ended
            if tx.send(FetchOutcome { generation, result }).is_err() {
                tracing::debug!(session = %session_id, "Fetch finished after session ended");
            }
        });

        self.in_flight = Some(task.abort_handle());
    }

    fn accept(&mut self, outcome: FetchOutcome) -> Option<SessionEvent> {
        if outcome.generation != self.generation {
            tracing::debug!(
                session = %self.session.id(),
                stale = outcome.generation,
                current = self.generation,
                "Discarding stale fetch outcome"
            );
            return None;
        }

        self.in_flight = None;
        Some(match outcome.result {
            Ok(items) => SessionEvent::FetchSucceeded(items),
            Err(error) => SessionEvent::FetchFailed(error),
        })
    }
}

impl<R: ItemRepository + 'static> Drop for SessionRuntime<R> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
