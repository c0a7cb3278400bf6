//! Main Application
//!
//! The App owns one catalog session and drives it:
//! - Terminal events (keys, resize) become session events
//! - Fetch outcomes from the runtime become session events
//! - A fixed tick advances the spinner
//!
//! After every wakeup the session is rendered to a fresh buffer and copied
//! onto the terminal. The same App runs behind the local terminal and behind
//! each served connection; only the event source and backend differ.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::Event;
use futures::{Stream, StreamExt};
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::Terminal;
use tokio::time::MissedTickBehavior;

use catalog_core::{ItemRepository, Session, SessionEvent, SessionRuntime, Viewport};

use crate::input::map_terminal_event;
use crate::render::render;
use crate::theme::Theme;

/// One running catalog session plus its presentation state
pub struct App<R: ItemRepository + 'static> {
    runtime: SessionRuntime<R>,
    theme: Theme,
    /// Animation counter, advanced by ticks only
    tick: u64,
    tick_interval: Duration,
    running: bool,
}

impl<R: ItemRepository + 'static> App<R> {
    pub fn new(
        repository: Arc<R>,
        fetch_timeout: Duration,
        tick_interval: Duration,
        viewport: Viewport,
        theme: Theme,
    ) -> Self {
        Self {
            runtime: SessionRuntime::new(repository, fetch_timeout, viewport),
            theme,
            tick: 0,
            tick_interval,
            running: true,
        }
    }

    /// Start the session; kicks off the first fetch
    pub fn start(&mut self) {
        tracing::info!(session = %self.runtime.session().id(), "Session started");
        self.running = self.runtime.start();
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        if !self.runtime.dispatch(event) {
            let session = self.runtime.session();
            tracing::info!(
                session = %session.id(),
                mode = session.mode().description(),
                "Session ended"
            );
            self.running = false;
        }
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Wait for the next fetch outcome (cancel-safe)
    pub async fn next_fetch_event(&mut self) -> Option<SessionEvent> {
        self.runtime.next_fetch_event().await
    }

    /// Render the current state
    pub fn frame(&self) -> Buffer {
        render(self.runtime.session(), &self.theme, self.tick)
    }

    /// Render and copy the frame onto `terminal`
    pub fn draw<B: Backend>(&self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let output = self.frame();

        terminal.draw(|frame| {
            let area = frame.area();
            let buf = frame.buffer_mut();

            for y in 0..area.height.min(output.area.height) {
                for x in 0..area.width.min(output.area.width) {
                    buf[(area.x + x, area.y + y)] = output[(x, y)].clone();
                }
            }
        })?;

        Ok(())
    }

    /// Main event loop for a terminal that produces crossterm events
    ///
    /// Returns when the session quits or the event stream ends.
    pub async fn run<B, S>(&mut self, terminal: &mut Terminal<B>, events: &mut S) -> anyhow::Result<()>
    where
        B: Backend,
        S: Stream<Item = io::Result<Event>> + Unpin,
    {
        self.start();

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Render initial frame immediately so the user sees the spinner
        self.draw(terminal)?;

        while self.running {
            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(event)) => {
                        if let Some(event) = map_terminal_event(&event) {
                            self.handle_event(event);
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Terminal event error");
                    }
                    None => {
                        tracing::info!("Terminal event stream closed");
                        self.running = false;
                    }
                },

                Some(event) = self.runtime.next_fetch_event() => {
                    self.handle_event(event);
                }

                _ = ticker.tick() => self.on_tick(),
            }

            if self.running {
                self.draw(terminal)?;
            }
        }

        self.shutdown();
        Ok(())
    }

    pub fn session(&self) -> &Session {
        self.runtime.session()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Stop the session and abort any in-flight fetch
    pub fn shutdown(&mut self) {
        self.running = false;
        self.runtime.shutdown();
    }
}
