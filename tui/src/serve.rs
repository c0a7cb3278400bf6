//! Session Server
//!
//! Serves the catalog UI to remote terminals over TCP. Every accepted
//! connection gets its own [`App`] and therefore its own session: filter
//! text, cursor and selections are never shared between peers.
//!
//! # Connection lifecycle
//!
//! ```text
//!   accept ──► prelude ──► session loop ──► postlude ──► close
//!              (telnet      (bytes in,       (leave alt
//!               options,     frames out)      screen)
//!               alt screen,
//!               size query)
//! ```
//!
//! Frames are rendered through ratatui into an in-memory backend with a
//! fixed viewport; the bytes it produces are drained to the socket after
//! every draw. The peer's size comes from the xterm size report or telnet
//! NAWS, and falls back to the configured default.

use std::fmt;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use dashmap::DashMap;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::{Terminal, TerminalOptions};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn, Instrument};

use catalog_core::{CatalogConfig, ItemRepository, Viewport};

use crate::app::App;
use crate::input::{InputDecoder, SIZE_QUERY, TELNET_PRELUDE};
use crate::theme::Theme;

/// Sent to a peer that arrives while the server is full
pub const SERVER_FULL_MESSAGE: &str = "Server is full, try again later.\r\n";

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("connection I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Unique id for an accepted connection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Connection state tracking
struct ConnectionState {
    connected_at: Instant,
    peer: SocketAddr,
    abort_handle: tokio::task::AbortHandle,
}

/// Server settings, usually taken from [`CatalogConfig`]
#[derive(Clone, Debug)]
pub struct ServeSettings {
    pub listen: SocketAddr,
    pub max_sessions: usize,
    pub fetch_timeout: Duration,
    pub tick_interval: Duration,
    /// Used until the peer reports its size
    pub default_viewport: Viewport,
}

impl ServeSettings {
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self {
            listen: config.serve_listen,
            max_sessions: config.max_sessions,
            fetch_timeout: config.fetch_timeout,
            tick_interval: config.tick_interval,
            default_viewport: config.default_viewport,
        }
    }
}

/// Bind the listening socket for [`SessionServer::serve`]
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ServeError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })
}

/// Accepts connections and runs one session per peer
pub struct SessionServer<R: ItemRepository + 'static> {
    repository: Arc<R>,
    settings: ServeSettings,
    theme: Theme,
    connections: Arc<DashMap<ConnectionId, ConnectionState>>,
}

impl<R: ItemRepository + 'static> SessionServer<R> {
    pub fn new(repository: Arc<R>, settings: ServeSettings, theme: Theme) -> Self {
        Self {
            repository,
            settings,
            theme,
            connections: Arc::new(DashMap::new()),
        }
    }

    /// Number of sessions currently connected
    pub fn active_sessions(&self) -> usize {
        self.connections.len()
    }

    /// Accept connections until `shutdown` completes, then abort every
    /// session still running.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), ServeError>
    where
        F: Future<Output = ()>,
    {
        let local_addr = listener.local_addr()?;
        info!(
            addr = %local_addr,
            max_sessions = self.settings.max_sessions,
            "Session server listening"
        );

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => self.accept(stream, peer).await,
                    Err(e) => error!(error = %e, "Accept failed"),
                },
            }
        }

        self.shutdown();
        Ok(())
    }

    async fn accept(&self, mut stream: TcpStream, peer: SocketAddr) {
        if self.connections.len() >= self.settings.max_sessions {
            warn!(peer = %peer, "Session limit reached, rejecting connection");
            if let Err(e) = stream.write_all(SERVER_FULL_MESSAGE.as_bytes()).await {
                debug!(peer = %peer, error = %e, "Could not send rejection");
            }
            return;
        }

        let conn_id = ConnectionId::next();
        info!(
            conn_id = %conn_id,
            peer = %peer,
            active_sessions = self.connections.len() + 1,
            "New connection accepted"
        );

        // Held until the connection is registered, so the handler's own
        // cleanup always finds its entry
        let (registered_tx, registered_rx) = oneshot::channel::<()>();

        let connections = Arc::clone(&self.connections);
        let repository = Arc::clone(&self.repository);
        let settings = self.settings.clone();
        let theme = self.theme.clone();

        let task = tokio::spawn(
            async move {
                let _ = registered_rx.await;
                if let Err(e) = handle_connection(stream, repository, settings, theme).await {
                    warn!(error = %e, "Connection ended with error");
                }
                if let Some((_, state)) = connections.remove(&conn_id) {
                    info!(
                        peer = %state.peer,
                        duration_ms = state.connected_at.elapsed().as_millis() as u64,
                        active_sessions = connections.len(),
                        "Connection closed"
                    );
                }
            }
            .instrument(tracing::info_span!("connection", %conn_id)),
        );

        self.connections.insert(
            conn_id,
            ConnectionState {
                connected_at: Instant::now(),
                peer,
                abort_handle: task.abort_handle(),
            },
        );
        let _ = registered_tx.send(());
    }

    /// Abort every connection handler
    fn shutdown(&self) {
        let conn_ids: Vec<ConnectionId> = self.connections.iter().map(|r| *r.key()).collect();
        for conn_id in conn_ids {
            if let Some((_, state)) = self.connections.remove(&conn_id) {
                info!(conn_id = %conn_id, peer = %state.peer, "Aborting connection");
                state.abort_handle.abort();
            }
        }
    }
}

/// Run one session over `stream` until the peer quits or disconnects
async fn handle_connection<R: ItemRepository + 'static>(
    stream: TcpStream,
    repository: Arc<R>,
    settings: ServeSettings,
    theme: Theme,
) -> Result<(), ServeError> {
    let (mut reader, mut writer) = stream.into_split();

    let mut prelude = TELNET_PRELUDE.to_vec();
    crossterm::queue!(prelude, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
    prelude.extend_from_slice(SIZE_QUERY);
    writer.write_all(&prelude).await?;

    let mut viewport = settings.default_viewport;
    let mut terminal = Terminal::with_options(
        CrosstermBackend::new(Vec::<u8>::new()),
        TerminalOptions {
            viewport: ratatui::Viewport::Fixed(viewport_rect(viewport)),
        },
    )?;

    let mut app = App::new(
        repository,
        settings.fetch_timeout,
        settings.tick_interval,
        viewport,
        theme,
    );
    app.start();
    info!(session = %app.session().id(), "Session attached");

    let mut decoder = InputDecoder::new();
    let mut read_buf = vec![0u8; 1024];
    let mut ticker = tokio::time::interval(app.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    flush_frame(&app, &mut terminal, &mut viewport, &mut writer).await?;

    while app.is_running() {
        tokio::select! {
            biased;

            read = reader.read(&mut read_buf) => match read {
                Ok(0) => {
                    info!("Peer disconnected");
                    break;
                }
                Ok(n) => {
                    // One frame per decoded event
                    for event in decoder.feed(&read_buf[..n]) {
                        app.handle_event(event);
                        if !app.is_running() {
                            break;
                        }
                        flush_frame(&app, &mut terminal, &mut viewport, &mut writer).await?;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Read error");
                    break;
                }
            },

            Some(event) = app.next_fetch_event() => {
                app.handle_event(event);
                if app.is_running() {
                    flush_frame(&app, &mut terminal, &mut viewport, &mut writer).await?;
                }
            }

            _ = ticker.tick() => {
                app.on_tick();
                flush_frame(&app, &mut terminal, &mut viewport, &mut writer).await?;
            }
        }
    }

    app.shutdown();

    let mut postlude = Vec::new();
    crossterm::queue!(postlude, Clear(ClearType::All), Show, LeaveAlternateScreen)?;
    // The peer may already be gone
    let _ = writer.write_all(&postlude).await;
    let _ = writer.shutdown().await;
    Ok(())
}

/// Draw one frame and send the bytes ratatui produced
///
/// A changed viewport resizes the terminal first, which makes ratatui
/// repaint every cell.
async fn flush_frame<R: ItemRepository + 'static>(
    app: &App<R>,
    terminal: &mut Terminal<CrosstermBackend<Vec<u8>>>,
    viewport: &mut Viewport,
    writer: &mut OwnedWriteHalf,
) -> Result<(), ServeError> {
    let current = app.session().viewport();
    if current != *viewport {
        debug!(width = current.width, height = current.height, "Peer resized");
        *viewport = current;
        terminal.resize(viewport_rect(current))?;
    }

    app.draw(terminal)?;
    let bytes = std::mem::take(terminal.backend_mut().writer_mut());
    if !bytes.is_empty() {
        writer.write_all(&bytes).await?;
    }
    Ok(())
}

fn viewport_rect(viewport: Viewport) -> Rect {
    Rect::new(0, 0, viewport.width, viewport.height)
}
