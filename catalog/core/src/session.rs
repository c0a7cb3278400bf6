//! Session State Machine
//!
//! One [`Session`] per connected user. It owns the list view, the selection
//! set and the data state, and changes only in response to a
//! [`SessionEvent`]. Side effects are returned as [`SessionCommand`]s.
//!
//! ```text
//!            start()
//!               │
//!               ▼
//!          ┌─────────┐  FetchSucceeded  ┌───────┐
//!          │ Loading ├─────────────────►│ Ready │
//!          └──┬───▲──┘                  └───┬───┘
//!  FetchFailed│   │ r (refresh)             │ r (refresh)
//!             ▼   │                         │
//!          ┌──────┴──┐◄─────────────────────┘
//!          │ Failed  │   (refresh returns to Loading)
//!          └─────────┘
//! ```
//!
//! Event priority, first match wins:
//! 1. `Resize` stores the dimensions
//! 2. `FetchSucceeded` while loading moves to `Ready`
//! 3. `FetchFailed` while loading moves to `Failed`
//! 4. Keys while entering filter text edit the filter
//! 5. Keys while browsing navigate, toggle, refresh or quit
//!
//! Anything else is dropped.

use crate::commands::SessionCommand;
use crate::events::{KeyInput, SessionEvent};
use crate::item::{Item, ItemId};
use crate::list_view::ListView;
use crate::repository::FetchError;
use crate::selection::SelectionSet;

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(format!("session_{}", uuid::Uuid::new_v4().simple()))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Data state of a session
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionMode {
    /// Waiting for a fetch to finish
    #[default]
    Loading,
    /// Catalog available; navigation, filtering and toggling allowed
    Ready,
    /// Last fetch failed; only quit and refresh are accepted
    Failed(FetchError),
}

impl SessionMode {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Loading => "Loading...",
            Self::Ready => "Ready",
            Self::Failed(_) => "Failed",
        }
    }
}

/// Last reported size of the rendering surface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

/// Per-user browsing session
#[derive(Clone, Debug)]
pub struct Session {
    id: SessionId,
    mode: SessionMode,
    list: ListView,
    selection: SelectionSet,
    viewport: Viewport,
    /// Set after the first successful fetch
    has_loaded: bool,
    ended: bool,
}

impl Session {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            id: SessionId::new(),
            mode: SessionMode::Loading,
            list: ListView::new(),
            selection: SelectionSet::new(),
            viewport,
            has_loaded: false,
            ended: false,
        }
    }

    /// Begin the session; the caller must execute the returned fetch
    pub fn start(&mut self) -> Vec<SessionCommand> {
        tracing::debug!(session = %self.id, "Session started");
        self.mode = SessionMode::Loading;
        vec![SessionCommand::Fetch]
    }

    /// Apply one event and return the side effects it requests
    pub fn handle_event(&mut self, event: SessionEvent) -> Vec<SessionCommand> {
        if self.ended {
            return Vec::new();
        }

        match event {
            SessionEvent::Resize { width, height } => {
                self.viewport = Viewport::new(width, height);
                Vec::new()
            }
            SessionEvent::FetchSucceeded(items) => {
                self.on_fetch_succeeded(items);
                Vec::new()
            }
            SessionEvent::FetchFailed(error) => {
                self.on_fetch_failed(error);
                Vec::new()
            }
            SessionEvent::Key(key) => self.handle_key(key),
        }
    }

    // =========================================================================
    // Fetch outcomes
    // =========================================================================

    fn on_fetch_succeeded(&mut self, items: Vec<Item>) {
        if self.mode != SessionMode::Loading {
            tracing::debug!(session = %self.id, "Dropping fetch result outside Loading");
            return;
        }

        tracing::info!(session = %self.id, count = items.len(), "Catalog loaded");
        self.list.set_items(items);
        if !self.has_loaded {
            self.list.focus_first();
            self.has_loaded = true;
        }
        self.mode = SessionMode::Ready;
    }

    fn on_fetch_failed(&mut self, error: FetchError) {
        if self.mode != SessionMode::Loading {
            tracing::debug!(session = %self.id, "Dropping fetch failure outside Loading");
            return;
        }

        tracing::warn!(session = %self.id, error = %error, "Catalog fetch failed");
        self.mode = SessionMode::Failed(error);
    }

    // =========================================================================
    // Keys
    // =========================================================================

    fn handle_key(&mut self, key: KeyInput) -> Vec<SessionCommand> {
        if key == KeyInput::Interrupt {
            return self.quit();
        }

        match self.mode {
            SessionMode::Loading => match key {
                KeyInput::Char('q') => self.quit(),
                _ => Vec::new(),
            },
            SessionMode::Failed(_) => match key {
                KeyInput::Char('q') => self.quit(),
                KeyInput::Char('r') => self.refresh(),
                _ => Vec::new(),
            },
            SessionMode::Ready if self.list.is_filtering() => {
                self.handle_filter_key(key);
                Vec::new()
            }
            SessionMode::Ready => self.handle_browse_key(key),
        }
    }

    /// While entering filter text the list gets every key; no navigation
    fn handle_filter_key(&mut self, key: KeyInput) {
        match key {
            KeyInput::Char(c) => self.list.push_filter_char(c),
            KeyInput::Space => self.list.push_filter_char(' '),
            KeyInput::Backspace => self.list.pop_filter_char(),
            KeyInput::Enter => self.list.accept_filter(),
            KeyInput::Esc => self.list.cancel_filter(),
            _ => {}
        }
    }

    fn handle_browse_key(&mut self, key: KeyInput) -> Vec<SessionCommand> {
        match key {
            KeyInput::Up | KeyInput::Char('k') => self.list.move_cursor(-1),
            KeyInput::Down | KeyInput::Char('j') => self.list.move_cursor(1),
            KeyInput::Enter | KeyInput::Space => self.toggle_current(),
            KeyInput::Char('/') => self.list.begin_filter(),
            KeyInput::Esc => self.list.clear_filter(),
            KeyInput::Char('r') => return self.refresh(),
            KeyInput::Char('q') => return self.quit(),
            _ => {}
        }
        Vec::new()
    }

    fn toggle_current(&mut self) {
        if let Some(id) = self.list.current_item().map(|item| item.id.clone()) {
            let selected = self.selection.toggle(&id);
            tracing::debug!(session = %self.id, item = %id, selected, "Toggled item");
        }
    }

    fn refresh(&mut self) -> Vec<SessionCommand> {
        tracing::info!(session = %self.id, "Refreshing catalog");
        self.mode = SessionMode::Loading;
        vec![SessionCommand::Fetch]
    }

    fn quit(&mut self) -> Vec<SessionCommand> {
        tracing::debug!(session = %self.id, "Session quit requested");
        self.ended = true;
        vec![SessionCommand::Quit]
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn list(&self) -> &ListView {
        &self.list
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_selected(&self, id: &ItemId) -> bool {
        self.selection.contains(id)
    }

    pub fn current_item(&self) -> Option<&Item> {
        self.list.current_item()
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list_view::InputMode;
    use pretty_assertions::assert_eq;

    fn item(id: &str, name: &str) -> Item {
        Item {
            id: ItemId::new(id),
            name: name.to_string(),
            origin: "Origin".to_string(),
            roast: "Medium".to_string(),
            price: 12.0,
            description: "Tasty".to_string(),
        }
    }

    fn menu() -> Vec<Item> {
        vec![
            item("1", "Midnight Blend"),
            item("2", "Golden Hour"),
            item("3", "Velvet Espresso"),
            item("4", "Cloud Nine"),
        ]
    }

    fn ready_session() -> Session {
        let mut session = Session::default();
        session.start();
        session.handle_event(SessionEvent::FetchSucceeded(menu()));
        session
    }

    #[test]
    fn test_mode_description_follows_transitions() {
        let mut session = Session::default();
        session.start();
        assert_eq!(session.mode().description(), "Loading...");

        session.handle_event(SessionEvent::FetchFailed(FetchError::ConnectionFailed(
            "timed out".to_string(),
        )));
        assert_eq!(session.mode().description(), "Failed");

        assert_eq!(ready_session().mode().description(), "Ready");
    }

    fn key(session: &mut Session, key: KeyInput) -> Vec<SessionCommand> {
        session.handle_event(SessionEvent::Key(key))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    #[test]
    fn test_start_requests_fetch() {
        let mut session = Session::default();
        assert_eq!(session.start(), vec![SessionCommand::Fetch]);
        assert_eq!(session.mode(), &SessionMode::Loading);
    }

    #[test]
    fn test_first_success_focuses_first_item() {
        let session = ready_session();
        assert_eq!(session.mode(), &SessionMode::Ready);
        assert_eq!(session.current_item().unwrap().name, "Midnight Blend");
    }

    #[test]
    fn test_failure_moves_to_failed() {
        let mut session = Session::default();
        session.start();
        let error = FetchError::ConnectionFailed("refused".to_string());
        session.handle_event(SessionEvent::FetchFailed(error.clone()));
        assert_eq!(session.mode(), &SessionMode::Failed(error));
        assert_eq!(session.list().total_len(), 0);
    }

    #[test]
    fn test_fetch_results_outside_loading_are_dropped() {
        let mut session = ready_session();
        session.handle_event(SessionEvent::FetchFailed(FetchError::ConnectionFailed(
            "late".to_string(),
        )));
        assert_eq!(session.mode(), &SessionMode::Ready);

        session.handle_event(SessionEvent::FetchSucceeded(Vec::new()));
        assert_eq!(session.list().total_len(), 4);
    }

    #[test]
    fn test_resize_only_stores_dimensions() {
        let mut session = ready_session();
        key(&mut session, KeyInput::Down);
        let commands = session.handle_event(SessionEvent::Resize {
            width: 120,
            height: 40,
        });

        assert!(commands.is_empty());
        assert_eq!(session.viewport(), Viewport::new(120, 40));
        assert_eq!(session.list().cursor(), 1);
        assert_eq!(session.mode(), &SessionMode::Ready);
    }

    // =========================================================================
    // Browsing
    // =========================================================================

    #[test]
    fn test_navigation_keys() {
        let mut session = ready_session();
        key(&mut session, KeyInput::Down);
        key(&mut session, KeyInput::Char('j'));
        assert_eq!(session.list().cursor(), 2);

        key(&mut session, KeyInput::Up);
        assert_eq!(session.list().cursor(), 1);
        key(&mut session, KeyInput::Char('k'));
        key(&mut session, KeyInput::Char('k'));
        assert_eq!(session.list().cursor(), 0);
    }

    #[test]
    fn test_toggle_with_enter_and_space() {
        let mut session = ready_session();
        key(&mut session, KeyInput::Down);
        key(&mut session, KeyInput::Space);
        assert!(session.is_selected(&ItemId::new("2")));

        key(&mut session, KeyInput::Enter);
        assert!(!session.is_selected(&ItemId::new("2")));
    }

    #[test]
    fn test_toggle_without_focus_is_noop() {
        let mut session = ready_session();
        key(&mut session, KeyInput::Char('/'));
        key(&mut session, KeyInput::Char('x'));
        key(&mut session, KeyInput::Char('y'));
        key(&mut session, KeyInput::Enter);

        key(&mut session, KeyInput::Space);
        assert!(session.selection().is_empty());
    }

    #[test]
    fn test_quit_ends_session() {
        let mut session = ready_session();
        assert_eq!(key(&mut session, KeyInput::Char('q')), vec![SessionCommand::Quit]);
        assert!(session.is_ended());

        // Nothing is processed after quit
        assert!(key(&mut session, KeyInput::Char('r')).is_empty());
    }

    #[test]
    fn test_interrupt_quits_from_any_mode() {
        let mut loading = Session::default();
        loading.start();
        assert_eq!(key(&mut loading, KeyInput::Interrupt), vec![SessionCommand::Quit]);

        let mut filtering = ready_session();
        key(&mut filtering, KeyInput::Char('/'));
        assert_eq!(
            key(&mut filtering, KeyInput::Interrupt),
            vec![SessionCommand::Quit]
        );
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    #[test]
    fn test_filter_entry_blocks_navigation() {
        let mut session = ready_session();
        key(&mut session, KeyInput::Char('/'));
        assert_eq!(session.list().input_mode(), InputMode::Filtering);

        key(&mut session, KeyInput::Down);
        assert_eq!(session.list().cursor(), 0);

        // Command letters are filter text here
        assert!(key(&mut session, KeyInput::Char('q')).is_empty());
        assert!(!session.is_ended());
        assert_eq!(session.list().filter_text(), "q");
    }

    #[test]
    fn test_filter_accept_keeps_text() {
        let mut session = ready_session();
        key(&mut session, KeyInput::Char('/'));
        for c in "golden".chars() {
            key(&mut session, KeyInput::Char(c));
        }
        key(&mut session, KeyInput::Enter);

        assert_eq!(session.list().input_mode(), InputMode::Browsing);
        assert_eq!(session.list().filter_text(), "golden");
        assert_eq!(session.current_item().unwrap().name, "Golden Hour");

        // Esc while browsing clears the applied filter
        key(&mut session, KeyInput::Esc);
        assert_eq!(session.list().filter_text(), "");
        assert_eq!(session.current_item().unwrap().name, "Golden Hour");
    }

    #[test]
    fn test_filter_backspace_and_space() {
        let mut session = ready_session();
        key(&mut session, KeyInput::Char('/'));
        key(&mut session, KeyInput::Char('a'));
        key(&mut session, KeyInput::Space);
        key(&mut session, KeyInput::Backspace);
        assert_eq!(session.list().filter_text(), "a");
    }

    // =========================================================================
    // Failed / refresh
    // =========================================================================

    #[test]
    fn test_failed_accepts_only_quit_and_refresh() {
        let mut session = Session::default();
        session.start();
        session.handle_event(SessionEvent::FetchFailed(FetchError::MalformedResponse(
            "bad".to_string(),
        )));

        assert!(key(&mut session, KeyInput::Down).is_empty());
        assert!(key(&mut session, KeyInput::Char('/')).is_empty());
        assert!(matches!(session.mode(), SessionMode::Failed(_)));

        assert_eq!(key(&mut session, KeyInput::Char('r')), vec![SessionCommand::Fetch]);
        assert_eq!(session.mode(), &SessionMode::Loading);
    }

    #[test]
    fn test_loading_ignores_navigation() {
        let mut session = Session::default();
        session.start();
        assert!(key(&mut session, KeyInput::Down).is_empty());
        assert!(key(&mut session, KeyInput::Char('r')).is_empty());
        assert_eq!(session.mode(), &SessionMode::Loading);
    }

    #[test]
    fn test_selection_is_sticky_across_refresh() {
        let mut session = ready_session();
        key(&mut session, KeyInput::Down);
        key(&mut session, KeyInput::Space);

        assert_eq!(key(&mut session, KeyInput::Char('r')), vec![SessionCommand::Fetch]);

        // Refreshed catalog no longer lists item 2
        let without: Vec<Item> = menu().into_iter().filter(|i| i.id.as_str() != "2").collect();
        session.handle_event(SessionEvent::FetchSucceeded(without));
        assert!(session.is_selected(&ItemId::new("2")));

        key(&mut session, KeyInput::Char('r'));
        session.handle_event(SessionEvent::FetchSucceeded(menu()));
        assert!(session.is_selected(&ItemId::new("2")));
    }

    #[test]
    fn test_refresh_keeps_focus_on_same_item() {
        let mut session = ready_session();
        key(&mut session, KeyInput::Down);
        key(&mut session, KeyInput::Down);

        key(&mut session, KeyInput::Char('r'));
        let mut reversed = menu();
        reversed.reverse();
        session.handle_event(SessionEvent::FetchSucceeded(reversed));

        assert_eq!(session.current_item().unwrap().name, "Velvet Espresso");
    }
}
