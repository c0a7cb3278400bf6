//! Session Events
//!
//! Everything that can happen to a session arrives as one [`SessionEvent`]:
//! terminal resizes, keys, and the outcome of a catalog fetch. Surfaces
//! translate their native input into these; the fetch runtime produces the
//! fetch variants.

use crate::item::Item;
use crate::repository::FetchError;

/// Events delivered to [`crate::Session::handle_event`]
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// The viewport changed size
    Resize { width: u16, height: u16 },

    /// A fetch completed with the full ordered catalog
    FetchSucceeded(Vec<Item>),

    /// A fetch failed
    FetchFailed(FetchError),

    /// A key press, already normalized by the surface
    Key(KeyInput),
}

impl SessionEvent {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resize { .. } => "resize",
            Self::FetchSucceeded(_) => "fetch_succeeded",
            Self::FetchFailed(_) => "fetch_failed",
            Self::Key(_) => "key",
        }
    }
}

/// Surface-independent key input
///
/// Letters used as commands (`q`, `j`, `k`, `r`, `/`) arrive as
/// [`KeyInput::Char`]; the session decides what they mean in context, so
/// they can still be typed into the filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyInput {
    Up,
    Down,
    Enter,
    Space,
    Backspace,
    Esc,
    /// Ctrl+C
    Interrupt,
    Char(char),
}
