//! Catalog TUI - Terminal surface for coffee-catalog
//!
//! Renders a catalog browsing session as a two-pane terminal UI: a list of
//! items on the left, details of the focused item on the right.
//!
//! # Architecture
//!
//! - **Render**: pure function from session state to a cell buffer
//! - **Input**: crossterm events and raw socket bytes to session events
//! - **App**: one session's event loop (terminal, fetch outcomes, ticks)
//! - **Serve**: one independent session per TCP connection
//! - **Theme**: immutable palette and layout constants

pub mod app;
pub mod input;
pub mod render;
pub mod serve;
pub mod spinner;
pub mod theme;

pub use app::App;
pub use render::render;
pub use serve::{ServeSettings, SessionServer};
pub use theme::Theme;
