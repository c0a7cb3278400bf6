//! Catalog Core - Headless catalog browsing for coffee-catalog
//!
//! This crate holds everything a catalog browsing session needs except the
//! pixels: the item model, the repository client, the list/filter view, the
//! selection set and the session state machine that ties them together. It
//! has no terminal dependencies, so the same session can be driven by the
//! local TUI, by the served mode, or by a test harness.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Surfaces                               │
//! │   ┌────────────┐   ┌──────────────┐   ┌──────────────────┐   │
//! │   │ Local TUI  │   │ Served (TCP) │   │ Tests / headless │   │
//! │   └─────┬──────┘   └──────┬───────┘   └────────┬─────────┘   │
//! │         └──────────────────┼────────────────────┘            │
//! │                   SessionEvent (up)                           │
//! │                   render(&Session) (down)                     │
//! └────────────────────────────┼──────────────────────────────────┘
//!                              │
//! ┌────────────────────────────┼──────────────────────────────────┐
//! │                      CATALOG CORE                              │
//! │   ┌────────────────────────┴───────────────────────────────┐  │
//! │   │                  SessionRuntime                         │  │
//! │   │   ┌──────────┐  ┌──────────┐  ┌───────────┐  ┌───────┐ │  │
//! │   │   │ Session  │  │ ListView │  │ Selection │  │ Repo  │ │  │
//! │   │   └──────────┘  └──────────┘  └───────────┘  └───────┘ │  │
//! │   └────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Session`]: the per-user state machine (`Loading`, `Ready`, `Failed`)
//! - [`SessionEvent`]: the single event type every surface feeds in
//! - [`SessionRuntime`]: executes fetch commands and feeds results back
//! - [`ItemRepository`]: where items come from
//! - [`CatalogConfig`]: layered TOML / env / CLI configuration

pub mod commands;
pub mod config;
pub mod events;
pub mod item;
pub mod list_view;
pub mod repository;
pub mod runtime;
pub mod selection;
pub mod session;

pub use commands::SessionCommand;
pub use config::{CatalogConfig, ConfigError, ConfigOverrides, ConfigSource, RunMode};
pub use events::{KeyInput, SessionEvent};
pub use item::{Item, ItemId};
pub use list_view::{InputMode, ListView};
pub use repository::{FetchError, HttpRepository, ItemRepository};
pub use runtime::SessionRuntime;
pub use selection::SelectionSet;
pub use session::{Session, SessionId, SessionMode, Viewport};
