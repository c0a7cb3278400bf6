//! Item Repositories
//!
//! Abstraction over where catalog items come from. The session never talks
//! to a repository directly; the [`crate::runtime::SessionRuntime`] calls
//! [`ItemRepository::fetch`] on a spawned task and feeds the outcome back as
//! a [`crate::SessionEvent`].

mod http;
mod traits;

pub use http::HttpRepository;
pub use traits::{FetchError, ItemRepository};
