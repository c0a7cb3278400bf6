//! Repository Traits
//!
//! Implementations must preserve the order the source returns and must not
//! deduplicate. A failed fetch never yields a partial catalog.

use async_trait::async_trait;
use thiserror::Error;

use crate::item::Item;

/// Why a fetch produced no catalog
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Source unreachable, refused, or timed out
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Source answered with something that is not a valid catalog
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    /// Short headline for the failure screen
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ConnectionFailed(_) => "Could not reach the catalog",
            Self::MalformedResponse(_) => "The catalog sent something unreadable",
        }
    }

    /// Underlying detail
    pub fn detail(&self) -> &str {
        match self {
            Self::ConnectionFailed(detail) | Self::MalformedResponse(detail) => detail,
        }
    }
}

/// A source of catalog items
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Repository name, for logs
    fn name(&self) -> &str;

    /// Fetch the full ordered catalog
    async fn fetch(&self) -> Result<Vec<Item>, FetchError>;
}
