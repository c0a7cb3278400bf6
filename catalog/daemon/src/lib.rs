//! Catalog Daemon - HTTP catalog service for coffee-catalog
//!
//! Serves the catalog that browsing sessions fetch. It can run as its own
//! process (`catalog-daemon`) or embedded in the TUI process, in which case
//! it is started before any session and stopped after the last one.
//!
//! # Endpoints
//!
//! - `GET /products`: JSON array of items, in catalog order
//! - `GET /health`: `ok`

pub mod seed;
pub mod service;

pub use seed::{load_catalog_file, seed_catalog, CatalogFileError};
pub use service::{CatalogService, ServiceHandle};
