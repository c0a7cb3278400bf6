//! Catalog HTTP service
//!
//! A background service with an explicit lifecycle: [`CatalogService::start`]
//! binds and begins serving, [`ServiceHandle::stop`] shuts it down gracefully
//! and waits for the server task to finish.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use catalog_core::Item;

/// The catalog to serve
#[derive(Clone)]
pub struct CatalogService {
    items: Arc<Vec<Item>>,
}

impl CatalogService {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: Arc::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Axum router for the service
    pub fn router(&self) -> Router {
        Router::new()
            .route("/products", get(products))
            .route("/health", get(health))
            .with_state(self.clone())
    }

    /// Bind `addr` and serve in the background
    pub async fn start(self, addr: SocketAddr) -> Result<ServiceHandle> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind catalog service on {addr}"))?;
        let local_addr = listener
            .local_addr()
            .context("Failed to read catalog service address")?;

        let app = self.router();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                tracing::error!(error = %e, "Catalog service failed");
            }
        });

        tracing::info!(addr = %local_addr, items = self.len(), "Catalog service listening");

        Ok(ServiceHandle {
            local_addr,
            shutdown_tx: Some(shutdown_tx),
            task,
        })
    }
}

async fn products(State(service): State<CatalogService>) -> Json<Vec<Item>> {
    tracing::debug!(count = service.items.len(), "Serving catalog");
    Json(service.items.as_ref().clone())
}

async fn health() -> &'static str {
    "ok"
}

/// Running service
pub struct ServiceHandle {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ServiceHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Full URL of the catalog endpoint
    pub fn products_url(&self) -> String {
        format!("http://{}/products", self.local_addr)
    }

    /// Stop serving and wait for in-flight requests to drain
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            tracing::warn!(error = %e, "Catalog service task ended abnormally");
        }
        tracing::info!(addr = %self.local_addr, "Catalog service stopped");
    }
}

impl Drop for ServiceHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
