//! Shared helpers for the workspace's integration tests.

pub mod fixtures;

use anyhow::Context as _;
use async_trait::async_trait;
use axum::Router;
use axum::http::{StatusCode, header};
use axum::routing::get;
use mcp_openapi_tools::{BuiltinDelegate, DelegateError, SpecDelegate};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Delegate that records how often each step runs.
///
/// Forwards to [`BuiltinDelegate`] unless a step is forced to fail.
#[derive(Debug, Default)]
pub struct CountingDelegate {
    validate_calls: AtomicUsize,
    dereference_calls: AtomicUsize,
    reject_validation: Option<String>,
    reject_dereference: Option<String>,
    validated: Mutex<Vec<Value>>,
}

impl CountingDelegate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `validate` fail with `message`.
    #[must_use]
    pub fn rejecting_validation(message: impl Into<String>) -> Self {
        Self {
            reject_validation: Some(message.into()),
            ..Self::default()
        }
    }

    /// Make `dereference` fail with `message`.
    #[must_use]
    pub fn rejecting_dereference(message: impl Into<String>) -> Self {
        Self {
            reject_dereference: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }

    pub fn dereference_calls(&self) -> usize {
        self.dereference_calls.load(Ordering::SeqCst)
    }

    /// Documents passed to `validate`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the lock was poisoned by a panicking test.
    pub fn validated_documents(&self) -> Vec<Value> {
        self.validated.lock().expect("validated lock").clone()
    }
}

#[async_trait]
impl SpecDelegate for CountingDelegate {
    async fn validate(&self, document: &Value) -> Result<(), DelegateError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        self.validated
            .lock()
            .expect("validated lock")
            .push(document.clone());
        match &self.reject_validation {
            Some(message) => Err(DelegateError::new(message.clone())),
            None => BuiltinDelegate.validate(document).await,
        }
    }

    async fn dereference(&self, document: Value) -> Result<Value, DelegateError> {
        self.dereference_calls.fetch_add(1, Ordering::SeqCst);
        match &self.reject_dereference {
            Some(message) => Err(DelegateError::new(message.clone())),
            None => BuiltinDelegate.dereference(document).await,
        }
    }
}

/// HTTP server answering every `GET` with one fixed status and body.
///
/// Shut down gracefully on drop.
pub struct SpecServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl SpecServer {
    /// Bind an ephemeral localhost port and start serving `body` with `status`.
    ///
    /// # Errors
    ///
    /// Returns an error if `status` is not a valid HTTP status or binding the listener fails.
    pub async fn start(status: u16, body: impl Into<String>) -> anyhow::Result<Self> {
        let status = StatusCode::from_u16(status).context("invalid status code")?;
        let body: String = body.into();

        let app = Router::new().route(
            "/{*path}",
            get(move || {
                let body = body.clone();
                async move { (status, [(header::CONTENT_TYPE, "application/yaml")], body) }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind ephemeral port")?;
        let addr = listener.local_addr().context("read local address")?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        tokio::spawn(async move {
            let _ = server.await;
        });

        Ok(Self {
            addr,
            shutdown: Some(shutdown_tx),
        })
    }

    /// URL of the served document.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for SpecServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
