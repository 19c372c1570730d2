use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
};

use axum::{http::StatusCode, response::IntoResponse};
use druginfo_rag::{component::LocalComponent, RagError};
use serde::{Deserialize, Serialize};
use tokio::{
    signal::unix::{signal, SignalKind},
    sync::Mutex,
};

pub mod router;

pub struct App {
    pub local_comps: LocalComponent,
}

impl App {
    pub fn new(local_comps: LocalComponent) -> Self {
        Self { local_comps }
    }
}

/// The mutex also serializes access to the engine, which keeps the
/// "no query during ingest" contract trivially satisfied.
#[derive(Clone)]
pub struct AppState(pub Arc<Mutex<App>>);

impl Deref for AppState {
    type Target = Arc<Mutex<App>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for AppState {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Wrapper for error handling
/// Taken from https://github.com/tokio-rs/axum/blob/main/examples/anyhow-error-response/src/main.rs
/// extended to map client errors to 400.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.0.downcast_ref::<RagError>() {
            Some(RagError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

pub async fn shutdown_signal() {
    let interrupt = async {
        signal(SignalKind::interrupt())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    let terminate = async {
        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = interrupt => {},
        _ = terminate => {},
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QueryPayload {
    pub query: Option<String>,
    pub method: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QueryResponse {
    pub response: String,
}

#[test]
fn test_query_payload_roundtrip() {
    let payload: QueryPayload =
        serde_json::from_str(r#"{"query": "side effects of aspirin?", "method": "graph"}"#)
            .unwrap();
    assert_eq!(payload.method.as_deref(), Some("graph"));
    let without_method: QueryPayload = serde_json::from_str(r#"{"query": "q"}"#).unwrap();
    assert!(without_method.method.is_none());
}
