use axum::{extract::State, routing::post, Json, Router};
use druginfo_rag::{method, RagError};
use tracing::info;

use super::{AppState, QueryPayload, QueryResponse, Result};

pub fn make_router(state: AppState) -> Router {
    Router::new()
        .route("/query", post(query_api))
        .with_state(state)
}

async fn query_api(
    State(state): State<AppState>,
    Json(payload): Json<QueryPayload>,
) -> Result<Json<QueryResponse>> {
    let question = payload
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| RagError::InvalidRequest("no query provided".to_string()))?;
    let tag = payload.method.unwrap_or_default();
    info!("query {:?} via {:?}", question, tag);
    let mut app = state.lock().await;
    let response = method::answer(&question, &tag, &mut app.local_comps)?;
    Ok(Json(QueryResponse { response }))
}
