use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use druginfo_rag::component::{bert::BertEmbedder, corpus, llm::CloudLlm, LocalComponent};
use druginfo_server::controller::{router::make_router, shutdown_signal, App, AppState};
use tokio::sync::Mutex;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let corpus_path = std::env::var("DRUGINFO_CORPUS")
        .unwrap_or_else(|_| "data/drug_side_effects.csv".to_string());
    let api_key = std::env::var("DRUGINFO_API_KEY").context("DRUGINFO_API_KEY is not set")?;

    info!("loading corpus from {}", corpus_path);
    let records = corpus::read_csv(Path::new(&corpus_path))?;

    // blocking initialization barrier: no query is served before the index
    // and the graph are fully built
    let embedder = Box::new(BertEmbedder::new(None, None)?);
    let llm = Box::new(CloudLlm::new(&api_key));
    let local_comps = LocalComponent::build(embedder, llm, records)?;

    let app_state = AppState(Arc::new(Mutex::new(App::new(local_comps))));
    let router = make_router(app_state);

    let listener = tokio::net::TcpListener::bind("localhost:3000").await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
