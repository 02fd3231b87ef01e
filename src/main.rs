//! Service entrypoint: config, tracing, dependency wiring, axum serve.

use std::sync::Arc;
use std::time::Duration;

use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use asthma_scout::adapters::archive::JsonlArchiveSink;
use asthma_scout::adapters::callback::HttpCallbackSender;
use asthma_scout::adapters::http::{routes, AppState};
use asthma_scout::adapters::llm::{GeminiClient, GeminiConfig};
use asthma_scout::adapters::store::InMemorySessionStore;
use asthma_scout::adapters::tasks::HttpAnalysisQueue;
use asthma_scout::application::{AllergyFlow, AnalysisWorker, DialogueEngine};
use asthma_scout::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let client = reqwest::Client::new();
    let gemini = Arc::new(GeminiClient::new(
        GeminiConfig::from(&config.ai),
        client.clone(),
    ));
    let store = Arc::new(InMemorySessionStore::new(Duration::from_secs(
        config.session.idle_timeout_secs,
    )));
    let queue = Arc::new(HttpAnalysisQueue::new(
        client.clone(),
        config.tasks.worker_url.clone(),
    ));
    let callbacks = Arc::new(HttpCallbackSender::new(client));
    let archive = Arc::new(JsonlArchiveSink::new(config.archive.path.clone()));

    let state = AppState {
        engine: Arc::new(DialogueEngine::new(
            store.clone(),
            gemini.clone(),
            queue,
            archive,
        )),
        worker: Arc::new(AnalysisWorker::new(store.clone(), callbacks.clone())),
        allergy: Arc::new(AllergyFlow::new(store, gemini.clone(), gemini, callbacks)),
    };

    let app = routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    let addr = config.server.socket_addr();
    info!(%addr, "asthma screening service listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
