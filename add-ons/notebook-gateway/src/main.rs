//! Axum-based API gateway for the research notebook. Config-driven via CoreConfig.
//!
//! Routes:
//! - `POST /api/research` submit a question
//! - `GET /api/history` every notebook; `GET /api/history/:category` one notebook
//! - `DELETE /api/history` clear; `GET /api/history/stream` SSE change feed
//! - `GET /api/status`, `GET /health`, `GET /`

mod handlers;

use axum::http::{HeaderValue, Method};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use notebook_core::{CoreConfig, HistoryStore, QueryInterface, ResearchService, SledHistoryLog};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Pre-flight check: config loads, history DB opens (when persistent), port is free.
fn run_verify() -> Result<(), String> {
    let config = CoreConfig::load().map_err(|e| format!("Config load failed: {}", e))?;

    if config.persist_history {
        let path = config.history_path();
        print!("Checking history store at {}... ", path.display());
        let log = SledHistoryLog::open_path(&path)
            .map_err(|e| format!("history store LOCKED or inaccessible: {}", e))?;
        drop(log);
        println!("OK");
    } else {
        println!("History store: in-memory (persist_history = false)");
    }

    print!("Checking producer mode '{}'... ", config.producer_mode);
    notebook_producers::build_producer(&config).map_err(|e| format!("producer: {}", e))?;
    println!("OK");

    let addr = format!("{}:{}", config.host, config.port);
    print!("Checking {}... ", addr);
    match std::net::TcpListener::bind(&addr) {
        Ok(listener) => {
            drop(listener);
            println!("OK (available)");
        }
        Err(e) => return Err(format!("{} BLOCKED: {}", addr, e)),
    }

    println!("\n✅ SUCCESS: All systems GO. Ready to start gateway.");
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[notebook-gateway] .env not loaded: {} (using system environment)", e);
    }

    if std::env::args().any(|a| a == "--verify") {
        match run_verify() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("❌ PRE-FLIGHT FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(CoreConfig::load().expect("load CoreConfig"));

    let store = if config.persist_history {
        HistoryStore::open_path(config.history_path()).expect("open notebook history")
    } else {
        HistoryStore::in_memory()
    };
    let store = Arc::new(store);
    let producer = notebook_producers::build_producer(&config).expect("build answer producer");
    let service = Arc::new(
        ResearchService::new(producer, Arc::clone(&store)).with_timeout(config.producer_timeout()),
    );
    let query = Arc::new(QueryInterface::new(service, store));

    let app = build_app(AppState {
        config: Arc::clone(&config),
        query,
    });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("bind gateway address");
    tracing::info!(target: "notebook::gateway", "{} listening on {}", config.app_name, addr);
    axum::serve(listener, app).await.expect("serve gateway");
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(target: "notebook::gateway", origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
        .expose_headers(tower_http::cors::Any)
}

fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/status", get(status))
        .route("/api/research", post(handlers::research::submit))
        .route(
            "/api/history",
            get(handlers::history::all).delete(handlers::history::clear),
        )
        .route("/api/history/stream", get(handlers::history::stream))
        .route("/api/history/:category", get(handlers::history::notebook))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<CoreConfig>,
    pub(crate) query: Arc<QueryInterface>,
}

/// GET / – banner.
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Research Agents API is running" }))
}

/// GET /health – liveness check for UI and scripts.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// GET /api/status – identity, producer wiring and notebook counts.
async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let stats = state.query.history_stats();
    let service = state.query.service();
    Json(serde_json::json!({
        "app_name": state.config.app_name,
        "producer": service.producer_name(),
        "producer_base_url": state.config.producer_base_url,
        "producer_timeout_ms": service.timeout().as_millis() as u64,
        "persistent": state.query.store().is_persistent(),
        "total_entries": stats.total_entries,
        "notebooks": stats.categories,
        "in_flight": state.query.in_flight(),
    }))
}
