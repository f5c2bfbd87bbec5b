//! Footprint Web Server
//!
//! Axum-based REST API for the footprint carbon tracking application.
//!
//! - Transaction CRUD under `/api/transactions`
//! - AI analysis endpoints under `/api/ai`
//! - Restrictive CORS policy, sanitized error responses
//! - Optional static file serving for a bundled frontend

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use footprint_core::{
    Analyzer, Database, EmissionFactors, Error as CoreError, LlmBackend, LlmClient,
    SpendingPredictor,
};

mod handlers;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub analyzer: Analyzer<Database>,
}

/// Create the application router
pub fn create_router(
    db: Database,
    llm: LlmClient,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> Router {
    let analyzer = Analyzer::new(
        db.clone(),
        llm,
        SpendingPredictor::from_env(),
        EmissionFactors::default(),
    );
    let state = Arc::new(AppState { db, analyzer });

    let api_routes = Router::new()
        .route("/", get(handlers::api_root))
        // Transactions CRUD
        .route(
            "/transactions",
            post(handlers::create_transaction).get(handlers::list_transactions),
        )
        .route(
            "/transactions/:id",
            get(handlers::get_transaction)
                .put(handlers::update_transaction)
                .delete(handlers::delete_transaction),
        )
        // AI analysis
        .route("/ai/emissions", get(handlers::estimate_emissions))
        .route("/ai/predict-spending", get(handlers::predict_spending))
        .route(
            "/ai/comprehensive-analysis",
            get(handlers::comprehensive_analysis),
        )
        .route("/ai/compare-months", post(handlers::compare_months))
        .route(
            "/ai/handprint-suggestions",
            get(handlers::handprint_suggestions),
        )
        .route(
            "/ai/greener-alternatives",
            get(handlers::greener_alternatives),
        );

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
    };

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
///
/// A missing LLM credential is fatal here: every AI endpoint would 500,
/// so refusing to start is kinder than limping.
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let llm = LlmClient::from_env().ok_or_else(|| {
        CoreError::Config(
            "LLM backend not configured (set GEMINI_API_KEY, or LLM_BACKEND=ollama with OLLAMA_HOST)"
                .to_string(),
        )
    })?;
    check_llm_connection(&llm).await;

    let app = create_router(db, llm, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log LLM backend connection status
async fn check_llm_connection(llm: &LlmClient) {
    if llm.health_check().await {
        info!(
            "LLM backend connected: {} (model: {})",
            llm.host(),
            llm.model()
        );
    } else {
        warn!(
            "LLM backend configured but not responding: {} (model: {})",
            llm.host(),
            llm.model()
        );
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::bad_request(&msg),
            CoreError::NotFound(what) => Self::not_found(&format!("{} not found", what)),
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                // Return generic message to client
                message: "An internal error occurred".to_string(),
                // Keep full error for logging
                internal: Some(other.into()),
            },
        }
    }
}
