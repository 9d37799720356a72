use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use txcat_core::categorize::Categorizer;
use txcat_core::domain::{CategorizedTransaction, Categorization, Taxonomy, Transaction};

#[derive(Debug, Clone)]
pub struct AppState {
    pub taxonomy: Arc<Taxonomy>,
    /// `None` when no completion credential is configured.
    pub categorizer: Option<Arc<Categorizer>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/categories", get(categories))
        .route("/categorise", post(categorise))
        .route("/categorise-batch", post(categorise_batch))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }

    fn not_configured() -> Self {
        Self::internal("OpenAI API key not configured")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "detail": self.detail })),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

#[derive(Debug, Serialize)]
struct CategoriesResponse {
    categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BatchRequest {
    transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize)]
struct BatchResponse {
    categorized_transactions: Vec<CategorizedTransaction>,
}

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Transaction categorization service is running",
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "ai-categorization",
    })
}

async fn categories(State(state): State<AppState>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: state.taxonomy.categories().to_vec(),
    })
}

async fn categorise(
    State(state): State<AppState>,
    Json(tx): Json<Transaction>,
) -> Result<Json<Categorization>, ApiError> {
    let Some(categorizer) = &state.categorizer else {
        return Err(ApiError::not_configured());
    };

    Ok(Json(categorizer.categorize(&tx).await))
}

async fn categorise_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let Some(categorizer) = &state.categorizer else {
        return Err(ApiError::not_configured());
    };

    let results = categorizer
        .categorize_batch(&req.transactions)
        .await
        .map_err(|e| {
            let err = anyhow::Error::new(e);
            sentry_anyhow::capture_anyhow(&err);
            ApiError::internal(format!("Error categorizing transactions: {err}"))
        })?;

    tracing::info!(
        transactions = req.transactions.len(),
        "categorized transaction batch"
    );

    let categorized_transactions = req
        .transactions
        .into_iter()
        .zip(results)
        .map(|(tx, categorization)| CategorizedTransaction::new(tx, categorization))
        .collect();

    Ok(Json(BatchResponse {
        categorized_transactions,
    }))
}
