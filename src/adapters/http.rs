//! HTTP surface: the classification worker endpoint plus canary and liveness.

use crate::core::canary::{run_canary, CanaryCase, CanaryReport};
use crate::core::resolver::IndustryResolver;
use crate::domain::model::{ClassifyRequest, ClassifyResult};
use crate::domain::ports::{IndustryClassifier, KvStore};
use crate::utils::domain::extract_domain;
use crate::utils::error::IndustryError;
use crate::utils::validation::{validate_non_empty_string, validate_required_field};
use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub struct AppState<K: KvStore, C: IndustryClassifier> {
    pub resolver: Arc<IndustryResolver<K, C>>,
    pub canary_cases: Arc<Vec<CanaryCase>>,
}

impl<K: KvStore, C: IndustryClassifier> Clone for AppState<K, C> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            canary_cases: Arc::clone(&self.canary_cases),
        }
    }
}

impl<K: KvStore, C: IndustryClassifier> AppState<K, C> {
    pub fn new(resolver: IndustryResolver<K, C>) -> Self {
        Self {
            resolver: Arc::new(resolver),
            canary_cases: Arc::new(CanaryCase::defaults()),
        }
    }

    pub fn with_canary_cases(mut self, cases: Vec<CanaryCase>) -> Self {
        self.canary_cases = Arc::new(cases);
        self
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ClassifyBody {
    pub domain: Option<String>,
    pub root_url: Option<String>,
    pub site_description: Option<String>,
    pub project_id: Option<String>,
    #[serde(default)]
    pub hints: Vec<String>,
    pub crawl_budget: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub known_domains: usize,
}

pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(error) => (StatusCode::BAD_REQUEST, error),
            ApiError::Internal(error) => (StatusCode::INTERNAL_SERVER_ERROR, error),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<IndustryError> for ApiError {
    fn from(e: IndustryError) -> Self {
        ApiError::BadRequest(e.user_friendly_message())
    }
}

fn required(value: &Option<String>, field: &str) -> Result<String, ApiError> {
    let value = validate_required_field(field, value)?;
    validate_non_empty_string(field, value)?;
    Ok(value.trim().to_string())
}

pub fn router<K, C>(state: AppState<K, C>) -> Router
where
    K: KvStore + 'static,
    C: IndustryClassifier + 'static,
{
    Router::new()
        .route("/industry/classify", post(classify_handler::<K, C>))
        .route("/industry/canary", get(canary_handler::<K, C>))
        .route("/health", get(health_handler::<K, C>))
        .layer(Extension(state))
}

/// Classify a site from its homepage and caller hints.
///
/// 400 when `domain` or `root_url` is missing, 500 with `{error}` when the
/// classifier fails.
pub async fn classify_handler<K, C>(
    Extension(state): Extension<AppState<K, C>>,
    body: Result<Json<ClassifyBody>, JsonRejection>,
) -> Result<Json<ClassifyResult>, ApiError>
where
    K: KvStore + 'static,
    C: IndustryClassifier + 'static,
{
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let domain = extract_domain(&required(&body.domain, "domain")?);
    let root_url = required(&body.root_url, "root_url")?;

    tracing::info!(
        "📨 Classify request for {} (project: {})",
        domain,
        body.project_id.as_deref().unwrap_or("-")
    );

    let request = ClassifyRequest {
        domain,
        root_url,
        site_description: body.site_description,
        keywords: body.hints,
        crawl_budget: body.crawl_budget,
    };

    match state.resolver.classifier().classify(&request).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            tracing::error!("❌ Classification failed for {}: {}", request.domain, e);
            Err(ApiError::Internal(e.to_string()))
        }
    }
}

pub async fn canary_handler<K, C>(Extension(state): Extension<AppState<K, C>>) -> Json<CanaryReport>
where
    K: KvStore + 'static,
    C: IndustryClassifier + 'static,
{
    Json(run_canary(&state.resolver, &state.canary_cases).await)
}

pub async fn health_handler<K, C>(
    Extension(state): Extension<AppState<K, C>>,
) -> (StatusCode, Json<HealthResponse>)
where
    K: KvStore + 'static,
    C: IndustryClassifier + 'static,
{
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            known_domains: state.resolver.rules().domain_count(),
        }),
    )
}
