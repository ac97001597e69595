use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use serde_json::json;

use crate::config::SERVICE_NAME;
use crate::errors::AppError;
use crate::models::approval::{timestamp_now, Decision, HealthResponse, StatusResponse};
use crate::AppState;

use super::pages;

/// Raw query pairs, in request order. Repeated keys are kept.
type QueryPairs = Vec<(String, String)>;

/// First non-empty `token` value in the query string.
fn token_param(params: &[(String, String)]) -> Result<String, AppError> {
    params
        .iter()
        .find(|(key, value)| key == "token" && !value.is_empty())
        .map(|(_, value)| value.clone())
        .ok_or(AppError::MissingParameter("token"))
}

// ── Handlers ─────────────────────────────────────────────────

/// GET /approve?token=TOKEN
pub async fn approve(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryPairs>,
) -> Result<Html<String>, AppError> {
    record_decision(&state, &params, Decision::Approved).await
}

/// GET /reject?token=TOKEN
pub async fn reject(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryPairs>,
) -> Result<Html<String>, AppError> {
    record_decision(&state, &params, Decision::Rejected).await
}

async fn record_decision(
    state: &AppState,
    params: &[(String, String)],
    decision: Decision,
) -> Result<Html<String>, AppError> {
    let token = token_param(params)?;
    tracing::info!("Received {} request for token: {}", decision, token);

    let path = state
        .store
        .record(&token, decision)
        .await
        .map_err(|source| AppError::Persistence { decision, source })?;
    tracing::info!("Created {} file: {}", decision, path.display());

    Ok(Html(pages::decision_page(decision, &token)))
}

/// GET /status?token=TOKEN
pub async fn status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<StatusResponse>, AppError> {
    let token = token_param(&params)?;
    let status = state.store.status(&token).await;
    tracing::debug!(token = %token, status = %status, "status lookup");

    Ok(Json(StatusResponse {
        token,
        status,
        timestamp: timestamp_now(),
    }))
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        timestamp: timestamp_now(),
    })
}

/// POST /email-webhook — acknowledged, nothing else yet.
pub async fn email_webhook() -> Json<serde_json::Value> {
    tracing::info!("Received email webhook");
    Json(json!({ "status": "received" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> QueryPairs {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_token_param_missing() {
        assert!(matches!(
            token_param(&pairs(&[("other", "x")])),
            Err(AppError::MissingParameter("token"))
        ));
    }

    #[test]
    fn test_token_param_skips_blank_values() {
        let params = pairs(&[("token", ""), ("token", "abc"), ("token", "def")]);
        assert_eq!(token_param(&params).unwrap(), "abc");
        assert!(token_param(&pairs(&[("token", "")])).is_err());
    }
}
