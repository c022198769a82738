use std::sync::Arc;

use axum::{extract::State, Extension, Form, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::Identity;
use crate::checks::{CheckProducer, CheckResult};
use crate::errors::AppError;
use crate::AppState;

// ── Request / Response DTOs ──────────────────────────────────

/// OAuth2 password-grant form body.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

// ── Handlers ─────────────────────────────────────────────────

/// POST /token — verify credentials and issue a bearer token.
pub async fn login_for_access_token(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    // Argon2 verification is deliberately slow; keep it off the async workers.
    let identity = {
        let state = state.clone();
        let LoginForm { username, password } = form;
        tokio::task::spawn_blocking(move || state.credentials.authenticate(&username, &password))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("credential check aborted: {}", e)))?
    }
    .ok_or(AppError::InvalidCredentials)?;

    let access_token = state
        .tokens
        .issue(&identity, None)
        .map_err(AppError::Internal)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
    }))
}

/// GET / — unauthenticated liveness hint naming the configured database.
pub async fn read_root(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({ "database": state.config.db.database }))
}

/// GET /crmmessengerstatus — unauthenticated convenience endpoint.
pub async fn crm_messenger_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = state
        .crm_messenger
        .produce()
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("crm messenger check failed: {}", e)))?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("crm messenger check yielded nothing")))?;

    Ok(Json(json!({ "status": result.status })))
}

/// GET /allstatuses — the full report, gated behind the bearer middleware.
pub async fn all_statuses(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Json<Vec<CheckResult>> {
    tracing::debug!(subject = %identity.username, "collecting status report");
    Json(state.aggregator.collect_all().await)
}
