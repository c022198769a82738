use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};

use crate::auth::token::TokenError;
use crate::errors::AppError;
use crate::AppState;

pub mod handlers;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::read_root))
        .route("/crmmessengerstatus", get(handlers::crm_messenger_status))
        .route("/token", post(handlers::login_for_access_token))
        .route(
            "/allstatuses",
            get(handlers::all_statuses).route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_bearer,
            )),
        )
        .with_state(state)
}

/// Middleware: validates `Authorization: Bearer <token>` and stashes the
/// proven identity in request extensions. Runs before the handler — nothing
/// protected executes on an unvalidated token.
async fn require_bearer(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AppError::Token(TokenError::Malformed))?;

    let identity = state.tokens.validate(token)?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
