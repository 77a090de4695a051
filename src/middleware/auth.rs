// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer-token authentication middleware.

use crate::error::AppError;
use crate::services::VerifyError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated caller extracted from a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Identity provider subject; every row the caller touches is scoped
    /// to this value.
    pub user_id: String,
}

impl From<VerifyError> for AppError {
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::Unauthorized(msg) => {
                tracing::debug!(reason = %msg, "Rejected bearer token");
                AppError::InvalidToken
            }
            VerifyError::KeySet(msg) => AppError::KeySet(msg),
        }
    }
}

/// Middleware that requires a valid bearer token on every request.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request.headers().get(header::AUTHORIZATION);

    let user_id = state.token_verifier.verify_bearer(auth_header).await?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}
