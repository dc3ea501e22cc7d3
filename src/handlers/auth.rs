use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::database::models::{user, LoginRequest, NewUser};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid username/password";

/// POST /auth/token - exchange username and password for a token
pub async fn token(State(state): State<AppState>, body: Result<Json<LoginRequest>, JsonRejection>) -> ApiResult {
    let Json(login) = body?;
    login.validate()?;

    let Some((account, stored)) = user::find_credentials(&state.pool, &login.username).await? else {
        tracing::debug!("Login for unknown user '{}'", login.username);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !state.passwords.verify_blocking(login.password, stored).await? {
        tracing::warn!("Failed login for '{}'", account.username);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = state.tokens.issue(&account.username, account.is_admin)?;
    Ok(ApiResponse::keyed("token", token))
}

/// POST /auth/register - open sign-up; never grants admin
pub async fn register(State(state): State<AppState>, body: Result<Json<NewUser>, JsonRejection>) -> ApiResult {
    let Json(mut data) = body?;
    data.validate()?;
    data.is_admin = false;

    let hash = state.passwords.hash_blocking(data.password.clone()).await?;
    let created = user::register(&state.pool, &data, &hash).await?;
    let token = state.tokens.issue(&created.username, created.is_admin)?;

    Ok(ApiResponse::created("token", token))
}
