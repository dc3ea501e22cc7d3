use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use serde_json::{Map, Value};

use crate::database::models::{user, NewUser};
use crate::middleware::auth::authorize_user_or_admin;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// POST /users - admin creates an account, optionally another admin
pub async fn post(State(state): State<AppState>, body: Result<Json<NewUser>, JsonRejection>) -> ApiResult {
    let Json(data) = body?;
    data.validate()?;

    let hash = state.passwords.hash_blocking(data.password.clone()).await?;
    let created = user::register(&state.pool, &data, &hash).await?;
    let token = state.tokens.issue(&created.username, created.is_admin)?;

    Ok(ApiResponse::created("user", created).and("token", token))
}

/// GET /users
pub async fn list(State(state): State<AppState>) -> ApiResult {
    let users = user::find_all(&state.pool).await?;
    Ok(ApiResponse::keyed("users", users))
}

/// GET /users/:username
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(username): Path<String>,
) -> ApiResult {
    authorize_user_or_admin(&caller, &username)?;

    let detail = user::get(&state.pool, &username).await?;
    Ok(ApiResponse::keyed("user", detail))
}

/// PATCH /users/:username
pub async fn patch(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(username): Path<String>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult {
    authorize_user_or_admin(&caller, &username)?;
    let Json(data) = body?;

    let mut data = user::check_update(data)?;
    if let Some(password) = data.get("password").and_then(Value::as_str).map(str::to_owned) {
        let hash = state.passwords.hash_blocking(password).await?;
        data.insert("password".to_string(), Value::String(hash));
    }
    let set = user::build_update(&data)?;

    let updated = user::update(&state.pool, &username, &set).await?;
    tracing::info!("Updated user '{}' (by '{}')", username, caller.username);
    Ok(ApiResponse::keyed("user", updated))
}

/// DELETE /users/:username
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(username): Path<String>,
) -> ApiResult {
    authorize_user_or_admin(&caller, &username)?;

    user::remove(&state.pool, &username).await?;
    tracing::info!("Deleted user '{}' (by '{}')", username, caller.username);
    Ok(ApiResponse::keyed("deleted", username))
}

/// POST /users/:username/jobs/:id
pub async fn apply(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    path: Result<Path<(String, i32)>, PathRejection>,
) -> ApiResult {
    let Path((username, job_id)) = path?;
    authorize_user_or_admin(&caller, &username)?;

    user::apply_to_job(&state.pool, &username, job_id).await?;
    tracing::info!("User '{}' applied to job {}", username, job_id);
    Ok(ApiResponse::keyed("applied", job_id))
}
