use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde_json::{Map, Value};

use crate::database::models::{job, NewJob};
use crate::filter::{JobFilter, QueryPairs, SearchFilter};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /jobs
pub async fn post(State(state): State<AppState>, body: Result<Json<NewJob>, JsonRejection>) -> ApiResult {
    let Json(data) = body?;
    let equity = data.validate()?;

    let created = job::create(&state.pool, &data, equity).await?;
    Ok(ApiResponse::created("job", created))
}

/// GET /jobs, optionally filtered by `title`, `minSalary`, `hasEquity`
pub async fn list(State(state): State<AppState>, query: Result<Query<QueryPairs>, QueryRejection>) -> ApiResult {
    let Query(pairs) = query?;
    let jobs = if pairs.is_empty() {
        job::find_all(&state.pool).await?
    } else {
        let predicate = JobFilter::from_pairs(&pairs)?.build()?;
        job::search(&state.pool, &predicate).await?
    };
    Ok(ApiResponse::keyed("jobs", jobs))
}

/// GET /jobs/:id
pub async fn get(State(state): State<AppState>, id: Result<Path<i32>, PathRejection>) -> ApiResult {
    let Path(id) = id?;
    let detail = job::get(&state.pool, id).await?;
    Ok(ApiResponse::keyed("job", detail))
}

/// PATCH /jobs/:id
pub async fn patch(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult {
    let Path(id) = id?;
    let Json(data) = body?;
    let set = job::prepare_update(data)?;

    let updated = job::update(&state.pool, id, &set).await?;
    tracing::info!("Updated job {}", id);
    Ok(ApiResponse::keyed("job", updated))
}

/// DELETE /jobs/:id
pub async fn delete(State(state): State<AppState>, id: Result<Path<i32>, PathRejection>) -> ApiResult {
    let Path(id) = id?;
    job::remove(&state.pool, id).await?;
    tracing::info!("Deleted job {}", id);
    Ok(ApiResponse::keyed("deleted", id))
}
