use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde_json::{Map, Value};

use crate::database::models::{company, NewCompany};
use crate::filter::{CompanyFilter, QueryPairs, SearchFilter};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /companies
pub async fn post(State(state): State<AppState>, body: Result<Json<NewCompany>, JsonRejection>) -> ApiResult {
    let Json(data) = body?;
    data.validate()?;

    let created = company::create(&state.pool, &data).await?;
    Ok(ApiResponse::created("company", created))
}

/// GET /companies, optionally filtered by `nameLike`, `minEmployees`, `maxEmployees`
pub async fn list(State(state): State<AppState>, query: Result<Query<QueryPairs>, QueryRejection>) -> ApiResult {
    let Query(pairs) = query?;
    let companies = if pairs.is_empty() {
        company::find_all(&state.pool).await?
    } else {
        let predicate = CompanyFilter::from_pairs(&pairs)?.build()?;
        company::search(&state.pool, &predicate).await?
    };
    Ok(ApiResponse::keyed("companies", companies))
}

/// GET /companies/:handle
pub async fn get(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult {
    let detail = company::get(&state.pool, &handle).await?;
    Ok(ApiResponse::keyed("company", detail))
}

/// PATCH /companies/:handle
pub async fn patch(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult {
    let Json(data) = body?;
    let set = company::prepare_update(data)?;

    let updated = company::update(&state.pool, &handle, &set).await?;
    tracing::info!("Updated company '{}'", handle);
    Ok(ApiResponse::keyed("company", updated))
}

/// DELETE /companies/:handle
pub async fn delete(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult {
    company::remove(&state.pool, &handle).await?;
    tracing::info!("Deleted company '{}'", handle);
    Ok(ApiResponse::keyed("deleted", handle))
}
