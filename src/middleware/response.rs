use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

/// JSON response keyed by a single resource name, e.g. `{"company": {...}}`.
#[derive(Debug)]
pub struct ApiResponse {
    body: Map<String, Value>,
    status_code: StatusCode,
}

impl ApiResponse {
    /// `200 OK` with `{ key: data }`
    pub fn keyed<T: Serialize>(key: &str, data: T) -> Self {
        Self::with_status(key, data, StatusCode::OK)
    }

    /// `201 Created` with `{ key: data }`
    pub fn created<T: Serialize>(key: &str, data: T) -> Self {
        Self::with_status(key, data, StatusCode::CREATED)
    }

    fn with_status<T: Serialize>(key: &str, data: T, status_code: StatusCode) -> Self {
        let mut response = Self {
            body: Map::new(),
            status_code,
        };
        response.insert(key, data);
        response
    }

    /// Add another top-level entry, e.g. a token next to a user.
    pub fn and<T: Serialize>(mut self, key: &str, data: T) -> Self {
        self.insert(key, data);
        self
    }

    fn insert<T: Serialize>(&mut self, key: &str, data: T) {
        let value = serde_json::to_value(&data).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize response field '{}': {}", key, e);
            Value::Null
        });
        self.body.insert(key.to_string(), value);
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status_code, Json(Value::Object(self.body))).into_response()
    }
}

pub type ApiResult = Result<ApiResponse, crate::error::ApiError>;
