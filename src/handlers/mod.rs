// Route handlers, one module per resource. Gates are applied in `app`,
// except the same-user check, which needs the path parameter.
pub mod auth;
pub mod companies;
pub mod health;
pub mod jobs;
pub mod users;

use crate::error::ApiError;

/// Fallback for unmatched routes.
pub async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}
