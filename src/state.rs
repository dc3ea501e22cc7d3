use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::password::PasswordHasher;
use crate::auth::TokenService;
use crate::config::AppConfig;

/// Shared, read-only handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: Arc<TokenService>,
    pub passwords: PasswordHasher,
    pub config: Arc<AppConfig>,
}
