#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use jobly_api::auth::password::PasswordHasher;
use jobly_api::auth::{Claims, TokenService};
use jobly_api::config::AppConfig;
use jobly_api::database::manager::{connect, connect_lazy};
use jobly_api::{app, AppState};

/// Router over a pool that never connects unless a handler reaches storage.
pub fn test_app() -> Result<Router> {
    let config = AppConfig::test();
    let state = AppState {
        pool: connect_lazy(&config.database)?,
        tokens: Arc::new(TokenService::from_config(&config.security)?),
        passwords: PasswordHasher::new(config.security.password_hash_cost)?,
        config: Arc::new(config),
    };
    Ok(app(state))
}

const SCHEMA: &str = include_str!("../fixtures/schema.sql");

/// Router over a live database named by `DATABASE_URL_TEST`, with the schema
/// in place. `None` when the variable is unset.
pub async fn storage_app() -> Result<Option<Router>> {
    let Ok(url) = std::env::var("DATABASE_URL_TEST") else {
        eprintln!("DATABASE_URL_TEST not set; skipping storage test");
        return Ok(None);
    };

    let mut config = AppConfig::test();
    config.database.url = url;
    let pool = connect(&config.database).await?;

    // Test binaries run in parallel; serialize schema creation
    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock(7070)").execute(&mut *tx).await?;
    for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    let state = AppState {
        pool,
        tokens: Arc::new(TokenService::from_config(&config.security)?),
        passwords: PasswordHasher::new(config.security.password_hash_cost)?,
        config: Arc::new(config),
    };
    Ok(Some(app(state)))
}

/// Delete rows an earlier run of the calling test left behind.
pub async fn reset(sql: &[&str]) -> Result<()> {
    let url = std::env::var("DATABASE_URL_TEST")?;
    let pool = sqlx::PgPool::connect(&url).await?;
    for statement in sql {
        sqlx::query(statement).execute(&pool).await?;
    }
    pool.close().await;
    Ok(())
}

pub fn tokens() -> Result<TokenService> {
    Ok(TokenService::from_config(&AppConfig::test().security)?)
}

pub fn admin_token() -> Result<String> {
    Ok(tokens()?.issue("admin", true)?)
}

pub fn user_token(username: &str) -> Result<String> {
    Ok(tokens()?.issue(username, false)?)
}

pub fn expired_token(username: &str, is_admin: bool) -> Result<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        username: username.to_string(),
        is_admin,
        iat: now - 7200,
        exp: now - 3600,
    };
    Ok(tokens()?.sign(&claims)?)
}

/// Send one request and return the status with the parsed JSON body.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}

pub fn error_message(body: &Value) -> &str {
    body["error"]["message"].as_str().unwrap_or_default()
}
