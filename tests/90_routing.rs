mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{send, test_app};

#[tokio::test]
async fn unknown_route_is_json_not_found() -> Result<()> {
    let (status, body) = send(test_app()?, Method::GET, "/no-such-thing", None, None).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": {"message": "Not Found", "status": 404}}));
    Ok(())
}

#[tokio::test]
async fn malformed_json_body_is_bad_request() -> Result<()> {
    let (status, _) = send(
        test_app()?,
        Method::POST,
        "/auth/token",
        None,
        Some(json!("just a string")),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn unsupported_method_is_405_before_authentication() -> Result<()> {
    let (status, _) = send(test_app()?, Method::PUT, "/companies/c1", None, None).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = send(test_app()?, Method::PUT, "/users/u1", None, None).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = send(test_app()?, Method::PATCH, "/companies/c1", None, Some(json!({"name": "x"}))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}
