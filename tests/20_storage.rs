mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{admin_token, error_message, reset, send, storage_app, user_token};

#[tokio::test]
async fn company_create_patch_search_delete() -> Result<()> {
    let Some(app) = storage_app().await? else {
        return Ok(());
    };
    reset(&["DELETE FROM companies WHERE handle LIKE 'st-life%'"]).await?;
    let admin = admin_token()?;

    let (status, body) = send(
        app.clone(),
        Method::POST,
        "/companies",
        Some(&admin),
        Some(json!({"handle": "st-life", "name": "St Life Corp", "description": "Desc"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["company"]["handle"], "st-life");
    assert_eq!(body["company"]["numEmployees"], Value::Null);

    // Same handle, then same name under a new handle
    let (status, _) = send(
        app.clone(),
        Method::POST,
        "/companies",
        Some(&admin),
        Some(json!({"handle": "st-life", "name": "Other"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        app.clone(),
        Method::POST,
        "/companies",
        Some(&admin),
        Some(json!({"handle": "st-life-2", "name": "St Life Corp"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_message(&body), "Duplicate company name");

    let (status, body) = send(
        app.clone(),
        Method::PATCH,
        "/companies/st-life",
        Some(&admin),
        Some(json!({"numEmployees": 42, "logoUrl": "http://st-life.example.com/logo.png"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["company"]["numEmployees"], 42);
    assert_eq!(body["company"]["logoUrl"], "http://st-life.example.com/logo.png");

    let (status, body) = send(
        app.clone(),
        Method::GET,
        "/companies?nameLike=st%20life&minEmployees=40&maxEmployees=50",
        None,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let handles: Vec<&str> = body["companies"]
        .as_array()
        .map(|list| list.iter().filter_map(|c| c["handle"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(handles, vec!["st-life"]);

    let (status, body) = send(app.clone(), Method::GET, "/companies?nameLike=st%20life&minEmployees=43", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["companies"], json!([]));

    let (status, body) = send(app.clone(), Method::DELETE, "/companies/st-life", Some(&admin), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"deleted": "st-life"}));

    let (status, _) = send(app.clone(), Method::DELETE, "/companies/st-life", Some(&admin), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn missing_keys_are_not_found() -> Result<()> {
    let Some(app) = storage_app().await? else {
        return Ok(());
    };
    let admin = admin_token()?;

    let (status, body) = send(
        app.clone(),
        Method::PATCH,
        "/companies/st-nope",
        Some(&admin),
        Some(json!({"name": "Nope"})),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), "No company: st-nope");

    let (status, _) = send(app.clone(), Method::DELETE, "/jobs/2147483000", Some(&admin), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(app.clone(), Method::GET, "/jobs/2147483000", None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        app,
        Method::POST,
        "/jobs",
        Some(&admin),
        Some(json!({"title": "Orphan", "companyHandle": "st-nope"})),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn equity_filter_and_numeric_binding() -> Result<()> {
    let Some(app) = storage_app().await? else {
        return Ok(());
    };
    reset(&["DELETE FROM companies WHERE handle = 'st-eq'"]).await?;
    let admin = admin_token()?;

    let (status, _) = send(
        app.clone(),
        Method::POST,
        "/companies",
        Some(&admin),
        Some(json!({"handle": "st-eq", "name": "St Equity Co"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app.clone(),
        Method::POST,
        "/jobs",
        Some(&admin),
        Some(json!({"title": "st-eq-job-zero", "salary": 100, "equity": 0, "companyHandle": "st-eq"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["job"]["equity"], "0");

    let (status, body) = send(
        app.clone(),
        Method::POST,
        "/jobs",
        Some(&admin),
        Some(json!({"title": "st-eq-job-some", "salary": 200, "equity": "0.25", "companyHandle": "st-eq"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["job"]["equity"], "0.25");
    let job_id = body["job"]["id"].as_i64().unwrap_or_default();

    let (status, body) = send(app.clone(), Method::GET, "/jobs?title=st-eq-job&hasEquity=true", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["jobs"]
        .as_array()
        .map(|list| list.iter().filter_map(|j| j["title"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(titles, vec!["st-eq-job-some"]);

    let (status, body) = send(app.clone(), Method::GET, "/jobs?title=st-eq-job&hasEquity=false", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jobs"].as_array().map(Vec::len), Some(2));

    let (status, body) = send(app.clone(), Method::GET, "/jobs?title=st-eq-job&minSalary=150", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jobs"].as_array().map(Vec::len), Some(1));

    let (status, body) = send(
        app.clone(),
        Method::PATCH,
        &format!("/jobs/{}", job_id),
        Some(&admin),
        Some(json!({"equity": 0.5, "salary": 300})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job"]["equity"], "0.5");
    assert_eq!(body["job"]["salary"], 300);
    assert_eq!(body["job"]["companyHandle"], "st-eq");

    let (status, body) = send(app.clone(), Method::GET, &format!("/jobs/{}", job_id), None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job"]["company"]["handle"], "st-eq");

    let (status, body) = send(app.clone(), Method::GET, "/companies/st-eq", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["company"]["jobs"].as_array().map(Vec::len), Some(2));

    let (status, _) = send(app, Method::DELETE, "/companies/st-eq", Some(&admin), None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn register_login_and_apply() -> Result<()> {
    let Some(app) = storage_app().await? else {
        return Ok(());
    };
    reset(&[
        "DELETE FROM users WHERE username = 'st-user'",
        "DELETE FROM companies WHERE handle = 'st-apply'",
    ])
    .await?;
    let admin = admin_token()?;

    let new_user = json!({
        "username": "st-user",
        "password": "password",
        "firstName": "St",
        "lastName": "User",
        "email": "st-user@email.com"
    });
    let (status, body) = send(app.clone(), Method::POST, "/auth/register", None, Some(new_user.clone())).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].is_string());

    let (status, body) = send(app.clone(), Method::POST, "/auth/register", None, Some(new_user)).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["status"], 409);

    let (status, _) = send(
        app.clone(),
        Method::POST,
        "/auth/token",
        None,
        Some(json!({"username": "st-user", "password": "wrong-pass"})),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        app.clone(),
        Method::POST,
        "/auth/token",
        None,
        Some(json!({"username": "st-user", "password": "password"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap_or_default().to_string();

    send(
        app.clone(),
        Method::POST,
        "/companies",
        Some(&admin),
        Some(json!({"handle": "st-apply", "name": "St Apply Co"})),
    )
    .await?;
    let (_, body) = send(
        app.clone(),
        Method::POST,
        "/jobs",
        Some(&admin),
        Some(json!({"title": "st-apply-job", "companyHandle": "st-apply"})),
    )
    .await?;
    let job_id = body["job"]["id"].as_i64().unwrap_or_default();

    let uri = format!("/users/st-user/jobs/{}", job_id);
    let (status, body) = send(app.clone(), Method::POST, &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"applied": job_id}));

    let (status, _) = send(app.clone(), Method::POST, &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(app.clone(), Method::GET, "/users/st-user", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["isAdmin"], false);
    assert_eq!(body["user"]["applications"], json!([job_id]));
    assert!(body["user"].get("password").is_none());

    let (status, body) = send(
        app.clone(),
        Method::PATCH,
        "/users/st-user",
        Some(&token),
        Some(json!({"firstName": "Renamed", "password": "new-password"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["firstName"], "Renamed");

    let (status, _) = send(
        app.clone(),
        Method::POST,
        "/auth/token",
        None,
        Some(json!({"username": "st-user", "password": "new-password"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(app.clone(), Method::DELETE, "/users/st-user", Some(&user_token("st-user")?), None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(app.clone(), Method::GET, "/users/st-user", Some(&admin), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(app, Method::DELETE, "/companies/st-apply", Some(&admin), None).await?;
    Ok(())
}
