use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sqlx::{FromRow, PgPool};

use super::job::{Job, JOBS};
use crate::database::columns::USER_COLUMNS;
use crate::database::manager::DatabaseError;
use crate::database::partial_update::{build_partial_update, FieldKind, SetClause, UpdateError, UpdatePolicy};
use crate::database::repository::{Repository, Table};

pub static USERS: Table = Table {
    name: "users",
    key: "username",
    columns: "username, first_name, last_name, email, is_admin",
    order_by: "username",
    label: "user",
};

const PASSWORD: FieldKind = FieldKind::Text { min: 5, max: 20 };
const PERSON_NAME: FieldKind = FieldKind::Text { min: 1, max: 30 };
const USERNAME: FieldKind = FieldKind::Text { min: 1, max: 25 };

pub const USER_UPDATE: UpdatePolicy = UpdatePolicy {
    mutable: &[
        ("firstName", PERSON_NAME),
        ("lastName", PERSON_NAME),
        ("password", PASSWORD),
        ("email", FieldKind::Email),
    ],
    immutable: &["username", "isAdmin"],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub applications: Vec<i32>,
}

#[derive(FromRow)]
struct UserWithPassword {
    #[sqlx(flatten)]
    user: User,
    password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Honoured only on the admin-only create route.
    #[serde(default)]
    pub is_admin: bool,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), UpdateError> {
        USERNAME.check("username", json!(self.username))?;
        PASSWORD.check("password", json!(self.password))?;
        PERSON_NAME.check("firstName", json!(self.first_name))?;
        PERSON_NAME.check("lastName", json!(self.last_name))?;
        FieldKind::Email.check("email", json!(self.email))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), UpdateError> {
        USERNAME.check("username", json!(self.username))?;
        PASSWORD.check("password", json!(self.password))?;
        Ok(())
    }
}

/// Look up `username` and return the user with its stored password hash.
pub async fn find_credentials(pool: &PgPool, username: &str) -> Result<Option<(User, String)>, DatabaseError> {
    let sql = format!("SELECT {}, password FROM users WHERE username = $1", USERS.columns);
    let row = sqlx::query_as::<_, UserWithPassword>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| (r.user, r.password)))
}

/// Insert a user whose password is already hashed.
pub async fn register(pool: &PgPool, data: &NewUser, password_hash: &str) -> Result<User, DatabaseError> {
    let repo = Repository::<User>::new(&USERS, pool);
    if repo.exists(json!(data.username)).await? {
        return Err(USERS.duplicate(&data.username));
    }

    let sql = format!(
        "INSERT INTO users (username, password, first_name, last_name, email, is_admin) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
        USERS.columns
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(&data.username)
        .bind(password_hash)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(data.is_admin)
        .fetch_one(pool)
        .await?;

    tracing::info!("Registered user '{}' (admin: {})", user.username, user.is_admin);
    Ok(user)
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<User>, DatabaseError> {
    Repository::<User>::new(&USERS, pool).select_all().await
}

pub async fn get(pool: &PgPool, username: &str) -> Result<UserDetail, DatabaseError> {
    let user = Repository::<User>::new(&USERS, pool)
        .select_404(json!(username))
        .await?;

    let applications: Vec<i32> =
        sqlx::query_scalar("SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id")
            .bind(username)
            .fetch_all(pool)
            .await?;

    Ok(UserDetail { user, applications })
}

/// Check `data` against [`USER_UPDATE`]. Password hashing happens after
/// this and before [`build_update`].
pub fn check_update(data: Map<String, Value>) -> Result<Map<String, Value>, UpdateError> {
    USER_UPDATE.check(data)
}

pub fn build_update(data: &Map<String, Value>) -> Result<SetClause, UpdateError> {
    build_partial_update(data, &USER_COLUMNS)
}

pub async fn update(pool: &PgPool, username: &str, set: &SetClause) -> Result<User, DatabaseError> {
    Repository::<User>::new(&USERS, pool)
        .update_404(json!(username), set)
        .await
}

pub async fn remove(pool: &PgPool, username: &str) -> Result<(), DatabaseError> {
    Repository::<User>::new(&USERS, pool)
        .delete_404(json!(username))
        .await
}

/// Record that `username` applied to job `job_id`.
pub async fn apply_to_job(pool: &PgPool, username: &str, job_id: i32) -> Result<(), DatabaseError> {
    if !Repository::<Job>::new(&JOBS, pool).exists(json!(job_id)).await? {
        return Err(JOBS.not_found(job_id));
    }
    if !Repository::<User>::new(&USERS, pool).exists(json!(username)).await? {
        return Err(USERS.not_found(username));
    }

    let result = sqlx::query("INSERT INTO applications (job_id, username) VALUES ($1, $2)")
        .bind(job_id)
        .bind(username)
        .execute(pool)
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(DatabaseError::Duplicate(format!(
            "User '{}' already applied to job {}",
            username, job_id
        ))),
        Err(e) => Err(e.into()),
    }
}
