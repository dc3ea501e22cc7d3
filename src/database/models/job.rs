use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sqlx::{FromRow, PgPool};

use super::company::{Company, COMPANIES};
use crate::database::columns::JOB_COLUMNS;
use crate::database::manager::DatabaseError;
use crate::database::partial_update::{build_partial_update, FieldKind, SetClause, UpdateError, UpdatePolicy};
use crate::database::repository::{Repository, Table};
use crate::filter::Predicate;

pub static JOBS: Table = Table {
    name: "jobs",
    key: "id",
    columns: "id, title, salary, equity::text AS equity, company_handle",
    order_by: "title",
    label: "job",
};

pub const JOB_UPDATE: UpdatePolicy = UpdatePolicy {
    mutable: &[
        ("title", FieldKind::Text { min: 1, max: 100 }),
        ("salary", FieldKind::NonNegativeInt),
        ("equity", FieldKind::Fraction),
    ],
    immutable: &["id", "companyHandle"],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    /// NUMERIC rendered as text to keep its exact digits.
    pub equity: Option<String>,
    pub company_handle: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<String>,
    pub company: Company,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Value>,
    pub company_handle: String,
}

impl NewJob {
    /// Validate and return the equity normalized to a number.
    pub fn validate(&self) -> Result<Option<f64>, UpdateError> {
        FieldKind::Text { min: 1, max: 100 }.check("title", json!(self.title))?;
        FieldKind::Text { min: 1, max: 25 }.check("companyHandle", json!(self.company_handle))?;
        if let Some(salary) = self.salary {
            FieldKind::NonNegativeInt.check("salary", json!(salary))?;
        }
        match &self.equity {
            None | Some(Value::Null) => Ok(None),
            Some(raw) => Ok(FieldKind::Fraction.check("equity", raw.clone())?.as_f64()),
        }
    }
}

pub async fn create(pool: &PgPool, data: &NewJob, equity: Option<f64>) -> Result<Job, DatabaseError> {
    let companies = Repository::<Company>::new(&COMPANIES, pool);
    if !companies.exists(json!(data.company_handle)).await? {
        return Err(COMPANIES.not_found(&data.company_handle));
    }

    let sql = format!(
        "INSERT INTO jobs (title, salary, equity, company_handle) VALUES ($1, $2, $3, $4) RETURNING {}",
        JOBS.columns
    );
    let job = sqlx::query_as::<_, Job>(&sql)
        .bind(&data.title)
        .bind(data.salary)
        .bind(equity)
        .bind(&data.company_handle)
        .fetch_one(pool)
        .await?;

    tracing::info!("Created job {} for '{}'", job.id, job.company_handle);
    Ok(job)
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<Job>, DatabaseError> {
    Repository::<Job>::new(&JOBS, pool).select_all().await
}

pub async fn search(pool: &PgPool, predicate: &Predicate) -> Result<Vec<Job>, DatabaseError> {
    Repository::<Job>::new(&JOBS, pool).select_where(predicate).await
}

pub async fn get(pool: &PgPool, id: i32) -> Result<JobDetail, DatabaseError> {
    let job = Repository::<Job>::new(&JOBS, pool).select_404(json!(id)).await?;
    let company = Repository::<Company>::new(&COMPANIES, pool)
        .select_404(json!(job.company_handle))
        .await?;

    Ok(JobDetail {
        id: job.id,
        title: job.title,
        salary: job.salary,
        equity: job.equity,
        company,
    })
}

/// Check `data` against [`JOB_UPDATE`] and build its assignments.
pub fn prepare_update(data: Map<String, Value>) -> Result<SetClause, UpdateError> {
    let data = JOB_UPDATE.check(data)?;
    build_partial_update(&data, &JOB_COLUMNS)
}

pub async fn update(pool: &PgPool, id: i32, set: &SetClause) -> Result<Job, DatabaseError> {
    Repository::<Job>::new(&JOBS, pool).update_404(json!(id), set).await
}

pub async fn remove(pool: &PgPool, id: i32) -> Result<(), DatabaseError> {
    Repository::<Job>::new(&JOBS, pool).delete_404(json!(id)).await
}
