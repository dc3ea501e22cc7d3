use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sqlx::{FromRow, PgPool};

use crate::database::columns::COMPANY_COLUMNS;
use crate::database::manager::DatabaseError;
use crate::database::partial_update::{build_partial_update, FieldKind, SetClause, UpdateError, UpdatePolicy};
use crate::database::repository::{Repository, Table};
use crate::filter::Predicate;

pub static COMPANIES: Table = Table {
    name: "companies",
    key: "handle",
    columns: "handle, name, description, num_employees, logo_url",
    order_by: "name",
    label: "company",
};

pub const COMPANY_UPDATE: UpdatePolicy = UpdatePolicy {
    mutable: &[
        ("name", FieldKind::Text { min: 1, max: 50 }),
        ("description", FieldKind::NullableText),
        ("numEmployees", FieldKind::NonNegativeInt),
        ("logoUrl", FieldKind::Url),
    ],
    immutable: &["handle"],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// Job row as listed under its company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CompanyJob {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewCompany {
    pub fn validate(&self) -> Result<(), UpdateError> {
        FieldKind::Text { min: 1, max: 25 }.check("handle", json!(self.handle))?;
        if !self
            .handle
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(UpdateError::InvalidValue {
                field: "handle".to_string(),
                reason: "use lowercase letters, digits, '-' or '_'".to_string(),
            });
        }
        FieldKind::Text { min: 1, max: 50 }.check("name", json!(self.name))?;
        if let Some(n) = self.num_employees {
            FieldKind::NonNegativeInt.check("numEmployees", json!(n))?;
        }
        FieldKind::Url.check("logoUrl", json!(self.logo_url))?;
        Ok(())
    }
}

pub async fn create(pool: &PgPool, data: &NewCompany) -> Result<Company, DatabaseError> {
    let repo = Repository::<Company>::new(&COMPANIES, pool);
    if repo.exists(json!(data.handle)).await? {
        return Err(COMPANIES.duplicate(&data.handle));
    }

    let sql = format!(
        "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {}",
        COMPANIES.columns
    );
    let company = sqlx::query_as::<_, Company>(&sql)
        .bind(&data.handle)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.num_employees)
        .bind(&data.logo_url)
        .fetch_one(pool)
        .await?;

    tracing::info!("Created company '{}'", company.handle);
    Ok(company)
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<Company>, DatabaseError> {
    Repository::<Company>::new(&COMPANIES, pool).select_all().await
}

pub async fn search(pool: &PgPool, predicate: &Predicate) -> Result<Vec<Company>, DatabaseError> {
    Repository::<Company>::new(&COMPANIES, pool).select_where(predicate).await
}

pub async fn get(pool: &PgPool, handle: &str) -> Result<CompanyDetail, DatabaseError> {
    let company = Repository::<Company>::new(&COMPANIES, pool)
        .select_404(json!(handle))
        .await?;

    let jobs = sqlx::query_as::<_, CompanyJob>(
        "SELECT id, title, salary, equity::text AS equity FROM jobs WHERE company_handle = $1 ORDER BY id",
    )
    .bind(handle)
    .fetch_all(pool)
    .await?;

    Ok(CompanyDetail { company, jobs })
}

/// Check `data` against [`COMPANY_UPDATE`] and build its assignments.
pub fn prepare_update(data: Map<String, Value>) -> Result<SetClause, UpdateError> {
    let data = COMPANY_UPDATE.check(data)?;
    build_partial_update(&data, &COMPANY_COLUMNS)
}

pub async fn update(pool: &PgPool, handle: &str, set: &SetClause) -> Result<Company, DatabaseError> {
    Repository::<Company>::new(&COMPANIES, pool)
        .update_404(json!(handle), set)
        .await
}

pub async fn remove(pool: &PgPool, handle: &str) -> Result<(), DatabaseError> {
    Repository::<Company>::new(&COMPANIES, pool)
        .delete_404(json!(handle))
        .await
}
