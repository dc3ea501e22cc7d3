use serde_json::Value;
use sqlx::{self, postgres::PgRow, FromRow, PgPool};

use super::manager::{quote_identifier, DatabaseError};
use super::partial_update::{update_statement, SetClause};
use super::query_builder::SqlResult;
use crate::filter::Predicate;

/// Fixed shape of one entity table.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub key: &'static str,
    /// Select list, already safe SQL.
    pub columns: &'static str,
    pub order_by: &'static str,
    /// Singular noun used in not-found messages.
    pub label: &'static str,
}

impl Table {
    pub fn not_found(&self, key: impl std::fmt::Display) -> DatabaseError {
        DatabaseError::NotFound(format!("No {}: {}", self.label, key))
    }

    pub fn duplicate(&self, key: impl std::fmt::Display) -> DatabaseError {
        DatabaseError::Duplicate(format!("Duplicate {}: {}", self.label, key))
    }

    pub fn select_all_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} ORDER BY {}",
            self.columns,
            quote_identifier(self.name),
            quote_identifier(self.order_by)
        )
    }

    /// Empty predicates have no WHERE form; callers fall back to [`Table::select_all_sql`].
    pub fn select_where_sql(&self, predicate: &Predicate) -> Option<SqlResult> {
        if predicate.is_empty() {
            return None;
        }
        let query = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY {}",
            self.columns,
            quote_identifier(self.name),
            predicate.clause(),
            quote_identifier(self.order_by)
        );
        Some(SqlResult::new(query, predicate.params().to_vec()))
    }

    pub fn select_by_key_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE {} = $1",
            self.columns,
            quote_identifier(self.name),
            quote_identifier(self.key)
        )
    }

    pub fn exists_sql(&self) -> String {
        format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE {} = $1)",
            quote_identifier(self.name),
            quote_identifier(self.key)
        )
    }

    pub fn update_sql(&self, set: &SetClause, key: Value) -> SqlResult {
        let query = update_statement(self.name, set, self.key, self.columns);
        let mut params = set.params.clone();
        params.push(key);
        SqlResult::new(query, params)
    }

    pub fn delete_sql(&self) -> String {
        format!(
            "DELETE FROM {} WHERE {} = $1",
            quote_identifier(self.name),
            quote_identifier(self.key)
        )
    }
}

/// Typed access to one [`Table`] over the shared pool.
pub struct Repository<'a, T> {
    table: &'static Table,
    pool: &'a PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<'a, T> Repository<'a, T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table: &'static Table, pool: &'a PgPool) -> Self {
        Self {
            table,
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_all(&self) -> Result<Vec<T>, DatabaseError> {
        SqlResult::new(self.table.select_all_sql(), vec![])
            .fetch_all(self.pool)
            .await
    }

    /// Filtered listing; an empty predicate lists everything.
    pub async fn select_where(&self, predicate: &Predicate) -> Result<Vec<T>, DatabaseError> {
        match self.table.select_where_sql(predicate) {
            Some(sql) => sql.fetch_all(self.pool).await,
            None => self.select_all().await,
        }
    }

    pub async fn select_404(&self, key: Value) -> Result<T, DatabaseError> {
        let display = display_key(&key);
        SqlResult::new(self.table.select_by_key_sql(), vec![key])
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| self.table.not_found(display))
    }

    pub async fn exists(&self, key: Value) -> Result<bool, DatabaseError> {
        let found: Option<(bool,)> = SqlResult::new(self.table.exists_sql(), vec![key])
            .fetch_optional(self.pool)
            .await?;
        Ok(found.is_some_and(|(found,)| found))
    }

    pub async fn update_404(&self, key: Value, set: &SetClause) -> Result<T, DatabaseError> {
        let display = display_key(&key);
        self.table
            .update_sql(set, key)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| self.table.not_found(display))
    }

    pub async fn delete_404(&self, key: Value) -> Result<(), DatabaseError> {
        let display = display_key(&key);
        let affected = SqlResult::new(self.table.delete_sql(), vec![key])
            .execute(self.pool)
            .await?;
        if affected == 0 {
            return Err(self.table.not_found(display));
        }
        Ok(())
    }
}

fn display_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
