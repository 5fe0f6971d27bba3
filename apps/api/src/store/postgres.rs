use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::{PgPool, Postgres};
use tracing::{debug, info};

use super::{payload_columns, validate_identifier, Filter, Query, RowStore, StoreError};

/// Row store over a direct Postgres connection.
///
/// Rows travel as `jsonb` in both directions (`to_jsonb` out,
/// `jsonb_populate_record` in) so they decode through the same typed records
/// as the REST backend.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

enum Bind {
    Text(String),
    List(Vec<String>),
}

type ScalarQuery<'q> = sqlx::query::QueryScalar<'q, Postgres, Value, PgArguments>;

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }
}

/// Builds a WHERE clause whose placeholders start at `$first`.
fn where_clause(query: &Query, first: usize) -> Result<(String, Vec<Bind>), StoreError> {
    query.validate()?;
    if query.filters.is_empty() {
        return Ok((String::new(), vec![]));
    }

    let mut conditions = Vec::with_capacity(query.filters.len());
    let mut binds = Vec::with_capacity(query.filters.len());
    for (i, filter) in query.filters.iter().enumerate() {
        let n = first + i;
        match filter {
            Filter::Eq(column, value) => {
                conditions.push(format!("t.{column}::text = ${n}"));
                binds.push(Bind::Text(value.clone()));
            }
            Filter::Gte(column, value) => {
                conditions.push(format!("t.{column} >= CAST(${n} AS timestamptz)"));
                binds.push(Bind::Text(value.clone()));
            }
            Filter::In(column, values) => {
                conditions.push(format!("t.{column}::text = ANY(${n})"));
                binds.push(Bind::List(values.clone()));
            }
        }
    }
    Ok((format!(" WHERE {}", conditions.join(" AND ")), binds))
}

fn order_and_limit(query: &Query) -> String {
    let mut sql = String::new();
    if let Some((column, direction)) = &query.order {
        sql.push_str(&format!(" ORDER BY t.{column} {}", direction.as_str().to_uppercase()));
    }
    if let Some(n) = query.limit {
        sql.push_str(&format!(" LIMIT {n}"));
    }
    sql
}

fn bind_all(mut q: ScalarQuery<'_>, binds: Vec<Bind>) -> ScalarQuery<'_> {
    for b in binds {
        q = match b {
            Bind::Text(v) => q.bind(v),
            Bind::List(v) => q.bind(v),
        };
    }
    q
}

fn select_sql(table: &str, query: &Query) -> Result<(String, Vec<Bind>), StoreError> {
    validate_identifier(table)?;
    let (conditions, binds) = where_clause(query, 1)?;
    let sql = format!(
        "SELECT to_jsonb(t) FROM {table} AS t{conditions}{}",
        order_and_limit(query)
    );
    Ok((sql, binds))
}

fn insert_sql(table: &str, columns: &[String]) -> String {
    let cols = columns.join(", ");
    format!(
        "INSERT INTO {table} AS t ({cols}) \
         SELECT {cols} FROM jsonb_populate_record(NULL::{table}, $1) \
         RETURNING to_jsonb(t)"
    )
}

fn update_sql(table: &str, columns: &[String], conditions: &str) -> String {
    let assignments = columns
        .iter()
        .map(|c| format!("{c} = r.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {table} AS t SET {assignments} \
         FROM jsonb_populate_record(NULL::{table}, $1) AS r{conditions} \
         RETURNING to_jsonb(t)"
    )
}

fn upsert_sql(table: &str, columns: &[String], on_conflict: &str) -> String {
    let cols = columns.join(", ");
    let assignments = columns
        .iter()
        .filter(|c| c.as_str() != on_conflict)
        .map(|c| format!("{c} = EXCLUDED.{c}"))
        .collect::<Vec<_>>();
    let action = if assignments.is_empty() {
        format!("DO UPDATE SET {on_conflict} = EXCLUDED.{on_conflict}")
    } else {
        format!("DO UPDATE SET {}", assignments.join(", "))
    };
    format!(
        "INSERT INTO {table} AS t ({cols}) \
         SELECT {cols} FROM jsonb_populate_record(NULL::{table}, $1) \
         ON CONFLICT ({on_conflict}) {action} \
         RETURNING to_jsonb(t)"
    )
}

#[async_trait]
impl RowStore for PgStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let (sql, binds) = select_sql(table, query)?;
        debug!("{sql}");
        let rows = bind_all(sqlx::query_scalar(&sql), binds)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        validate_identifier(table)?;
        let columns = payload_columns(&row)?;
        let sql = insert_sql(table, &columns);
        debug!("{sql}");
        let inserted = sqlx::query_scalar::<_, Value>(&sql)
            .bind(row)
            .fetch_one(&self.pool)
            .await?;
        Ok(inserted)
    }

    async fn update(
        &self,
        table: &str,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        validate_identifier(table)?;
        let columns = payload_columns(&patch)?;
        let (conditions, binds) = where_clause(query, 2)?;
        let sql = update_sql(table, &columns, &conditions);
        debug!("{sql}");
        let rows = bind_all(sqlx::query_scalar(&sql).bind(patch), binds)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn upsert(&self, table: &str, row: Value, on_conflict: &str) -> Result<Value, StoreError> {
        validate_identifier(table)?;
        validate_identifier(on_conflict)?;
        let columns = payload_columns(&row)?;
        let sql = upsert_sql(table, &columns, on_conflict);
        debug!("{sql}");
        let upserted = sqlx::query_scalar::<_, Value>(&sql)
            .bind(row)
            .fetch_one(&self.pool)
            .await?;
        Ok(upserted)
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<(), StoreError> {
        validate_identifier(table)?;
        if query.filters.is_empty() {
            return Err(StoreError::InvalidPayload(
                "refusing to delete without a filter".into(),
            ));
        }
        let (conditions, binds) = where_clause(query, 1)?;
        let sql = format!("DELETE FROM {table} AS t{conditions}");
        debug!("{sql}");
        let mut q = sqlx::query(&sql);
        for b in binds {
            q = match b {
                Bind::Text(v) => q.bind(v),
                Bind::List(v) => q.bind(v),
            };
        }
        q.execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Direction;

    #[test]
    fn test_select_sql_with_filters() {
        let q = Query::new()
            .eq("user_id", "u1")
            .gte("record_date", "2025-01-01")
            .order_by("record_date", Direction::Desc)
            .limit(50);
        let (sql, binds) = select_sql("progress_records", &q).unwrap();
        assert_eq!(
            sql,
            "SELECT to_jsonb(t) FROM progress_records AS t \
             WHERE t.user_id::text = $1 AND t.record_date >= CAST($2 AS timestamptz) \
             ORDER BY t.record_date DESC LIMIT 50"
        );
        assert_eq!(binds.len(), 2);
    }

    #[test]
    fn test_update_sql_offsets_filter_placeholders() {
        let q = Query::new().eq("id", "g1").eq("user_id", "u1");
        let (conditions, _) = where_clause(&q, 2).unwrap();
        let sql = update_sql(
            "career_goals",
            &["status".to_string(), "progress_percentage".to_string()],
            &conditions,
        );
        assert!(sql.contains("SET status = r.status, progress_percentage = r.progress_percentage"));
        assert!(sql.contains("WHERE t.id::text = $2 AND t.user_id::text = $3"));
    }

    #[test]
    fn test_upsert_sql_skips_conflict_column() {
        let sql = upsert_sql(
            "user_profiles",
            &["user_id".to_string(), "full_name".to_string()],
            "user_id",
        );
        assert!(sql.contains("ON CONFLICT (user_id) DO UPDATE SET full_name = EXCLUDED.full_name"));
    }

    #[test]
    fn test_select_sql_rejects_injection() {
        let q = Query::new().eq("user_id = user_id OR 1", "x");
        assert!(select_sql("career_goals", &q).is_err());
    }
}
