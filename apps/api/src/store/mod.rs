//! Row store: the single seam between handlers and the hosted relational backend.
//!
//! Two backends implement [`RowStore`]:
//! - [`rest::RestStore`]: the hosted REST row API (`table?col=eq.value&select=*`).
//! - [`postgres::PgStore`]: a direct Postgres connection, rows rendered with `to_jsonb`.
//!
//! Both hand back raw JSON rows; [`fetch_all`] / [`fetch_optional`] decode them into
//! typed records so a row with a missing field or an unknown enum value is rejected
//! at the boundary instead of being read as a default.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod rest;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Row API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unexpected row shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("No row returned from {0}")]
    EmptyResult(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, String),
    /// Temporal lower bound (dates or RFC 3339 timestamps).
    Gte(String, String),
    In(String, Vec<String>),
}

impl Filter {
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(c, _) | Filter::Gte(c, _) | Filter::In(c, _) => c,
        }
    }
}

/// Parameterized row filter, ordering and limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push(Filter::Eq(column.to_string(), value.to_string()));
        self
    }

    pub fn gte(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push(Filter::Gte(column.to_string(), value.to_string()));
        self
    }

    pub fn in_list<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        self.filters.push(Filter::In(
            column.to_string(),
            values.into_iter().map(|v| v.to_string()).collect(),
        ));
        self
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some((column.to_string(), direction));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Renders the query in the row API's `column=op.value` form.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|f| match f {
                Filter::Eq(c, v) => (c.clone(), format!("eq.{v}")),
                Filter::Gte(c, v) => (c.clone(), format!("gte.{v}")),
                Filter::In(c, vs) => (c.clone(), format!("in.({})", vs.join(","))),
            })
            .collect();
        if let Some((column, direction)) = &self.order {
            params.push(("order".to_string(), format!("{column}.{}", direction.as_str())));
        }
        if let Some(n) = self.limit {
            params.push(("limit".to_string(), n.to_string()));
        }
        params
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        for f in &self.filters {
            validate_identifier(f.column())?;
        }
        if let Some((column, _)) = &self.order {
            validate_identifier(column)?;
        }
        Ok(())
    }
}

/// Table and column names are interpolated into URLs and SQL, so only plain
/// snake_case identifiers are accepted.
pub fn validate_identifier(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

/// Column names of a JSON object payload, validated.
pub fn payload_columns(payload: &Value) -> Result<Vec<String>, StoreError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| StoreError::InvalidPayload("row payload must be a JSON object".into()))?;
    if obj.is_empty() {
        return Err(StoreError::InvalidPayload("row payload has no columns".into()));
    }
    obj.keys()
        .map(|k| validate_identifier(k).map(|_| k.clone()))
        .collect()
}

/// The row store trait. Carried in `AppState` as `Arc<dyn RowStore>`.
#[async_trait]
pub trait RowStore: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError>;

    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError>;

    /// Applies `patch` to every row matching `query`; returns the updated rows.
    /// No version check: concurrent writers overwrite each other.
    async fn update(&self, table: &str, query: &Query, patch: Value)
        -> Result<Vec<Value>, StoreError>;

    /// Inserts `row`, or merges it into the row that conflicts on `on_conflict`.
    async fn upsert(&self, table: &str, row: Value, on_conflict: &str)
        -> Result<Value, StoreError>;

    async fn delete(&self, table: &str, query: &Query) -> Result<(), StoreError>;
}

pub fn decode<T: DeserializeOwned>(row: Value) -> Result<T, StoreError> {
    Ok(serde_json::from_value(row)?)
}

pub async fn fetch_all<T: DeserializeOwned>(
    store: &dyn RowStore,
    table: &str,
    query: &Query,
) -> Result<Vec<T>, StoreError> {
    store
        .select(table, query)
        .await?
        .into_iter()
        .map(decode)
        .collect()
}

pub async fn fetch_optional<T: DeserializeOwned>(
    store: &dyn RowStore,
    table: &str,
    query: Query,
) -> Result<Option<T>, StoreError> {
    let rows = store.select(table, &query.limit(1)).await?;
    rows.into_iter().next().map(decode).transpose()
}
