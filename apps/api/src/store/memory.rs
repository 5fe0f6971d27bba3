//! In-memory row store used by handler tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{payload_columns, Direction, Filter, Query, RowStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails, standing in for an unreachable backend.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.tables.lock().unwrap();
        tables.entry(table.to_string()).or_default().extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing {
            Err(StoreError::Status {
                status: 503,
                body: "backend unavailable".into(),
            })
        } else {
            Ok(())
        }
    }
}

fn as_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn matches(row: &Value, query: &Query) -> bool {
    query.filters.iter().all(|f| {
        let cell = as_text(&row[f.column()]);
        match f {
            Filter::Eq(_, v) => &cell == v,
            Filter::Gte(_, v) => !cell.is_empty() && cell.as_str() >= v.as_str(),
            Filter::In(_, vs) => vs.contains(&cell),
        }
    })
}

fn compare(a: &Value, b: &Value) -> std::cmp::Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        _ => as_text(a).cmp(&as_text(b)),
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        self.check()?;
        query.validate()?;
        let mut rows: Vec<Value> = self
            .rows(table)
            .into_iter()
            .filter(|r| matches(r, query))
            .collect();
        if let Some((column, direction)) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare(&a[column.as_str()], &b[column.as_str()]);
                match direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }
        if let Some(n) = query.limit {
            rows.truncate(n);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, mut row: Value) -> Result<Value, StoreError> {
        self.check()?;
        payload_columns(&row)?;
        if row.get("id").is_none() {
            row["id"] = json!(Uuid::new_v4());
        }
        self.seed(table, vec![row.clone()]);
        Ok(row)
    }

    async fn update(
        &self,
        table: &str,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        self.check()?;
        payload_columns(&patch)?;
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let mut updated = Vec::new();
        for row in rows.iter_mut().filter(|r| matches(r, query)) {
            if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
                for (k, v) in fields {
                    target.insert(k.clone(), v.clone());
                }
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn upsert(&self, table: &str, row: Value, on_conflict: &str) -> Result<Value, StoreError> {
        self.check()?;
        let key = as_text(&row[on_conflict]);
        let existing = self
            .update(table, &Query::new().eq(on_conflict, &key), row.clone())
            .await?;
        match existing.into_iter().next() {
            Some(merged) => Ok(merged),
            None => self.insert(table, row).await,
        }
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<(), StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|r| !matches(r, query));
        }
        Ok(())
    }
}
