use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use super::{payload_columns, validate_identifier, Query, RowStore, StoreError};

/// Row store backed by the hosted REST row API (`{base}/rest/v1/{table}`).
/// Every request authenticates with the service key; callers are expected to
/// scope queries by `user_id` themselves.
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    service_key: String,
}

impl RestStore {
    pub fn new(client: Client, base_url: &str, service_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        }
    }

    fn table_url(&self, table: &str) -> Result<String, StoreError> {
        validate_identifier(table)?;
        Ok(format!("{}/rest/v1/{}", self.base_url, table))
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("content-type", "application/json")
    }
}

async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn read_rows(response: Response) -> Result<Vec<Value>, StoreError> {
    let response = check(response).await?;
    match response.json::<Value>().await? {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(vec![]),
        single => Ok(vec![single]),
    }
}

#[async_trait]
impl RowStore for RestStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        query.validate()?;
        let mut params = query.to_params();
        params.push(("select".to_string(), "*".to_string()));
        debug!("GET {table} {:?}", params);

        let response = self
            .authed(self.client.get(self.table_url(table)?))
            .query(&params)
            .send()
            .await?;
        read_rows(response).await
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        payload_columns(&row)?;
        debug!("POST {table}");

        let response = self
            .authed(self.client.post(self.table_url(table)?))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        read_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::EmptyResult(table.to_string()))
    }

    async fn update(
        &self,
        table: &str,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        query.validate()?;
        payload_columns(&patch)?;
        debug!("PATCH {table} {:?}", query.to_params());

        let response = self
            .authed(self.client.patch(self.table_url(table)?))
            .header("Prefer", "return=representation")
            .query(&query.to_params())
            .json(&patch)
            .send()
            .await?;
        read_rows(response).await
    }

    async fn upsert(&self, table: &str, row: Value, on_conflict: &str) -> Result<Value, StoreError> {
        validate_identifier(on_conflict)?;
        payload_columns(&row)?;
        debug!("UPSERT {table} on {on_conflict}");

        let response = self
            .authed(self.client.post(self.table_url(table)?))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .query(&[("on_conflict", on_conflict)])
            .json(&row)
            .send()
            .await?;
        read_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::EmptyResult(table.to_string()))
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<(), StoreError> {
        query.validate()?;
        if query.filters.is_empty() {
            return Err(StoreError::InvalidPayload(
                "refusing to delete without a filter".into(),
            ));
        }
        debug!("DELETE {table} {:?}", query.to_params());

        let response = self
            .authed(self.client.delete(self.table_url(table)?))
            .query(&query.to_params())
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
