use crate::config::SupabaseConfig;
use crate::domain::model::Row;
use crate::domain::ports::Sink;
use crate::utils::error::{EtlError, Result};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

const PREFER_INSERT: &str = "return=minimal";
const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=minimal";

/// Supabase 的 PostgREST 介面
#[derive(Debug, Clone)]
pub struct SupabaseSink {
    config: SupabaseConfig,
    client: Client,
}

impl SupabaseSink {
    pub fn new(config: SupabaseConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url.trim_end_matches('/'), table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key);

        match self.config.timeout_seconds {
            Some(timeout) => request.timeout(Duration::from_secs(timeout)),
            None => request,
        }
    }

    async fn write(&self, table: &str, rows: &[Row], prefer: &str) -> Result<()> {
        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", prefer)
            .json(rows)
            .send()
            .await?;
        Self::check(table, response).await.map(|_| ())
    }

    async fn check(table: &str, response: Response) -> Result<Response> {
        let status = response.status();
        tracing::debug!("Supabase response status for {}: {}", table, status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(EtlError::SinkError {
            table: table.to_string(),
            message: format!("HTTP {}: {}", status.as_u16(), body),
        })
    }
}

impl Sink for SupabaseSink {
    async fn upsert(&self, table: &str, rows: &[Row]) -> Result<()> {
        self.write(table, rows, PREFER_UPSERT).await
    }

    async fn insert(&self, table: &str, rows: &[Row]) -> Result<()> {
        self.write(table, rows, PREFER_INSERT).await
    }

    async fn select(&self, table: &str, columns: &[&str]) -> Result<Vec<Row>> {
        let response = self
            .authorized(self.client.get(self.table_url(table)))
            .query(&[("select", columns.join(","))])
            .send()
            .await?;

        let body = Self::check(table, response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
