use crate::config::RakutenConfig;
use crate::domain::model::{ItemEnvelope, ItemsResponse};
use crate::domain::ports::ItemSource;
use crate::utils::error::{EtlError, Result};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

/// 回應本文在錯誤訊息中最多保留的字元數
const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct RakutenClient {
    config: RakutenConfig,
    client: Client,
}

impl RakutenClient {
    pub fn new(config: RakutenConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn get(&self, endpoint: &str) -> RequestBuilder {
        let mut request = self.client.get(endpoint).query(&[
            ("applicationId", self.config.application_id.as_str()),
            ("format", "json"),
        ]);

        if let Some(timeout) = self.config.timeout_seconds {
            request = request.timeout(Duration::from_secs(timeout));
        }
        request
    }

    async fn items(endpoint: &str, response: Response) -> Result<Vec<ItemEnvelope>> {
        let status = response.status();
        tracing::debug!("Rakuten response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EtlError::HttpStatusError {
                status: status.as_u16(),
                url: endpoint.to_string(),
                body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
            });
        }

        let body = response.text().await?;
        let parsed: ItemsResponse = serde_json::from_str(&body)?;
        Ok(parsed.items)
    }
}

impl ItemSource for RakutenClient {
    async fn fetch_ranking(&self) -> Result<Vec<ItemEnvelope>> {
        let endpoint = &self.config.ranking_endpoint;
        tracing::debug!("Requesting ranking (hits={}) from {}", self.config.hits, endpoint);

        let response = self
            .get(endpoint)
            .query(&[("hits", self.config.hits)])
            .send()
            .await?;
        Self::items(endpoint, response).await
    }

    async fn search_item(&self, item_code: &str) -> Result<Vec<ItemEnvelope>> {
        let endpoint = &self.config.search_endpoint;
        tracing::debug!("Searching item {} at {}", item_code, endpoint);

        let response = self
            .get(endpoint)
            .query(&[("itemCode", item_code)])
            .send()
            .await?;
        Self::items(endpoint, response).await
    }
}
