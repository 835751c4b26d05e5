use crate::core::throttle::Throttle;
use crate::domain::model::FetchOutcome;
use crate::domain::ports::ItemSource;

/// [`ItemSource`] 的邊界：錯誤只記錄日誌並轉成 [`FetchOutcome::Failed`]，不往外拋
pub struct SourceReader<S: ItemSource> {
    source: S,
    throttle: Throttle,
}

impl<S: ItemSource> SourceReader<S> {
    pub fn new(source: S, throttle: Throttle) -> Self {
        Self { source, throttle }
    }

    pub async fn ranking(&self) -> FetchOutcome {
        match self.source.fetch_ranking().await {
            Ok(items) => {
                tracing::info!("✅ Fetched {} ranking items", items.len());
                FetchOutcome::Fetched(items)
            }
            Err(e) => {
                tracing::error!("❌ Ranking fetch failed: {}", e);
                FetchOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// 經過節流的單品查詢
    pub async fn item(&self, item_code: &str) -> FetchOutcome {
        self.throttle.wait().await;

        match self.source.search_item(item_code).await {
            Ok(items) => {
                tracing::info!("Fetched item_code={} ({} hits)", item_code, items.len());
                FetchOutcome::Fetched(items)
            }
            Err(e) => {
                tracing::error!("❌ Fetch failed for item_code={}: {}", item_code, e);
                FetchOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
