use crate::domain::model::{ExtractResult, ItemEnvelope, RunReport, Row, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 商品資料來源（排行榜與單品搜尋）
pub trait ItemSource: Send + Sync {
    fn fetch_ranking(&self) -> impl std::future::Future<Output = Result<Vec<ItemEnvelope>>> + Send;
    fn search_item(
        &self,
        item_code: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ItemEnvelope>>> + Send;
}

/// 遠端資料表
pub trait Sink: Send + Sync {
    fn upsert(
        &self,
        table: &str,
        rows: &[Row],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn insert(
        &self,
        table: &str,
        rows: &[Row],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn select(
        &self,
        table: &str,
        columns: &[&str],
    ) -> impl std::future::Future<Output = Result<Vec<Row>>> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    fn name(&self) -> &str;
    async fn extract(&self) -> Result<ExtractResult>;
    async fn transform(&self, items: Vec<ItemEnvelope>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<RunReport>;
}
