use crate::app::pipelines::load_batches;
use crate::config::{SyncConfig, TableConfig};
use crate::core::mapper::map_item_detail;
use crate::core::sink_writer::SinkWriter;
use crate::core::source_reader::SourceReader;
use crate::core::throttle::Throttle;
use crate::core::{ItemSource, Pipeline, Sink, TransformResult};
use crate::domain::model::{ExtractResult, ItemEnvelope, RunReport, TableBatch, WriteMode};
use crate::utils::error::Result;
use chrono::Utc;

/// 依排行榜逐一查詢商品明細，寫入明細、圖片、標籤三張表
pub struct ItemDetailPipeline<S: ItemSource, K: Sink> {
    reader: SourceReader<S>,
    writer: SinkWriter<K>,
    detail_table: String,
    image_table: String,
    tag_table: String,
}

impl<S: ItemSource, K: Sink> ItemDetailPipeline<S, K> {
    pub fn new(source: S, sink: K, throttle: Throttle, tables: &TableConfig) -> Self {
        Self {
            reader: SourceReader::new(source, throttle),
            writer: SinkWriter::new(sink),
            detail_table: tables.item_detail.clone(),
            image_table: tables.item_detail_image.clone(),
            tag_table: tables.item_detail_tag.clone(),
        }
    }

    pub fn from_config(source: S, sink: K, config: &SyncConfig) -> Self {
        Self::new(
            source,
            sink,
            Throttle::new(config.rate_limit.interval()),
            &config.tables,
        )
    }
}

#[async_trait::async_trait]
impl<S: ItemSource, K: Sink> Pipeline for ItemDetailPipeline<S, K> {
    fn name(&self) -> &str {
        "item-detail"
    }

    async fn extract(&self) -> Result<ExtractResult> {
        let ranking = self.reader.ranking().await;
        let mut result = ExtractResult {
            fetch_calls: 1,
            failed_fetches: usize::from(ranking.is_failed()),
            ..Default::default()
        };

        for envelope in ranking.into_items() {
            let Some(code) = envelope.item.item_code() else {
                tracing::debug!("Skipping ranking entry without itemCode");
                continue;
            };

            let outcome = self.reader.item(code).await;
            result.fetch_calls += 1;
            if outcome.is_failed() {
                result.failed_fetches += 1;
            }

            // 以第一筆搜尋結果為準
            match outcome.into_items().into_iter().next() {
                Some(detail) => result.items.push(detail),
                None => tracing::info!("No detail returned for item_code={}", code),
            }
        }

        Ok(result)
    }

    async fn transform(&self, items: Vec<ItemEnvelope>) -> Result<TransformResult> {
        let mut details = Vec::with_capacity(items.len());
        let mut images = Vec::new();
        let mut tags = Vec::new();

        for envelope in &items {
            let rows = map_item_detail(&envelope.item, Utc::now());
            details.push(rows.detail);
            images.extend(rows.images);
            tags.extend(rows.tags);
        }
        tracing::info!(
            "Mapped {} detail rows, {} image rows, {} tag rows",
            details.len(),
            images.len(),
            tags.len()
        );

        Ok(TransformResult {
            batches: vec![
                TableBatch::new(&self.detail_table, WriteMode::Upsert, details),
                TableBatch::new(&self.image_table, WriteMode::Insert, images),
                TableBatch::new(&self.tag_table, WriteMode::Insert, tags),
            ],
        })
    }

    async fn load(&self, result: TransformResult) -> Result<RunReport> {
        Ok(load_batches(&self.writer, self.name(), result).await)
    }
}
