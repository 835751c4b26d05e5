use crate::app::pipelines::load_batches;
use crate::config::{SyncConfig, TableConfig};
use crate::core::mapper::map_price_history_row;
use crate::core::sink_writer::SinkWriter;
use crate::core::source_reader::SourceReader;
use crate::core::throttle::Throttle;
use crate::core::tracked_codes::read_tracked_codes;
use crate::core::{ItemSource, Pipeline, Sink, TransformResult};
use crate::domain::model::{ExtractResult, ItemEnvelope, RunReport, TableBatch, WriteMode};
use crate::utils::error::Result;
use chrono::Utc;

/// 追蹤代碼的來源表與價格資料的目標表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceHistoryTarget {
    pub name: String,
    pub tracking_table: String,
    pub target_table: String,
}

impl PriceHistoryTarget {
    pub fn tracked_products(tables: &TableConfig) -> Self {
        Self {
            name: "price-history".to_string(),
            tracking_table: tables.tracked_products.clone(),
            target_table: tables.price_history.clone(),
        }
    }

    pub fn after_ranking(tables: &TableConfig) -> Self {
        Self {
            name: "price-history-after-ranking".to_string(),
            tracking_table: tables.tracked_ranking_items.clone(),
            target_table: tables.price_history_after_ranking.clone(),
        }
    }
}

/// 追蹤商品價格：逐一查詢，整批 insert（只追加）
pub struct PriceHistoryPipeline<S: ItemSource, K: Sink> {
    reader: SourceReader<S>,
    writer: SinkWriter<K>,
    target: PriceHistoryTarget,
}

impl<S: ItemSource, K: Sink> PriceHistoryPipeline<S, K> {
    pub fn new(source: S, sink: K, throttle: Throttle, target: PriceHistoryTarget) -> Self {
        Self {
            reader: SourceReader::new(source, throttle),
            writer: SinkWriter::new(sink),
            target,
        }
    }

    pub fn from_config(source: S, sink: K, config: &SyncConfig, target: PriceHistoryTarget) -> Self {
        Self::new(
            source,
            sink,
            Throttle::new(config.rate_limit.interval()),
            target,
        )
    }
}

#[async_trait::async_trait]
impl<S: ItemSource, K: Sink> Pipeline for PriceHistoryPipeline<S, K> {
    fn name(&self) -> &str {
        &self.target.name
    }

    async fn extract(&self) -> Result<ExtractResult> {
        let read = read_tracked_codes(self.writer.sink(), &self.target.tracking_table).await;
        let mut result = ExtractResult {
            failed_reads: usize::from(read.is_failed()),
            ..Default::default()
        };

        let codes = read.into_codes();
        if codes.is_empty() {
            tracing::warn!(
                "No tracked item codes in {}, skipping lookups",
                self.target.tracking_table
            );
            return Ok(result);
        }

        for code in &codes {
            let outcome = self.reader.item(code).await;
            result.fetch_calls += 1;
            if outcome.is_failed() {
                result.failed_fetches += 1;
            }
            result.items.extend(outcome.into_items());
        }

        tracing::info!(
            "Looked up {} tracked codes: {} items, {} failures",
            codes.len(),
            result.items.len(),
            result.failed_fetches
        );
        Ok(result)
    }

    async fn transform(&self, items: Vec<ItemEnvelope>) -> Result<TransformResult> {
        let rows: Vec<_> = items
            .iter()
            .map(|envelope| map_price_history_row(&envelope.item, Utc::now()))
            .collect();
        tracing::info!("Mapped {} price rows", rows.len());

        Ok(TransformResult {
            batches: vec![TableBatch::new(
                &self.target.target_table,
                WriteMode::Insert,
                rows,
            )],
        })
    }

    async fn load(&self, result: TransformResult) -> Result<RunReport> {
        Ok(load_batches(&self.writer, self.name(), result).await)
    }
}
