use crate::app::pipelines::load_batches;
use crate::config::SyncConfig;
use crate::core::mapper::map_ranking_row;
use crate::core::sink_writer::SinkWriter;
use crate::core::source_reader::SourceReader;
use crate::core::throttle::Throttle;
use crate::core::{ItemSource, Pipeline, Sink, TransformResult};
use crate::domain::model::{ExtractResult, ItemEnvelope, RunReport, TableBatch, WriteMode};
use crate::utils::error::Result;
use chrono::Utc;

/// 排行榜快照：一次抓取，整批 upsert
pub struct RankingSnapshotPipeline<S: ItemSource, K: Sink> {
    reader: SourceReader<S>,
    writer: SinkWriter<K>,
    table: String,
}

impl<S: ItemSource, K: Sink> RankingSnapshotPipeline<S, K> {
    pub fn new(source: S, sink: K, table: impl Into<String>) -> Self {
        Self {
            // 只有一次請求，不需要節流
            reader: SourceReader::new(source, Throttle::disabled()),
            writer: SinkWriter::new(sink),
            table: table.into(),
        }
    }

    pub fn from_config(source: S, sink: K, config: &SyncConfig) -> Self {
        Self::new(source, sink, config.tables.ranking.clone())
    }
}

#[async_trait::async_trait]
impl<S: ItemSource, K: Sink> Pipeline for RankingSnapshotPipeline<S, K> {
    fn name(&self) -> &str {
        "ranking"
    }

    async fn extract(&self) -> Result<ExtractResult> {
        let outcome = self.reader.ranking().await;
        let failed_fetches = usize::from(outcome.is_failed());

        Ok(ExtractResult {
            items: outcome.into_items(),
            fetch_calls: 1,
            failed_fetches,
            failed_reads: 0,
        })
    }

    async fn transform(&self, items: Vec<ItemEnvelope>) -> Result<TransformResult> {
        let rows: Vec<_> = items
            .iter()
            .map(|envelope| map_ranking_row(&envelope.item, Utc::now()))
            .collect();
        tracing::info!("Mapped {} ranking rows", rows.len());

        Ok(TransformResult {
            batches: vec![TableBatch::new(&self.table, WriteMode::Upsert, rows)],
        })
    }

    async fn load(&self, result: TransformResult) -> Result<RunReport> {
        Ok(load_batches(&self.writer, self.name(), result).await)
    }
}
