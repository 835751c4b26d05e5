use crate::domain::model::{TableBatch, WriteMode, WriteOutcome};
use crate::domain::ports::Sink;

/// 每個批次一次遠端呼叫；空批次不呼叫，失敗只記錄日誌並丟棄該批次
pub struct SinkWriter<K: Sink> {
    sink: K,
}

impl<K: Sink> SinkWriter<K> {
    pub fn new(sink: K) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub async fn write(&self, batch: &TableBatch) -> WriteOutcome {
        if batch.rows.is_empty() {
            tracing::info!("Nothing to {} into {}, skipping", batch.mode, batch.table);
            return WriteOutcome::Skipped;
        }

        let result = match batch.mode {
            WriteMode::Upsert => self.sink.upsert(&batch.table, &batch.rows).await,
            WriteMode::Insert => self.sink.insert(&batch.table, &batch.rows).await,
        };

        match result {
            Ok(()) => {
                tracing::info!(
                    "✅ {} {} rows into {}",
                    batch.mode,
                    batch.rows.len(),
                    batch.table
                );
                WriteOutcome::Written {
                    rows: batch.rows.len(),
                }
            }
            Err(e) => {
                tracing::error!(
                    "❌ {} into {} failed, dropping {} rows: {}",
                    batch.mode,
                    batch.table,
                    batch.rows.len(),
                    e
                );
                WriteOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
