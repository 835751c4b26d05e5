pub mod item_detail;
pub mod price_history;
pub mod ranking;

pub use item_detail::ItemDetailPipeline;
pub use price_history::{PriceHistoryPipeline, PriceHistoryTarget};
pub use ranking::RankingSnapshotPipeline;

use crate::core::sink_writer::SinkWriter;
use crate::core::{Sink, TransformResult};
use crate::domain::model::RunReport;

/// 各資料表各自一次寫入，彼此不保證原子性
pub(crate) async fn load_batches<K: Sink>(
    writer: &SinkWriter<K>,
    name: &str,
    result: TransformResult,
) -> RunReport {
    let mut report = RunReport::new(name);
    for batch in &result.batches {
        let outcome = writer.write(batch).await;
        report.writes.push((batch.table.clone(), outcome));
    }
    report
}
