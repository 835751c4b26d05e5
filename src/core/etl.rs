use crate::core::Pipeline;
use crate::domain::model::RunReport;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// 執行一次 extract → transform → load；沒有抓到資料或沒有產生資料列時提前成功結束
    pub async fn run(&self) -> Result<RunReport> {
        let name = self.pipeline.name().to_string();
        tracing::info!("=== {} sync started ===", name);

        let extracted = self.pipeline.extract().await?;
        let mut report = RunReport::new(&name);
        report.fetched_items = extracted.items.len();
        report.fetch_calls = extracted.fetch_calls;
        report.failed_fetches = extracted.failed_fetches;
        report.failed_reads = extracted.failed_reads;

        if extracted.items.is_empty() {
            tracing::warn!("No items fetched for {}, nothing to write", name);
            return Ok(report);
        }
        tracing::info!("Extracted {} items", extracted.items.len());

        let transformed = self.pipeline.transform(extracted.items).await?;
        tracing::info!("Transformed into {} rows", transformed.total_rows());

        if transformed.total_rows() == 0 {
            tracing::warn!("No rows produced for {}, nothing to write", name);
            return Ok(report);
        }

        let loaded = self.pipeline.load(transformed).await?;
        report.writes = loaded.writes;

        tracing::info!(
            "=== {} sync finished: {} rows written, {} failed fetches ===",
            name,
            report.rows_written(),
            report.failed_fetches
        );
        Ok(report)
    }
}
