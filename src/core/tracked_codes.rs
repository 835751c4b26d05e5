use crate::domain::model::ReadOutcome;
use crate::domain::ports::Sink;

/// 讀取 `table` 中已記錄的商品代碼；讀取失敗會記錄日誌並回傳 `Failed`
pub async fn read_tracked_codes<K: Sink>(sink: &K, table: &str) -> ReadOutcome {
    let rows = match sink.select(table, &["item_code"]).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("❌ Reading tracked codes from {} failed: {}", table, e);
            return ReadOutcome::Failed {
                reason: e.to_string(),
            };
        }
    };

    let total = rows.len();
    let codes: Vec<String> = rows
        .iter()
        .filter_map(|row| row.get_str("item_code"))
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect();

    if codes.len() < total {
        tracing::warn!(
            "Skipped {} rows without a usable item_code in {}",
            total - codes.len(),
            table
        );
    }
    tracing::info!("Read {} tracked item codes from {}", codes.len(), table);
    ReadOutcome::Read(codes)
}
