use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Rakuten 回傳的原始商品物件（`Item` 內層），欄位保持原樣；非物件一律視為空物件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// 只有字串型別的 itemCode 才視為有效
    pub fn item_code(&self) -> Option<&str> {
        self.data
            .get("itemCode")
            .and_then(Value::as_str)
            .filter(|code| !code.is_empty())
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(data) => Self { data },
            _ => Self::default(),
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.data)
    }
}

/// `Items[*]` 的外層包裝；單筆格式錯誤不影響整頁
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct ItemEnvelope {
    pub item: Record,
}

impl From<Value> for ItemEnvelope {
    fn from(value: Value) -> Self {
        let item = match value {
            Value::Object(mut wrapper) => wrapper.remove("Item").map(Record::from),
            _ => None,
        };
        Self {
            item: item.unwrap_or_default(),
        }
    }
}

impl From<ItemEnvelope> for Value {
    fn from(envelope: ItemEnvelope) -> Self {
        serde_json::json!({ "Item": Value::from(envelope.item) })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemsResponse {
    #[serde(rename = "Items", default, deserialize_with = "null_as_empty")]
    pub items: Vec<ItemEnvelope>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<ItemEnvelope>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ItemEnvelope>>::deserialize(deserializer)?.unwrap_or_default())
}

/// 寫入 sink 的扁平資料列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    pub columns: Map<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &str, value: impl Into<Value>) {
        self.columns.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.columns.get(column).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// 依遠端資料表的主鍵冪等
    Upsert,
    /// 只追加
    Insert,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Upsert => write!(f, "upsert"),
            WriteMode::Insert => write!(f, "insert"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableBatch {
    pub table: String,
    pub mode: WriteMode,
    pub rows: Vec<Row>,
}

impl TableBatch {
    pub fn new(table: impl Into<String>, mode: WriteMode, rows: Vec<Row>) -> Self {
        Self {
            table: table.into(),
            mode,
            rows,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractResult {
    pub items: Vec<ItemEnvelope>,
    pub fetch_calls: usize,
    pub failed_fetches: usize,
    /// 追蹤資料表讀取失敗的次數
    pub failed_reads: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub batches: Vec<TableBatch>,
}

impl TransformResult {
    pub fn total_rows(&self) -> usize {
        self.batches.iter().map(|b| b.rows.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Fetched(Vec<ItemEnvelope>),
    Failed { reason: String },
}

impl FetchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed { .. })
    }

    /// 失敗時回傳空清單
    pub fn into_items(self) -> Vec<ItemEnvelope> {
        match self {
            FetchOutcome::Fetched(items) => items,
            FetchOutcome::Failed { .. } => Vec::new(),
        }
    }
}

/// 追蹤資料表的讀取結果，失敗與空表要能區分
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Read(Vec<String>),
    Failed { reason: String },
}

impl ReadOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ReadOutcome::Failed { .. })
    }

    pub fn into_codes(self) -> Vec<String> {
        match self {
            ReadOutcome::Read(codes) => codes,
            ReadOutcome::Failed { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// 空批次，沒有發出任何遠端呼叫
    Skipped,
    Written { rows: usize },
    Failed { reason: String },
}

impl WriteOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, WriteOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub pipeline: String,
    pub fetched_items: usize,
    pub fetch_calls: usize,
    pub failed_fetches: usize,
    pub failed_reads: usize,
    pub writes: Vec<(String, WriteOutcome)>,
}

impl RunReport {
    pub fn new(pipeline: impl Into<String>) -> Self {
        Self {
            pipeline: pipeline.into(),
            ..Default::default()
        }
    }

    pub fn rows_written(&self) -> usize {
        self.writes
            .iter()
            .map(|(_, outcome)| match outcome {
                WriteOutcome::Written { rows } => *rows,
                _ => 0,
            })
            .sum()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_fetches > 0
            || self.failed_reads > 0
            || self.writes.iter().any(|(_, o)| o.is_failed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_items_response_parses_envelopes() {
        let body = json!({
            "Items": [
                {"Item": {"itemCode": "shop:1", "rank": 1}},
                {"Item": {"itemCode": "shop:2", "rank": 2}}
            ],
            "title": "ranking"
        });
        let response: ItemsResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.items.len(), 2);
        assert_eq!(response.items[1].item.item_code(), Some("shop:2"));
    }

    #[test]
    fn test_items_response_without_items_key() {
        let response: ItemsResponse = serde_json::from_value(json!({"count": 0})).unwrap();
        assert!(response.items.is_empty());

        let response: ItemsResponse = serde_json::from_value(json!({"Items": null})).unwrap();
        assert!(response.items.is_empty());
    }

    #[test]
    fn test_malformed_envelopes_do_not_fail_the_page() {
        let body = json!({
            "Items": [
                {"Item": {"itemCode": "shop:1"}},
                {"Item": null},
                {"Item": "oops"},
                42,
                {"NotItem": {}},
                {"Item": {"itemCode": "shop:3"}}
            ]
        });
        let response: ItemsResponse = serde_json::from_value(body).unwrap();

        assert_eq!(response.items.len(), 6);
        assert_eq!(response.items[0].item.item_code(), Some("shop:1"));
        assert!(response.items[1..5].iter().all(|e| e.item == Record::default()));
        assert_eq!(response.items[5].item.item_code(), Some("shop:3"));
    }

    #[test]
    fn test_record_serializes_as_plain_object() {
        let record = Record::from(json!({"itemCode": "shop:1"}));
        assert_eq!(serde_json::to_value(&record).unwrap(), json!({"itemCode": "shop:1"}));
    }

    #[test]
    fn test_read_outcome_failure_is_distinct_from_empty() {
        assert!(!ReadOutcome::Read(Vec::new()).is_failed());
        let failed = ReadOutcome::Failed {
            reason: "HTTP 401".to_string(),
        };
        assert!(failed.is_failed());
        assert!(failed.into_codes().is_empty());
    }

    #[test]
    fn test_item_code_requires_non_empty_string() {
        assert_eq!(Record::from(json!({"itemCode": ""})).item_code(), None);
        assert_eq!(Record::from(json!({"itemCode": 42})).item_code(), None);
        assert_eq!(Record::from(json!({})).item_code(), None);
    }

    #[test]
    fn test_report_failures() {
        let mut report = RunReport::new("ranking");
        report.writes.push(("t".to_string(), WriteOutcome::Written { rows: 3 }));
        assert!(!report.has_failures());
        assert_eq!(report.rows_written(), 3);

        report.writes.push((
            "u".to_string(),
            WriteOutcome::Failed {
                reason: "boom".to_string(),
            },
        ));
        assert!(report.has_failures());
    }

    #[test]
    fn test_report_counts_failed_reads() {
        let mut report = RunReport::new("price-history");
        assert!(!report.has_failures());
        report.failed_reads = 1;
        assert!(report.has_failures());
    }
}
