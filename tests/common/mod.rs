#![allow(dead_code)]

use rakuten_etl::config::{RakutenConfig, TableConfig};
use rakuten_etl::core::{ItemSource, Row, Sink};
use rakuten_etl::domain::model::ItemEnvelope;
use rakuten_etl::{EtlError, RakutenClient, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Upsert { table: String, rows: Vec<Row> },
    Insert { table: String, rows: Vec<Row> },
    Select { table: String, columns: Vec<String> },
}

/// 記錄所有呼叫的 Sink
#[derive(Clone, Default)]
pub struct RecordingSink {
    calls: Arc<Mutex<Vec<SinkCall>>>,
    selectable: Arc<Mutex<HashMap<String, Vec<Row>>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codes(self, table: &str, codes: &[&str]) -> Self {
        let rows = codes
            .iter()
            .map(|code| {
                let mut row = Row::new();
                row.set("item_code", *code);
                row
            })
            .collect();
        self.selectable.lock().unwrap().insert(table.to_string(), rows);
        self
    }

    pub fn failing_on(self, table: &str) -> Self {
        self.failing.lock().unwrap().insert(table.to_string());
        self
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<SinkCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, SinkCall::Select { .. }))
            .collect()
    }

    fn check(&self, table: &str) -> Result<()> {
        if self.failing.lock().unwrap().contains(table) {
            return Err(EtlError::SinkError {
                table: table.to_string(),
                message: "HTTP 503: unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl Sink for RecordingSink {
    async fn upsert(&self, table: &str, rows: &[Row]) -> Result<()> {
        self.calls.lock().unwrap().push(SinkCall::Upsert {
            table: table.to_string(),
            rows: rows.to_vec(),
        });
        self.check(table)
    }

    async fn insert(&self, table: &str, rows: &[Row]) -> Result<()> {
        self.calls.lock().unwrap().push(SinkCall::Insert {
            table: table.to_string(),
            rows: rows.to_vec(),
        });
        self.check(table)
    }

    async fn select(&self, table: &str, columns: &[&str]) -> Result<Vec<Row>> {
        self.calls.lock().unwrap().push(SinkCall::Select {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        self.check(table)?;
        Ok(self
            .selectable
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default())
    }
}

/// 不走網路的來源，記錄每次單品查詢的代碼與時間點
#[derive(Clone, Default)]
pub struct TimedSource {
    lookups: Arc<Mutex<Vec<(String, tokio::time::Instant)>>>,
}

impl TimedSource {
    pub fn lookups(&self) -> Vec<(String, tokio::time::Instant)> {
        self.lookups.lock().unwrap().clone()
    }
}

impl ItemSource for TimedSource {
    async fn fetch_ranking(&self) -> Result<Vec<ItemEnvelope>> {
        Ok(Vec::new())
    }

    async fn search_item(&self, item_code: &str) -> Result<Vec<ItemEnvelope>> {
        self.lookups
            .lock()
            .unwrap()
            .push((item_code.to_string(), tokio::time::Instant::now()));
        Ok(vec![ItemEnvelope::from(item(item_code, 100))])
    }
}

pub fn rakuten_client(base_url: &str) -> RakutenClient {
    RakutenClient::new(RakutenConfig {
        application_id: "test-app".to_string(),
        ranking_endpoint: format!("{}/ranking", base_url),
        search_endpoint: format!("{}/search", base_url),
        hits: 100,
        timeout_seconds: Some(5),
    })
}

pub fn tables() -> TableConfig {
    TableConfig::default()
}

pub fn item(code: &str, price: i64) -> serde_json::Value {
    serde_json::json!({
        "Item": {
            "itemCode": code,
            "itemName": format!("Item {}", code),
            "itemCaption": "caption",
            "itemPrice": price,
            "shopName": "Test Shop",
            "affiliateRate": "4.0",
            "reviewAverage": "4.25",
            "creditCardFlag": 1,
            "mediumImageUrls": [{"imageUrl": format!("https://img.example/{}/m.jpg", code)}],
            "smallImageUrls": [{"imageUrl": format!("https://img.example/{}/s.jpg", code)}],
            "tagIds": [1000901]
        }
    })
}
