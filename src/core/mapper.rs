//! Rakuten 商品 → 扁平資料列
//!
//! 這裡全是純函式：輸入原始 `Item` 物件，輸出資料列。型別轉換不會失敗，
//! 缺少或格式錯誤的欄位會退回 `0`、`0.0`、`false`、`"[]"`，或原樣帶過（包含 `null`）。

use crate::domain::model::{Record, Row};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// 來源欄位 → 資料列欄位，原樣複製
const PASSTHROUGH_COLUMNS: &[(&str, &str)] = &[
    ("itemCode", "item_code"),
    ("itemName", "item_name"),
    ("itemCaption", "item_caption"),
    ("catchcopy", "catchcopy"),
    ("itemPriceBaseField", "item_price_base_field"),
    ("itemUrl", "item_url"),
    ("affiliateUrl", "affiliate_url"),
    ("availability", "availability"),
    ("pointRate", "point_rate"),
    ("reviewCount", "review_count"),
    ("shopCode", "shop_code"),
    ("shopName", "shop_name"),
    ("shopUrl", "shop_url"),
    ("genreId", "genre_id"),
];

const INTEGER_COLUMNS: &[(&str, &str)] = &[
    ("itemPrice", "item_price"),
    ("itemPriceMin1", "item_price_min1"),
    ("itemPriceMin2", "item_price_min2"),
    ("itemPriceMin3", "item_price_min3"),
    ("itemPriceMax1", "item_price_max1"),
    ("itemPriceMax2", "item_price_max2"),
    ("itemPriceMax3", "item_price_max3"),
];

const FLOAT_COLUMNS: &[(&str, &str)] = &[
    ("affiliateRate", "affiliate_rate"),
    ("reviewAverage", "review_average"),
];

const FLAG_COLUMNS: &[(&str, &str)] = &[
    ("creditCardFlag", "credit_card_flag"),
    ("postageFlag", "postage_flag"),
    ("taxFlag", "tax_flag"),
];

const IMAGE_COLUMNS: &[(&str, &str)] = &[
    ("mediumImageUrls", "medium_image_urls"),
    ("smallImageUrls", "small_image_urls"),
];

pub fn coerce_int(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

pub fn coerce_float(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Rakuten 的旗標是 0/1
pub fn coerce_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => {
            let s = s.trim();
            !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
        }
        _ => false,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImageEntry {
    Plain(String),
    Wrapped {
        #[serde(rename = "imageUrl")]
        image_url: String,
    },
}

/// 接受 `[{"imageUrl": ".."}]`（formatVersion 1）與 `[".."]`（formatVersion 2），
/// 其他形狀的元素會被略過，順序不變
pub fn image_urls(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| serde_json::from_value::<ImageEntry>(entry.clone()).ok())
        .map(|entry| match entry {
            ImageEntry::Plain(url) => url,
            ImageEntry::Wrapped { image_url } => image_url,
        })
        .collect()
}

/// JSON 陣列字串，例如 `["https://..."]`
pub fn encode_image_urls(urls: &[String]) -> String {
    Value::from(urls.to_vec()).to_string()
}

pub fn decode_image_urls(encoded: &str) -> Vec<String> {
    serde_json::from_str(encoded).unwrap_or_default()
}

fn item_columns(item: &Record, captured_at: DateTime<Utc>) -> Row {
    let mut row = Row::new();

    for (source, column) in PASSTHROUGH_COLUMNS {
        row.set(column, item.get(source).cloned().unwrap_or(Value::Null));
    }
    for (source, column) in INTEGER_COLUMNS {
        row.set(column, coerce_int(item.get(source)));
    }
    for (source, column) in FLOAT_COLUMNS {
        row.set(column, coerce_float(item.get(source)));
    }
    for (source, column) in FLAG_COLUMNS {
        row.set(column, coerce_flag(item.get(source)));
    }
    for (source, column) in IMAGE_COLUMNS {
        row.set(column, encode_image_urls(&image_urls(item.get(source))));
    }

    row.set("timestamp", captured_at.to_rfc3339());
    row
}

/// 排行榜快照列：共用欄位再加上 `rank`
pub fn map_ranking_row(item: &Record, captured_at: DateTime<Utc>) -> Row {
    let mut row = item_columns(item, captured_at);
    row.set("rank", item.get("rank").cloned().unwrap_or(Value::Null));
    row
}

pub fn map_price_history_row(item: &Record, captured_at: DateTime<Utc>) -> Row {
    item_columns(item, captured_at)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDetailRows {
    pub detail: Row,
    pub images: Vec<Row>,
    pub tags: Vec<Row>,
}

/// 明細列，每個圖片網址一列（`size` = `small` | `medium`），每個標籤一列
pub fn map_item_detail(item: &Record, captured_at: DateTime<Utc>) -> ItemDetailRows {
    let item_code = item.get("itemCode").cloned().unwrap_or(Value::Null);
    let timestamp = captured_at.to_rfc3339();

    let mut detail = Row::new();
    detail.set("item_code", item_code.clone());
    detail.set("item_name", item.get("itemName").cloned().unwrap_or(Value::Null));
    detail.set("item_caption", item.get("itemCaption").cloned().unwrap_or(Value::Null));
    detail.set("item_price", coerce_int(item.get("itemPrice")));
    detail.set("shop_name", item.get("shopName").cloned().unwrap_or(Value::Null));
    detail.set("timestamp", timestamp.clone());

    let mut images = Vec::new();
    for (size, source) in [("small", "smallImageUrls"), ("medium", "mediumImageUrls")] {
        for url in image_urls(item.get(source)) {
            let mut row = Row::new();
            row.set("item_code", item_code.clone());
            row.set("size", size);
            row.set("image_url", url);
            row.set("timestamp", timestamp.clone());
            images.push(row);
        }
    }

    let tags = match item.get("tagIds") {
        Some(Value::Array(ids)) => ids
            .iter()
            .map(|tag_id| {
                let mut row = Row::new();
                row.set("item_code", item_code.clone());
                row.set("tag_id", tag_id.clone());
                row.set("timestamp", timestamp.clone());
                row
            })
            .collect(),
        _ => Vec::new(),
    };

    ItemDetailRows {
        detail,
        images,
        tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 19, 9, 30, 0).unwrap()
    }

    fn full_item() -> Record {
        Record::from(json!({
            "rank": 3,
            "itemCode": "shop:10000123",
            "itemName": "緑茶 500ml",
            "itemCaption": "caption",
            "catchcopy": "送料無料",
            "itemPrice": 2980,
            "itemPriceBaseField": "item_price_min3",
            "itemPriceMin1": 2980,
            "itemPriceMin2": "2500",
            "itemPriceMin3": 2480.0,
            "itemPriceMax1": 3000,
            "itemPriceMax2": 3100,
            "itemPriceMax3": 3200,
            "itemUrl": "https://item.rakuten.co.jp/shop/10000123/",
            "affiliateUrl": "",
            "affiliateRate": "4.0",
            "availability": 1,
            "creditCardFlag": 1,
            "postageFlag": 0,
            "taxFlag": 0,
            "pointRate": 1,
            "reviewAverage": 4.52,
            "reviewCount": 812,
            "shopCode": "shop",
            "shopName": "Shop",
            "shopUrl": "https://www.rakuten.co.jp/shop/",
            "genreId": "100316",
            "mediumImageUrls": [
                {"imageUrl": "https://thumbnail.image.rakuten.co.jp/m1.jpg"},
                {"imageUrl": "https://thumbnail.image.rakuten.co.jp/m2.jpg"}
            ],
            "smallImageUrls": [
                {"imageUrl": "https://thumbnail.image.rakuten.co.jp/s1.jpg"}
            ],
            "tagIds": [1000901, 1000902]
        }))
    }

    #[test]
    fn test_ranking_row_field_mapping() {
        let row = map_ranking_row(&full_item(), at());

        assert_eq!(row.get("rank"), Some(&json!(3)));
        assert_eq!(row.get_str("item_code"), Some("shop:10000123"));
        assert_eq!(row.get("item_price"), Some(&json!(2980)));
        assert_eq!(row.get("item_price_min2"), Some(&json!(2500)));
        assert_eq!(row.get("item_price_min3"), Some(&json!(2480)));
        assert_eq!(row.get("affiliate_rate"), Some(&json!(4.0)));
        assert_eq!(row.get("review_average"), Some(&json!(4.52)));
        assert_eq!(row.get("credit_card_flag"), Some(&json!(true)));
        assert_eq!(row.get("postage_flag"), Some(&json!(false)));
        assert_eq!(row.get("genre_id"), Some(&json!("100316")));
        assert_eq!(row.get_str("timestamp"), Some("2025-05-19T09:30:00+00:00"));
        assert_eq!(row.columns.len(), 30);
    }

    #[test]
    fn test_price_history_row_has_no_rank() {
        let row = map_price_history_row(&full_item(), at());
        assert!(row.get("rank").is_none());
        assert_eq!(row.columns.len(), 29);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let row = map_ranking_row(&Record::from(json!({"itemCode": "shop:1"})), at());

        for column in [
            "item_price",
            "item_price_min1",
            "item_price_min2",
            "item_price_min3",
            "item_price_max1",
            "item_price_max2",
            "item_price_max3",
        ] {
            assert_eq!(row.get(column), Some(&json!(0)), "{column}");
        }
        assert_eq!(row.get("affiliate_rate"), Some(&json!(0.0)));
        assert_eq!(row.get("review_average"), Some(&json!(0.0)));
        assert_eq!(row.get("tax_flag"), Some(&json!(false)));
        assert_eq!(row.get("item_name"), Some(&Value::Null));
        assert_eq!(row.get_str("medium_image_urls"), Some("[]"));
        assert_eq!(row.get_str("timestamp"), Some("2025-05-19T09:30:00+00:00"));
    }

    #[test]
    fn test_malformed_values_are_defaulted() {
        let item = Record::from(json!({
            "itemCode": "shop:1",
            "itemPrice": "not a price",
            "itemPriceMax1": null,
            "reviewAverage": {"nested": true},
            "creditCardFlag": "0",
            "smallImageUrls": "https://not-a-list"
        }));
        let row = map_price_history_row(&item, at());

        assert_eq!(row.get("item_price"), Some(&json!(0)));
        assert_eq!(row.get("item_price_max1"), Some(&json!(0)));
        assert_eq!(row.get("review_average"), Some(&json!(0.0)));
        assert_eq!(row.get("credit_card_flag"), Some(&json!(false)));
        assert_eq!(row.get_str("small_image_urls"), Some("[]"));
    }

    #[test]
    fn test_item_code_is_passed_through_verbatim() {
        for code in [json!("shop:abc-01"), json!(" spaced "), json!(12345)] {
            let item = Record::from(json!({ "itemCode": code.clone() }));
            assert_eq!(map_ranking_row(&item, at()).get("item_code"), Some(&code));
        }
    }

    #[test]
    fn test_image_urls_keep_order_through_encoding() {
        let row = map_ranking_row(&full_item(), at());
        let decoded = decode_image_urls(row.get_str("medium_image_urls").unwrap());

        assert_eq!(
            decoded,
            vec![
                "https://thumbnail.image.rakuten.co.jp/m1.jpg".to_string(),
                "https://thumbnail.image.rakuten.co.jp/m2.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn test_image_urls_accept_plain_strings() {
        let urls = image_urls(Some(&json!(["a.jpg", {"imageUrl": "b.jpg"}, 7, "c.jpg"])));
        assert_eq!(urls, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn test_item_detail_rows() {
        let rows = map_item_detail(&full_item(), at());

        assert_eq!(rows.detail.get_str("item_code"), Some("shop:10000123"));
        assert_eq!(rows.detail.get("item_price"), Some(&json!(2980)));
        assert_eq!(rows.detail.get_str("shop_name"), Some("Shop"));

        let sizes: Vec<&str> = rows.images.iter().filter_map(|r| r.get_str("size")).collect();
        assert_eq!(sizes, vec!["small", "medium", "medium"]);
        assert_eq!(
            rows.images[0].get_str("image_url"),
            Some("https://thumbnail.image.rakuten.co.jp/s1.jpg")
        );

        assert_eq!(rows.tags.len(), 2);
        assert_eq!(rows.tags[1].get("tag_id"), Some(&json!(1000902)));
        assert!(rows
            .images
            .iter()
            .chain(rows.tags.iter())
            .all(|r| r.get_str("timestamp") == Some("2025-05-19T09:30:00+00:00")));
    }

    #[test]
    fn test_item_detail_without_images_or_tags() {
        let rows = map_item_detail(&Record::from(json!({"itemCode": "shop:1"})), at());
        assert!(rows.images.is_empty());
        assert!(rows.tags.is_empty());
        assert_eq!(rows.detail.get("item_price"), Some(&json!(0)));
    }
}
