use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_secret, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_RANKING_ENDPOINT: &str =
    "https://app.rakuten.co.jp/services/api/IchibaItem/Ranking/20220601";
pub const DEFAULT_SEARCH_ENDPOINT: &str =
    "https://app.rakuten.co.jp/services/api/IchibaItem/Search/20220601";
pub const MAX_HITS: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub rakuten: RakutenConfig,
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub tables: TableConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RakutenConfig {
    pub application_id: String,
    #[serde(default = "default_ranking_endpoint")]
    pub ranking_endpoint: String,
    #[serde(default = "default_search_endpoint")]
    pub search_endpoint: String,
    #[serde(default = "default_hits")]
    pub hits: u32,
    pub timeout_seconds: Option<u64>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// 兩次單品查詢之間的最小間隔，0 表示不節流
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub ranking: String,
    pub price_history: String,
    pub price_history_after_ranking: String,
    pub tracked_products: String,
    pub tracked_ranking_items: String,
    pub item_detail: String,
    pub item_detail_image: String,
    pub item_detail_tag: String,
}

fn default_ranking_endpoint() -> String {
    DEFAULT_RANKING_ENDPOINT.to_string()
}

fn default_search_endpoint() -> String {
    DEFAULT_SEARCH_ENDPOINT.to_string()
}

fn default_hits() -> u32 {
    MAX_HITS
}

fn default_interval_ms() -> u64 {
    1000
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl RateLimitConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            ranking: "trn_rakuten_ranking".to_string(),
            price_history: "trn_rakuten_price_history".to_string(),
            price_history_after_ranking: "trn_rakuten_price_history_after_ranking".to_string(),
            tracked_products: "mst_products".to_string(),
            tracked_ranking_items: "mst_rakuten_items".to_string(),
            item_detail: "mst_item_detail".to_string(),
            item_detail_image: "mst_item_detail_image".to_string(),
            item_detail_tag: "mst_item_detail_tag".to_string(),
        }
    }
}

// 憑證不得出現在日誌中
impl std::fmt::Debug for RakutenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RakutenConfig")
            .field("application_id", &"<redacted>")
            .field("ranking_endpoint", &self.ranking_endpoint)
            .field("search_endpoint", &self.search_endpoint)
            .field("hits", &self.hits)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl SyncConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 只用環境變數組出配置
    pub fn from_env() -> Result<Self> {
        let required = |name: &str| {
            std::env::var(name).map_err(|_| EtlError::MissingConfigError {
                field: name.to_string(),
            })
        };

        let hits = match std::env::var("RAKUTEN_HITS") {
            Ok(raw) => raw.parse().map_err(|_| EtlError::InvalidConfigValueError {
                field: "RAKUTEN_HITS".to_string(),
                value: raw.clone(),
                reason: "Not an integer".to_string(),
            })?,
            Err(_) => default_hits(),
        };

        let interval_ms = match std::env::var("RATE_LIMIT_INTERVAL_MS") {
            Ok(raw) => raw.parse().map_err(|_| EtlError::InvalidConfigValueError {
                field: "RATE_LIMIT_INTERVAL_MS".to_string(),
                value: raw.clone(),
                reason: "Not an integer".to_string(),
            })?,
            Err(_) => default_interval_ms(),
        };

        Ok(Self {
            rakuten: RakutenConfig {
                application_id: required("RAKUTEN_APP_ID")?,
                ranking_endpoint: std::env::var("RAKUTEN_RANKING_ENDPOINT")
                    .unwrap_or_else(|_| default_ranking_endpoint()),
                search_endpoint: std::env::var("RAKUTEN_SEARCH_ENDPOINT")
                    .unwrap_or_else(|_| default_search_endpoint()),
                hits,
                timeout_seconds: None,
            },
            supabase: SupabaseConfig {
                url: required("SUPABASE_URL")?,
                key: required("SUPABASE_KEY")?,
                timeout_seconds: None,
            },
            rate_limit: RateLimitConfig { interval_ms },
            tables: TableConfig::default(),
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_secret("rakuten.application_id", &self.rakuten.application_id)?;
        validate_url("rakuten.ranking_endpoint", &self.rakuten.ranking_endpoint)?;
        validate_url("rakuten.search_endpoint", &self.rakuten.search_endpoint)?;
        validate_range("rakuten.hits", self.rakuten.hits, 1, MAX_HITS)?;

        validate_url("supabase.url", &self.supabase.url)?;
        validate_secret("supabase.key", &self.supabase.key)?;

        let tables = &self.tables;
        for (field, name) in [
            ("tables.ranking", &tables.ranking),
            ("tables.price_history", &tables.price_history),
            ("tables.price_history_after_ranking", &tables.price_history_after_ranking),
            ("tables.tracked_products", &tables.tracked_products),
            ("tables.tracked_ranking_items", &tables.tracked_ranking_items),
            ("tables.item_detail", &tables.item_detail),
            ("tables.item_detail_image", &tables.item_detail_image),
            ("tables.item_detail_tag", &tables.item_detail_tag),
        ] {
            validate_non_empty_string(field, name)?;
        }

        Ok(())
    }
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
