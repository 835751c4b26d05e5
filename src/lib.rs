pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{RakutenClient, SupabaseSink};
pub use app::pipelines::{
    ItemDetailPipeline, PriceHistoryPipeline, PriceHistoryTarget, RankingSnapshotPipeline,
};
pub use config::SyncConfig;
pub use core::etl::EtlEngine;
pub use domain::model::{FetchOutcome, RunReport, WriteOutcome};
pub use utils::error::{EtlError, Result};
