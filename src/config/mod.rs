#[cfg(feature = "cli")]
pub mod cli;
pub mod sync_config;

#[cfg(feature = "cli")]
pub use cli::{CliArgs, Job};
pub use sync_config::{RakutenConfig, RateLimitConfig, SupabaseConfig, SyncConfig, TableConfig};
