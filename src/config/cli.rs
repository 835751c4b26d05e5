use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "rakuten-etl")]
#[command(about = "Sync Rakuten Ichiba ranking and item data into Supabase")]
pub struct CliArgs {
    /// Path to a TOML config file; credentials are read from the environment when omitted
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit JSON logs (implied when GITHUB_ACTIONS=true)
    #[arg(long)]
    pub json_logs: bool,

    /// Exit with status 2 when any fetch or write failed
    #[arg(long)]
    pub strict: bool,

    #[command(subcommand)]
    pub job: Job,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Job {
    /// Upsert the current ranking into the ranking snapshot table
    Ranking,
    /// Append price rows for codes tracked in the products table
    PriceHistory,
    /// Append price rows for codes that previously entered the ranking
    PriceHistoryAfterRanking,
    /// Store detail, image and tag rows for every ranked item
    ItemDetail,
}
