use clap::Parser;
use rakuten_etl::config::{CliArgs, Job};
use rakuten_etl::core::Pipeline;
use rakuten_etl::utils::{logger, validation::Validate};
use rakuten_etl::{
    EtlEngine, EtlError, ItemDetailPipeline, PriceHistoryPipeline, PriceHistoryTarget,
    RakutenClient, RankingSnapshotPipeline, RunReport, SupabaseSink, SyncConfig,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CliArgs::parse();

    if args.json_logs || logger::running_in_ci() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    tracing::debug!("Config: {:?}", config);

    let source = RakutenClient::new(config.rakuten.clone());
    let sink = SupabaseSink::new(config.supabase.clone());

    let result = match args.job {
        Job::Ranking => run(RankingSnapshotPipeline::from_config(source, sink, &config)).await,
        Job::PriceHistory => {
            let target = PriceHistoryTarget::tracked_products(&config.tables);
            run(PriceHistoryPipeline::from_config(source, sink, &config, target)).await
        }
        Job::PriceHistoryAfterRanking => {
            let target = PriceHistoryTarget::after_ranking(&config.tables);
            run(PriceHistoryPipeline::from_config(source, sink, &config, target)).await
        }
        Job::ItemDetail => run(ItemDetailPipeline::from_config(source, sink, &config)).await,
    };

    match result {
        Ok(report) => {
            log_report(&report);
            if args.strict && report.has_failures() {
                std::process::exit(2);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Sync failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 盡力而為：除非指定 --strict，否則仍以 0 結束
            if args.strict {
                std::process::exit(2);
            }
        }
    }
}

fn load_config(args: &CliArgs) -> Result<SyncConfig, EtlError> {
    let config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            SyncConfig::from_file(path)?
        }
        None => SyncConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

async fn run<P: Pipeline>(pipeline: P) -> Result<RunReport, EtlError> {
    EtlEngine::new(pipeline).run().await
}

fn log_report(report: &RunReport) {
    for (table, outcome) in &report.writes {
        tracing::info!("📊 {} → {}: {:?}", report.pipeline, table, outcome);
    }
    if report.has_failures() {
        tracing::warn!(
            "⚠️ {} finished with failures ({} failed fetches of {}, {} failed reads)",
            report.pipeline,
            report.failed_fetches,
            report.fetch_calls,
            report.failed_reads
        );
    } else {
        tracing::info!(
            "✅ {} finished: {} rows written from {} items",
            report.pipeline,
            report.rows_written(),
            report.fetched_items
        );
    }
}
