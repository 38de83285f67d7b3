use tracing_subscriber::EnvFilter;

use emp_common::config::AppConfig;
use emp_decoders::pricefeed::PriceFeedRegistry;
use emp_engine::aggregator::SponsorRiskAggregator;
use emp_engine::view::SponsorRiskView;
use emp_dashboard::poller::{ChartOutput, SnapshotPoller};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Panels go to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emp_dashboard=info,emp_engine=debug".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    tracing::info!("EMP sponsor dashboard starting...");

    let config = AppConfig::from_env()?;

    let registry =
        PriceFeedRegistry::new().with_inverted_symbols(&config.inverted_price_symbols);
    let mut view = SponsorRiskView::new(SponsorRiskAggregator::new(registry));
    view.set_log_scale(config.log_scale);

    let output = config
        .chart_output_path
        .clone()
        .map(ChartOutput::File)
        .unwrap_or(ChartOutput::Stdout);

    let mut poller = SnapshotPoller::new(
        config.snapshot_path.clone(),
        output,
        config.snapshot_poll_interval_ms,
        view,
    );

    if !config.snapshot_watch {
        poller.render_once().await?;
        return Ok(());
    }

    // Run with graceful shutdown on Ctrl+C
    tokio::select! {
        result = poller.run() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Snapshot poller exited with error");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    tracing::info!("EMP sponsor dashboard stopped.");
    Ok(())
}
