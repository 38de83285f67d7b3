use std::path::PathBuf;
use std::time::Duration;

use emp_common::error::AppError;
use emp_decoders::pricefeed::{InversionPredicate, PriceFeedRegistry};
use emp_engine::view::{Panel, SponsorRiskView};

use crate::snapshot::parse_snapshot;

/// Where rendered panels are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartOutput {
    Stdout,
    File(PathBuf),
}

/// Snapshot poller that re-renders the sponsor panel whenever the provider
/// snapshot changes.
pub struct SnapshotPoller<P = PriceFeedRegistry> {
    snapshot_path: PathBuf,
    output: ChartOutput,
    poll_interval: Duration,
    view: SponsorRiskView<P>,
    /// Raw snapshot bytes and toggle state of the last render.
    last_render: Option<(Vec<u8>, bool)>,
}

impl<P: InversionPredicate> SnapshotPoller<P> {
    pub fn new(
        snapshot_path: PathBuf,
        output: ChartOutput,
        poll_interval_ms: u64,
        view: SponsorRiskView<P>,
    ) -> Self {
        Self {
            snapshot_path,
            output,
            poll_interval: Duration::from_millis(poll_interval_ms),
            view,
            last_render: None,
        }
    }

    pub fn view(&self) -> &SponsorRiskView<P> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut SponsorRiskView<P> {
        &mut self.view
    }

    /// Read, render and write the current snapshot unconditionally.
    pub async fn render_once(&mut self) -> Result<Panel, AppError> {
        let bytes = tokio::fs::read(&self.snapshot_path).await?;
        self.render_bytes(bytes).await
    }

    /// Render only if the snapshot or the log-scale toggle changed since the
    /// last render.
    ///
    /// Returns `Ok(None)` when neither changed.
    pub async fn poll(&mut self) -> Result<Option<Panel>, AppError> {
        let bytes = tokio::fs::read(&self.snapshot_path).await?;
        let log_scale = self.view.log_scale();
        if self
            .last_render
            .as_ref()
            .is_some_and(|(last, last_log_scale)| *last == bytes && *last_log_scale == log_scale)
        {
            return Ok(None);
        }
        self.render_bytes(bytes).await.map(Some)
    }

    /// Start the polling loop. Runs until the task is cancelled.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        tracing::info!(
            snapshot = %self.snapshot_path.display(),
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Snapshot poller started"
        );

        let mut interval = tokio::time::interval(self.poll_interval);
        loop {
            interval.tick().await;

            match self.poll().await {
                Ok(Some(panel)) => {
                    tracing::info!(ready = matches!(panel, Panel::Chart { .. }), "Rendered sponsor panel");
                }
                Ok(None) => {}
                Err(e) => {
                    // Snapshot may be mid-write, retry on the next tick
                    tracing::warn!(
                        snapshot = %self.snapshot_path.display(),
                        error = %e,
                        "Failed to render snapshot, retrying"
                    );
                }
            }
        }
    }

    async fn render_bytes(&mut self, bytes: Vec<u8>) -> Result<Panel, AppError> {
        let snapshot = parse_snapshot(&bytes)?;
        let panel = self.view.render(&snapshot);
        self.write(&panel).await?;
        self.last_render = Some((bytes, self.view.log_scale()));
        Ok(panel)
    }

    async fn write(&self, panel: &Panel) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(panel)?;
        match &self.output {
            ChartOutput::Stdout => println!("{json}"),
            ChartOutput::File(path) => tokio::fs::write(path, json).await?,
        }
        Ok(())
    }
}
