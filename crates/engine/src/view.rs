//! Sponsor liquidation-price panel.
//!
//! Owns the logarithmic-scale toggle and turns a provider snapshot into either
//! the chart panel or the "connect first" prompt.

use serde::Serialize;

use emp_common::types::MonitorSnapshot;
use emp_decoders::pricefeed::{InversionPredicate, PriceFeedRegistry};

use crate::aggregator::{Aggregation, SponsorRiskAggregator};
use crate::chart::ChartSpec;

pub const PANEL_TITLE: &str = "EMP Token Sponsor Liquidation Prices";
pub const TOGGLE_LABEL: &str = "Logarithmic:";
pub const NOT_READY_MESSAGE: &str =
    "Please first connect and select an EMP from the dropdown above.";

/// What the panel displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Panel {
    Chart {
        title: &'static str,
        toggle_label: &'static str,
        log_scale: bool,
        chart: ChartSpec,
    },
    Prompt {
        message: &'static str,
    },
}

/// Panel state: the aggregator plus the logarithmic toggle (off by default).
pub struct SponsorRiskView<P = PriceFeedRegistry> {
    aggregator: SponsorRiskAggregator<P>,
    log_scale: bool,
}

impl<P: InversionPredicate> SponsorRiskView<P> {
    pub fn new(aggregator: SponsorRiskAggregator<P>) -> Self {
        Self {
            aggregator,
            log_scale: false,
        }
    }

    pub fn log_scale(&self) -> bool {
        self.log_scale
    }

    /// Change handler for the toggle.
    pub fn set_log_scale(&mut self, checked: bool) {
        if self.log_scale != checked {
            tracing::debug!(log_scale = checked, "Logarithmic scale toggled");
        }
        self.log_scale = checked;
    }

    pub fn toggle(&mut self) {
        self.set_log_scale(!self.log_scale);
    }

    /// Render the panel for a snapshot.
    pub fn render(&self, snapshot: &MonitorSnapshot) -> Panel {
        let collateral_symbol = snapshot.collateral_symbol.as_deref().unwrap_or_default();

        match self.aggregator.aggregate(
            snapshot.active_sponsors.as_ref(),
            &snapshot.price,
            collateral_symbol,
            self.log_scale,
        ) {
            Aggregation::Ready(chart) => Panel::Chart {
                title: PANEL_TITLE,
                toggle_label: TOGGLE_LABEL,
                log_scale: self.log_scale,
                chart,
            },
            Aggregation::NotReady => Panel::Prompt {
                message: NOT_READY_MESSAGE,
            },
        }
    }
}

impl Default for SponsorRiskView<PriceFeedRegistry> {
    fn default() -> Self {
        Self::new(SponsorRiskAggregator::default())
    }
}
