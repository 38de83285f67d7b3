pub mod aggregator;
pub mod chart;
pub mod view;

pub use aggregator::{Aggregation, ReferencePrice, SponsorRiskAggregator};
pub use chart::ChartSpec;
pub use view::{Panel, SponsorRiskView};
