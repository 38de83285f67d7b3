//! Chart configuration for the sponsor liquidation-price histogram.
//!
//! The structs serialize (camelCase) to the option object the dashboard's bar
//! chart renderer consumes, so the host can hand `ChartSpec` over verbatim.

use serde::Serialize;

use emp_common::types::AggregatedSponsor;
use emp_decoders::numeric::to_fixed;

use crate::aggregator::ReferencePrice;

/// Number of ticks on the liquidation-price axis.
pub const TICK_AMOUNT: u32 = 20;
/// Fixed lower bound of the liquidation-price axis.
pub const AXIS_MIN: f64 = 100.0;
/// Upper bound of the liquidation-price axis, relative to the reference price.
pub const AXIS_MAX_MULTIPLIER: f64 = 1.05;
/// Decimals kept in series values.
pub const SERIES_DECIMALS: usize = 2;
/// Rendered chart height in display units.
pub const CHART_HEIGHT: u32 = 550;

/// Complete renderer input: options, series, chart type and height.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub options: ChartOptions,
    pub series: Vec<Series>,
    #[serde(rename = "type")]
    pub chart_type: &'static str,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub annotations: Annotations,
    pub theme: Theme,
    pub chart: ChartStyle,
    pub xaxis: XAxis,
    pub yaxis: YAxis,
    pub plot_options: PlotOptions,
    pub data_labels: DataLabels,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotations {
    pub xaxis: Vec<XAxisAnnotation>,
}

/// Vertical marker on the liquidation-price axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XAxisAnnotation {
    pub x: f64,
    pub border_color: &'static str,
    pub label: AnnotationLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationLabel {
    pub style: LabelStyle,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelStyle {
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    pub palette: &'static str,
    pub mode: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartStyle {
    pub background: &'static str,
    pub stacked: bool,
    pub toolbar: Toolbar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toolbar {
    pub show: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XAxis {
    #[serde(rename = "type")]
    pub axis_type: &'static str,
    /// One bucket per sponsor, duplicates included
    pub categories: Vec<f64>,
    pub tick_amount: u32,
    pub min: f64,
    pub max: f64,
    pub title: AxisTitle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YAxis {
    pub logarithmic: bool,
    pub title: AxisTitle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisTitle {
    pub text: String,
    pub offset_y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotOptions {
    pub bar: BarOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarOptions {
    pub column_width: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataLabels {
    pub enabled: bool,
}

/// A bar series; values are pre-formatted display strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub data: Vec<String>,
}

/// Derive the chart configuration from aggregated sponsors.
pub fn build_chart(
    sponsors: &[AggregatedSponsor],
    reference: &ReferencePrice,
    collateral_symbol: &str,
    log_scale: bool,
) -> ChartSpec {
    let options = ChartOptions {
        annotations: Annotations {
            xaxis: vec![XAxisAnnotation {
                x: reference.value,
                border_color: "#fff",
                label: AnnotationLabel {
                    style: LabelStyle { color: "#434343" },
                    text: format!("Current {} Price", reference.identifier),
                },
            }],
        },
        theme: Theme {
            palette: "palette7",
            mode: "dark",
        },
        chart: ChartStyle {
            background: "#303030",
            stacked: true,
            toolbar: Toolbar { show: false },
        },
        xaxis: XAxis {
            axis_type: "numeric",
            categories: sponsors.iter().map(|s| s.bucket).collect(),
            tick_amount: TICK_AMOUNT,
            min: AXIS_MIN,
            max: reference.value * AXIS_MAX_MULTIPLIER,
            title: AxisTitle {
                text: "Liquidation Price".to_string(),
                offset_y: 15,
            },
        },
        yaxis: YAxis {
            logarithmic: log_scale,
            title: AxisTitle {
                text: format!("Position Collateral ({collateral_symbol})"),
                offset_y: 15,
            },
        },
        plot_options: PlotOptions {
            bar: BarOptions {
                column_width: "100%",
            },
        },
        data_labels: DataLabels { enabled: false },
    };

    let series = vec![Series {
        name: format!("collateral {collateral_symbol}"),
        data: sponsors
            .iter()
            .map(|s| to_fixed(s.collateral, SERIES_DECIMALS))
            .collect(),
    }];

    ChartSpec {
        options,
        series,
        chart_type: "bar",
        height: CHART_HEIGHT,
    }
}
