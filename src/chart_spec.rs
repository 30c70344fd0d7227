//! Mapping from widget configuration and colorized data to a renderable chart
//! description. Everything here is pure; renderers consume [`ChartSpec`].

use serde::Serialize;

use crate::data::ColorizedDataPoint;
use crate::widget::{ChartKind, WidgetConfig};

/// Upper bound of every radar axis.
pub const RADAR_FULL_MARK: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// A bar series. `corner_radius` is `[top-left, top-right, bottom-right, bottom-left]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarLayer {
    pub data: Vec<ColorizedDataPoint>,
    pub orientation: Orientation,
    pub stacked: bool,
    pub corner_radius: [f64; 4],
}

impl BarLayer {
    fn new(data: Vec<ColorizedDataPoint>, orientation: Orientation, stacked: bool, r: f64) -> Self {
        // Only the outer end of a bar is rounded.
        let corner_radius = match orientation {
            Orientation::Vertical => [r, r, 0.0, 0.0],
            Orientation::Horizontal => [0.0, r, r, 0.0],
        };
        Self {
            data,
            orientation,
            stacked,
            corner_radius,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    /// 1-based position in the filtered data.
    pub x: f64,
    pub y: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarPoint {
    pub subject: String,
    pub a: f64,
    pub full_mark: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreemapCell {
    pub name: String,
    pub size: f64,
    pub fill: String,
}

/// One chart, ready to draw. Serializes tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ChartSpec {
    Pie {
        data: Vec<ColorizedDataPoint>,
        outer_radius: f64,
    },
    Donut {
        data: Vec<ColorizedDataPoint>,
        outer_radius: f64,
        inner_radius: f64,
    },
    Bar(BarLayer),
    HorizontalBar(BarLayer),
    StackedBar(BarLayer),
    Line {
        data: Vec<ColorizedDataPoint>,
    },
    Area {
        data: Vec<ColorizedDataPoint>,
    },
    Scatter {
        points: Vec<ScatterPoint>,
    },
    Radar {
        points: Vec<RadarPoint>,
    },
    Funnel {
        data: Vec<ColorizedDataPoint>,
    },
    Treemap {
        cells: Vec<TreemapCell>,
    },
    Composed {
        bar: BarLayer,
        line: Vec<ColorizedDataPoint>,
    },
}

impl ChartSpec {
    pub fn kind(&self) -> ChartKind {
        match self {
            Self::Pie { .. } => ChartKind::Pie,
            Self::Donut { .. } => ChartKind::Donut,
            Self::Bar(_) => ChartKind::Bar,
            Self::HorizontalBar(_) => ChartKind::HorizontalBar,
            Self::StackedBar(_) => ChartKind::StackedBar,
            Self::Line { .. } => ChartKind::Line,
            Self::Area { .. } => ChartKind::Area,
            Self::Scatter { .. } => ChartKind::Scatter,
            Self::Radar { .. } => ChartKind::Radar,
            Self::Funnel { .. } => ChartKind::Funnel,
            Self::Treemap { .. } => ChartKind::Treemap,
            Self::Composed { .. } => ChartKind::Composed,
        }
    }

    /// Number of data points in the chart's primary series.
    pub fn len(&self) -> usize {
        match self {
            Self::Pie { data, .. }
            | Self::Donut { data, .. }
            | Self::Line { data }
            | Self::Area { data }
            | Self::Funnel { data } => data.len(),
            Self::Bar(layer) | Self::HorizontalBar(layer) | Self::StackedBar(layer) => {
                layer.data.len()
            }
            Self::Composed { bar, .. } => bar.data.len(),
            Self::Scatter { points } => points.len(),
            Self::Radar { points } => points.len(),
            Self::Treemap { cells } => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the chart description for `config.chart_kind` over `data`.
pub fn select_chart(config: &WidgetConfig, data: &[ColorizedDataPoint]) -> ChartSpec {
    let data = data.to_vec();
    let r = config.border_radius;
    match config.chart_kind {
        ChartKind::Pie => ChartSpec::Pie {
            data,
            outer_radius: config.size,
        },
        ChartKind::Donut => ChartSpec::Donut {
            data,
            outer_radius: config.size,
            inner_radius: config.effective_inner_radius(),
        },
        ChartKind::Bar => ChartSpec::Bar(BarLayer::new(data, Orientation::Vertical, false, r)),
        ChartKind::HorizontalBar => {
            ChartSpec::HorizontalBar(BarLayer::new(data, Orientation::Horizontal, false, r))
        }
        ChartKind::StackedBar => {
            ChartSpec::StackedBar(BarLayer::new(data, Orientation::Vertical, true, r))
        }
        ChartKind::Line => ChartSpec::Line { data },
        ChartKind::Area => ChartSpec::Area { data },
        ChartKind::Scatter => ChartSpec::Scatter {
            points: data
                .into_iter()
                .enumerate()
                .map(|(i, p)| ScatterPoint {
                    x: (i + 1) as f64,
                    y: p.value,
                    name: p.name,
                })
                .collect(),
        },
        ChartKind::Radar => ChartSpec::Radar {
            points: data
                .into_iter()
                .map(|p| RadarPoint {
                    subject: p.name,
                    a: p.value,
                    full_mark: RADAR_FULL_MARK,
                })
                .collect(),
        },
        ChartKind::Funnel => ChartSpec::Funnel { data },
        ChartKind::Treemap => ChartSpec::Treemap {
            cells: data
                .into_iter()
                .map(|p| TreemapCell {
                    name: p.name,
                    size: p.value,
                    fill: p.color,
                })
                .collect(),
        },
        ChartKind::Composed => ChartSpec::Composed {
            bar: BarLayer::new(data.clone(), Orientation::Vertical, false, r),
            line: data,
        },
    }
}

/// Each point's share of the total, in percent. All zeros when the total is zero.
pub fn percent_of_total(data: &[ColorizedDataPoint]) -> Vec<f64> {
    let total: f64 = data.iter().map(|p| p.value).sum();
    data.iter()
        .map(|p| {
            if total == 0.0 {
                0.0
            } else {
                p.value / total * 100.0
            }
        })
        .collect()
}

/// Percentage with one decimal place, e.g. `64.0%`.
pub fn format_percent(percent: f64) -> String {
    format!("{percent:.1}%")
}
