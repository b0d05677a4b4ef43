//! Renderer-independent chart descriptions.
//!
//! The backend fills these from the cleaned sales table; [`super::svg`]
//! turns them into SVG markup on either side.

use serde::{Deserialize, Serialize};

use crate::shared::float;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Trend,
    ChangeRate,
    Cumulative,
    Heatmap,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Trend,
        ChartKind::ChangeRate,
        ChartKind::Cumulative,
        ChartKind::Heatmap,
    ];

    /// Export file name without extension.
    pub fn file_stem(self) -> &'static str {
        match self {
            ChartKind::Trend => "line_sales_vs_prev",
            ChartKind::ChangeRate => "bar_rate",
            ChartKind::Cumulative => "cum_with_goal",
            ChartKind::Heatmap => "heatmap_sales",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.svg", self.file_stem())
    }

    pub fn from_file_stem(stem: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.file_stem() == stem)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineDash {
    Solid,
    Dot,
    Dash,
}

impl LineDash {
    /// SVG `stroke-dasharray` value, `None` for solid lines.
    pub fn dasharray(self) -> Option<&'static str> {
        match self {
            LineDash::Solid => None,
            LineDash::Dot => Some("2 4"),
            LineDash::Dash => Some("8 5"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerSymbol {
    Circle,
    TriangleUp,
    Diamond,
    Star,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarPattern {
    Solid,
    /// Diagonal hatch, used together with the critical colour.
    Hatch,
}

/// Line series with markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    #[serde(with = "float::seq")]
    pub values: Vec<f64>,
    pub color: String,
    pub width: f64,
    pub dash: LineDash,
    pub marker: MarkerSymbol,
    pub marker_size: f64,
    /// Value labels; empty when labels are disabled.
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Single bar series with per-bar styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub name: String,
    #[serde(with = "float::seq")]
    pub values: Vec<f64>,
    pub colors: Vec<String>,
    pub patterns: Vec<BarPattern>,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Horizontal reference line spanning the plot area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizontalRule {
    pub y: f64,
    pub color: String,
    pub dash: LineDash,
    pub annotation: String,
}

/// Single emphasized point (max / min markers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub name: String,
    /// Category index on the x axis.
    pub index: usize,
    #[serde(with = "float")]
    pub value: f64,
    pub symbol: MarkerSymbol,
    pub size: f64,
    pub fill: String,
    pub stroke: String,
    pub text: String,
}

/// Year × month grid; `None` cells are gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    pub x_labels: Vec<String>,
    pub y_labels: Vec<String>,
    /// Row-major: `z[y][x]`.
    #[serde(with = "float::grid")]
    pub z: Vec<Vec<Option<f64>>>,
    pub color_low: String,
    pub color_high: String,
    pub colorbar_title: String,
}

impl Heatmap {
    /// Minimum and maximum of the present cells.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.z
            .iter()
            .flatten()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Complete chart description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    /// X-axis categories (month labels) for line and bar charts.
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub lines: Vec<LineSeries>,
    #[serde(default)]
    pub bars: Option<BarSeries>,
    #[serde(default)]
    pub rules: Vec<HorizontalRule>,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
    #[serde(default)]
    pub heatmap: Option<Heatmap>,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            x_title: None,
            y_title: None,
            categories: Vec::new(),
            lines: Vec::new(),
            bars: None,
            rules: Vec::new(),
            highlights: Vec::new(),
            heatmap: None,
        }
    }

    /// Every y value the chart must fit, including rules and highlights.
    pub fn y_values(&self) -> Vec<f64> {
        let mut values: Vec<f64> = self.lines.iter().flat_map(|s| s.values.iter().copied()).collect();
        if let Some(bars) = &self.bars {
            values.extend(bars.values.iter().copied());
            // bars grow from zero
            values.push(0.0);
        }
        values.extend(self.rules.iter().map(|r| r.y));
        values.extend(self.highlights.iter().map(|h| h.value));
        values.retain(|v| v.is_finite());
        values
    }
}
