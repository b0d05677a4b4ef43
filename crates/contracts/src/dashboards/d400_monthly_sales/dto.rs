use serde::{Deserialize, Serialize};

use super::chart::{ChartKind, ChartSpec};
use crate::shared::float;

/// Month label column (`YYYY-MM`)
pub const COL_MONTH: &str = "월";
/// Current year revenue column (KRW)
pub const COL_REVENUE: &str = "매출액";
/// Same month of the prior year (KRW)
pub const COL_PRIOR_YEAR: &str = "전년동월";
/// Percent change column, may carry a `%` suffix
pub const COL_CHANGE_RATE: &str = "증감률";

/// Columns every uploaded CSV must contain, in validation order.
pub const REQUIRED_COLUMNS: [&str; 4] = [COL_MONTH, COL_REVENUE, COL_PRIOR_YEAR, COL_CHANGE_RATE];

pub const DASHBOARD_TITLE: &str = "월별 매출 대시보드";

/// Default annual revenue goal (KRW)
pub const DEFAULT_GOAL: f64 = 200_000_000.0;

// ---------------------------------------------------------------------------
// Display options
// ---------------------------------------------------------------------------

/// Divisor applied to KRW amounts for presentation.
///
/// Serialized as the divisor itself (`1`, `1000`, `1000000`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum DisplayUnit {
    Won,
    Thousand,
    #[default]
    Million,
}

impl DisplayUnit {
    pub const ALL: [DisplayUnit; 3] = [DisplayUnit::Won, DisplayUnit::Thousand, DisplayUnit::Million];

    pub fn divisor(self) -> u64 {
        match self {
            DisplayUnit::Won => 1,
            DisplayUnit::Thousand => 1_000,
            DisplayUnit::Million => 1_000_000,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DisplayUnit::Won => "원",
            DisplayUnit::Thousand => "천원",
            DisplayUnit::Million => "백만원",
        }
    }

    pub fn from_divisor(divisor: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.divisor() == divisor)
    }

    /// Scales a KRW amount into this unit.
    pub fn scale(self, value: f64) -> f64 {
        value / self.divisor() as f64
    }
}

impl TryFrom<u64> for DisplayUnit {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        DisplayUnit::from_divisor(value)
            .ok_or_else(|| format!("unsupported display unit: {} (expected 1, 1000 or 1000000)", value))
    }
}

impl From<DisplayUnit> for u64 {
    fn from(unit: DisplayUnit) -> Self {
        unit.divisor()
    }
}

/// Which charts the dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    All,
    Trend,
    ChangeRate,
    Cumulative,
    Heatmap,
}

impl ViewMode {
    pub const ALL: [ViewMode; 5] = [
        ViewMode::All,
        ViewMode::Trend,
        ViewMode::ChangeRate,
        ViewMode::Cumulative,
        ViewMode::Heatmap,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::All => "전체",
            ViewMode::Trend => "추세",
            ViewMode::ChangeRate => "증감률",
            ViewMode::Cumulative => "누적",
            ViewMode::Heatmap => "히트맵",
        }
    }

    /// Wire value, identical to the serde representation.
    pub fn code(self) -> &'static str {
        match self {
            ViewMode::All => "all",
            ViewMode::Trend => "trend",
            ViewMode::ChangeRate => "change_rate",
            ViewMode::Cumulative => "cumulative",
            ViewMode::Heatmap => "heatmap",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.code() == code)
    }

    pub fn shows(self, kind: ChartKind) -> bool {
        match self {
            ViewMode::All => true,
            ViewMode::Trend => kind == ChartKind::Trend,
            ViewMode::ChangeRate => kind == ChartKind::ChangeRate,
            ViewMode::Cumulative => kind == ChartKind::Cumulative,
            ViewMode::Heatmap => kind == ChartKind::Heatmap,
        }
    }

    /// Charts visible in this mode, in display order.
    pub fn visible_charts(self) -> Vec<ChartKind> {
        ChartKind::ALL.into_iter().filter(|k| self.shows(*k)).collect()
    }
}

/// User-selected presentation options.
///
/// Every field has a default so that partial query strings are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardOptions {
    pub unit: DisplayUnit,
    /// Annual revenue goal in KRW; `0` disables goal lines.
    pub goal: f64,
    pub view: ViewMode,
    pub show_labels: bool,
    /// Draw the current-year line in brand navy instead of the primary blue.
    pub use_brand_primary: bool,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            unit: DisplayUnit::default(),
            goal: DEFAULT_GOAL,
            view: ViewMode::default(),
            show_labels: false,
            use_brand_primary: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// POST /api/d400/dashboard body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardRequest {
    /// Raw CSV text; `None` selects the bundled example.
    #[serde(default)]
    pub csv_text: Option<String>,
    /// Uploaded file name, echoed back as the data source label.
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub options: DashboardOptions,
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// One cleaned source row, as shown in the preview panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub month: String,
    #[serde(with = "float")]
    pub revenue: f64,
    #[serde(with = "float")]
    pub prior_year: f64,
    #[serde(with = "float")]
    pub change_rate: f64,
}

/// Where the dashboard data came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSource {
    Sample,
    Upload { file_name: String },
}

impl DataSource {
    pub fn label(&self) -> String {
        match self {
            DataSource::Sample => "예시 데이터".to_string(),
            DataSource::Upload { file_name } => file_name.clone(),
        }
    }
}

/// A row dropped while cleaning, or another non-fatal load issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadWarning {
    /// 1-based line in the CSV text (header is line 1); `None` for file-level notes.
    pub line: Option<u64>,
    pub message: String,
}

/// Visual tone of a KPI card (drives colour).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiTone {
    Positive,
    Negative,
    Neutral,
}

/// Pre-formatted KPI card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiCard {
    pub id: String,
    pub label: String,
    pub value_text: String,
    /// Secondary text next to the value (e.g. attainment percentage).
    pub badge_text: Option<String>,
    pub tone: KpiTone,
}

/// Summary metrics, raw values in KRW.
///
/// Infinite revenue values are kept by the loader, so the amounts here may
/// be non-finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    #[serde(with = "float")]
    pub max_revenue: f64,
    #[serde(with = "float")]
    pub avg_revenue: f64,
    /// Mean change rate with non-finite values counted as zero.
    pub avg_change_rate: f64,
    #[serde(with = "float")]
    pub cumulative_total: f64,
    pub goal: f64,
    /// `cumulative_total / goal * 100`; `None` when goal is not positive.
    #[serde(with = "float::option")]
    pub goal_attainment: Option<f64>,
    pub cards: Vec<KpiCard>,
}

/// `describe()`-style statistics of the revenue column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub count: usize,
    #[serde(with = "float")]
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    #[serde(with = "float::option")]
    pub std: Option<f64>,
    #[serde(with = "float")]
    pub min: f64,
    #[serde(with = "float")]
    pub q25: f64,
    #[serde(with = "float")]
    pub median: f64,
    #[serde(with = "float")]
    pub q75: f64,
    #[serde(with = "float")]
    pub max: f64,
}

impl DescriptiveStats {
    /// `(label, value)` pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("count", Some(self.count as f64)),
            ("mean", Some(self.mean)),
            ("std", self.std),
            ("min", Some(self.min)),
            ("25%", Some(self.q25)),
            ("50%", Some(self.median)),
            ("75%", Some(self.q75)),
            ("max", Some(self.max)),
        ]
    }
}

/// A chart together with its export file name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPanel {
    pub kind: ChartKind,
    pub file_name: String,
    pub spec: ChartSpec,
}

/// Response for the monthly sales dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub title: String,
    pub source: DataSource,
    pub options: DashboardOptions,
    pub unit_label: String,
    pub kpi: KpiSummary,
    /// Charts visible for `options.view`, in display order.
    pub charts: Vec<ChartPanel>,
    pub preview: Vec<SalesRecord>,
    pub stats: DescriptiveStats,
    pub warnings: Vec<LoadWarning>,
}

/// Select option for a display unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOption {
    pub value: DisplayUnit,
    pub label: String,
}

/// Select option for a view mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewOption {
    pub value: ViewMode,
    pub label: String,
}

/// GET /api/d400/settings response: defaults and select options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSettings {
    pub defaults: DashboardOptions,
    pub max_upload_bytes: usize,
    pub required_columns: Vec<String>,
    pub units: Vec<UnitOption>,
    pub views: Vec<ViewOption>,
}

impl DashboardSettings {
    pub fn new(defaults: DashboardOptions, max_upload_bytes: usize) -> Self {
        Self {
            defaults,
            max_upload_bytes,
            required_columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            units: DisplayUnit::ALL
                .into_iter()
                .map(|u| UnitOption { value: u, label: u.label().to_string() })
                .collect(),
            views: ViewMode::ALL
                .into_iter()
                .map(|v| ViewOption { value: v, label: v.label().to_string() })
                .collect(),
        }
    }
}

/// JSON error body returned with 4xx/5xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
