use std::collections::{BTreeMap, BTreeSet};

use contracts::dashboards::d400_monthly_sales::{
    BarPattern, BarSeries, ChartKind, ChartPanel, ChartSpec, DashboardOptions, Heatmap, Highlight,
    HorizontalRule, LineDash, LineSeries, MarkerSymbol, COL_MONTH,
};
use contracts::shared::format::format_grouped;
use contracts::shared::palette;

use super::loader::SalesTable;

const MARKER_SIZE: f64 = 7.0;

/// Builds one panel per chart visible in `options.view`, in display order.
pub fn build_charts(table: &SalesTable, options: &DashboardOptions) -> Vec<ChartPanel> {
    options
        .view
        .visible_charts()
        .into_iter()
        .map(|kind| build_chart(kind, table, options))
        .collect()
}

pub fn build_chart(kind: ChartKind, table: &SalesTable, options: &DashboardOptions) -> ChartPanel {
    let spec = match kind {
        ChartKind::Trend => trend_chart(table, options),
        ChartKind::ChangeRate => change_rate_chart(table, options),
        ChartKind::Cumulative => cumulative_chart(table, options),
        ChartKind::Heatmap => heatmap_chart(table),
    };
    ChartPanel {
        kind,
        file_name: kind.file_name(),
        spec,
    }
}

fn amount_labels(values: &[f64], show: bool) -> Vec<String> {
    if show {
        values.iter().map(|v| format_grouped(*v, 0)).collect()
    } else {
        Vec::new()
    }
}

/// Index of the first extreme value according to `better`.
fn first_extreme(values: &[f64], better: impl Fn(f64, f64) -> bool) -> Option<usize> {
    let mut found: Option<usize> = None;
    for (i, v) in values.iter().enumerate() {
        match found {
            Some(j) if !better(*v, values[j]) => {}
            _ => found = Some(i),
        }
    }
    found
}

fn trend_chart(table: &SalesTable, options: &DashboardOptions) -> ChartSpec {
    let unit = table.unit;
    let unit_name = unit.label();
    let line_color = if options.use_brand_primary {
        palette::BRAND_PRIMARY
    } else {
        palette::PRIMARY
    };

    let revenue: Vec<f64> = table.rows.iter().map(|r| r.revenue_scaled).collect();
    let prior: Vec<f64> = table.rows.iter().map(|r| r.prior_year_scaled).collect();

    let mut spec = ChartSpec::new(ChartKind::Trend, format!("월별 매출 vs 전년동월 · 단위: {}", unit_name));
    spec.x_title = Some(COL_MONTH.to_string());
    spec.y_title = Some(format!("매출액({})", unit_name));
    spec.categories = table.months();

    spec.lines.push(LineSeries {
        name: "당해 매출".to_string(),
        labels: amount_labels(&revenue, options.show_labels),
        values: revenue.clone(),
        color: line_color.to_string(),
        width: 3.0,
        dash: LineDash::Solid,
        marker: MarkerSymbol::Circle,
        marker_size: MARKER_SIZE,
    });
    spec.lines.push(LineSeries {
        name: "전년동월".to_string(),
        labels: amount_labels(&prior, options.show_labels),
        values: prior,
        color: palette::SECONDARY.to_string(),
        width: 2.0,
        dash: LineDash::Dot,
        marker: MarkerSymbol::TriangleUp,
        marker_size: MARKER_SIZE,
    });

    if options.goal > 0.0 {
        let monthly_target = unit.scale(options.goal / table.len().max(1) as f64);
        spec.rules.push(HorizontalRule {
            y: monthly_target,
            color: palette::GRID.to_string(),
            dash: LineDash::Dash,
            annotation: "월평균 목표".to_string(),
        });
    }

    if let Some(i) = first_extreme(&revenue, |a, b| a > b) {
        spec.highlights.push(Highlight {
            name: "최대".to_string(),
            index: i,
            value: revenue[i],
            symbol: MarkerSymbol::Star,
            size: 16.0,
            fill: palette::CANVAS.to_string(),
            stroke: line_color.to_string(),
            text: "최대".to_string(),
        });
    }
    if let Some(i) = first_extreme(&revenue, |a, b| a < b) {
        spec.highlights.push(Highlight {
            name: "최소".to_string(),
            index: i,
            value: revenue[i],
            symbol: MarkerSymbol::Cross,
            size: 14.0,
            fill: palette::CRITICAL.to_string(),
            stroke: palette::CRITICAL.to_string(),
            text: "최소".to_string(),
        });
    }

    spec
}

fn change_rate_chart(table: &SalesTable, options: &DashboardOptions) -> ChartSpec {
    let rates: Vec<f64> = table.rows.iter().map(|r| r.change_rate).collect();

    let mut spec = ChartSpec::new(ChartKind::ChangeRate, "월별 증감률(%)");
    spec.x_title = Some(COL_MONTH.to_string());
    spec.y_title = Some("증감률(%)".to_string());
    spec.categories = table.months();
    spec.bars = Some(BarSeries {
        name: "증감률".to_string(),
        colors: rates
            .iter()
            .map(|v| if *v >= 0.0 { palette::POSITIVE } else { palette::CRITICAL }.to_string())
            .collect(),
        patterns: rates
            .iter()
            .map(|v| if *v >= 0.0 { BarPattern::Solid } else { BarPattern::Hatch })
            .collect(),
        labels: if options.show_labels {
            rates.iter().map(|v| format!("{:.1}%", v)).collect()
        } else {
            Vec::new()
        },
        values: rates,
    });
    spec
}

fn cumulative_chart(table: &SalesTable, options: &DashboardOptions) -> ChartSpec {
    let unit = table.unit;
    let unit_name = unit.label();
    let cumulative: Vec<f64> = table.rows.iter().map(|r| r.cumulative_scaled).collect();

    let mut spec = ChartSpec::new(ChartKind::Cumulative, format!("누적 매출 추이 · 단위: {}", unit_name));
    spec.x_title = Some(COL_MONTH.to_string());
    spec.y_title = Some(format!("누적 매출({})", unit_name));
    spec.categories = table.months();
    spec.lines.push(LineSeries {
        name: "누적 매출".to_string(),
        labels: amount_labels(&cumulative, options.show_labels),
        values: cumulative,
        color: palette::SKY.to_string(),
        width: 3.0,
        dash: LineDash::Solid,
        marker: MarkerSymbol::Diamond,
        marker_size: MARKER_SIZE,
    });

    if options.goal > 0.0 {
        let goal_scaled = unit.scale(options.goal);
        spec.rules.push(HorizontalRule {
            y: goal_scaled,
            color: palette::GOAL_RULE.to_string(),
            dash: LineDash::Dot,
            annotation: format!("연간 목표 {} {}", format_grouped(goal_scaled, 0), unit_name),
        });
    }
    spec
}

/// `YYYY-MM` label split into year and month number by character position.
/// Short labels yield empty parts.
fn split_month(label: &str) -> (String, String) {
    let year: String = label.chars().take(4).collect();
    let month: String = label.chars().skip(5).take(2).collect();
    (year, month)
}

fn heatmap_chart(table: &SalesTable) -> ChartSpec {
    let unit_name = table.unit.label();

    let mut cells: BTreeMap<(String, String), f64> = BTreeMap::new();
    let mut years = BTreeSet::new();
    let mut months = BTreeSet::new();
    for row in &table.rows {
        let (year, month) = split_month(&row.month);
        years.insert(year.clone());
        months.insert(month.clone());
        *cells.entry((year, month)).or_insert(0.0) += row.revenue_scaled;
    }

    let z = years
        .iter()
        .map(|y| {
            months
                .iter()
                .map(|m| cells.get(&(y.clone(), m.clone())).copied())
                .collect()
        })
        .collect();

    let mut spec = ChartSpec::new(ChartKind::Heatmap, format!("월별 매출 히트맵 (단위: {})", unit_name));
    spec.heatmap = Some(Heatmap {
        x_labels: months.iter().map(|m| format!("{}월", m)).collect(),
        y_labels: years.into_iter().collect(),
        z,
        color_low: palette::HEATMAP_LOW.to_string(),
        color_high: palette::PRIMARY.to_string(),
        colorbar_title: unit_name.to_string(),
    });
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d400_monthly_sales::loader::load_data;
    use crate::dashboards::d400_monthly_sales::sample::SAMPLE_CSV;
    use contracts::dashboards::d400_monthly_sales::{DisplayUnit, ViewMode};

    fn options() -> DashboardOptions {
        DashboardOptions::default()
    }

    fn sample() -> SalesTable {
        load_data(SAMPLE_CSV, DisplayUnit::Million).unwrap()
    }

    #[test]
    fn test_view_mode_selects_charts() {
        let table = sample();
        let all = build_charts(&table, &options());
        let kinds: Vec<ChartKind> = all.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, ChartKind::ALL.to_vec());

        let only = build_charts(
            &table,
            &DashboardOptions {
                view: ViewMode::Cumulative,
                ..options()
            },
        );
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].file_name, "cum_with_goal.svg");
    }

    #[test]
    fn test_trend_chart() {
        let spec = build_chart(ChartKind::Trend, &sample(), &options()).spec;
        assert_eq!(spec.title, "월별 매출 vs 전년동월 · 단위: 백만원");
        assert_eq!(spec.y_title.as_deref(), Some("매출액(백만원)"));
        assert_eq!(spec.lines.len(), 2);
        assert_eq!(spec.lines[0].color, palette::PRIMARY);
        assert_eq!(spec.lines[1].dash, LineDash::Dot);
        assert!(spec.lines[0].labels.is_empty());

        let rule = &spec.rules[0];
        assert!((rule.y - 200.0 / 12.0).abs() < 1e-9);
        assert_eq!(rule.annotation, "월평균 목표");

        assert_eq!(spec.highlights.len(), 2);
        assert_eq!(spec.highlights[0].index, 11);
        assert_eq!(spec.highlights[0].value, 25.0);
        assert_eq!(spec.highlights[1].index, 2);
        assert_eq!(spec.highlights[1].symbol, MarkerSymbol::Cross);
    }

    #[test]
    fn test_trend_brand_colour_and_labels() {
        let opts = DashboardOptions {
            use_brand_primary: true,
            show_labels: true,
            ..options()
        };
        let spec = build_chart(ChartKind::Trend, &sample(), &opts).spec;
        assert_eq!(spec.lines[0].color, palette::BRAND_PRIMARY);
        assert_eq!(spec.highlights[0].stroke, palette::BRAND_PRIMARY);
        assert_eq!(spec.lines[0].labels[0], "12");
    }

    #[test]
    fn test_zero_goal_omits_rules() {
        let opts = DashboardOptions { goal: 0.0, ..options() };
        let table = sample();
        assert!(build_chart(ChartKind::Trend, &table, &opts).spec.rules.is_empty());
        assert!(build_chart(ChartKind::Cumulative, &table, &opts).spec.rules.is_empty());
    }

    #[test]
    fn test_first_extreme_keeps_first_tie() {
        let table = load_data(
            "월,매출액,전년동월,증감률\n2024-01,5,1,0\n2024-02,9,1,0\n2024-03,9,1,0\n2024-04,5,1,0\n",
            DisplayUnit::Won,
        )
        .unwrap();
        let spec = build_chart(ChartKind::Trend, &table, &options()).spec;
        assert_eq!(spec.highlights[0].index, 1);
        assert_eq!(spec.highlights[1].index, 0);
    }

    #[test]
    fn test_change_rate_negative_bars_are_hatched() {
        let opts = DashboardOptions { show_labels: true, ..options() };
        let spec = build_chart(ChartKind::ChangeRate, &sample(), &opts).spec;
        let bars = spec.bars.unwrap();
        assert_eq!(bars.values.len(), 12);
        assert_eq!(bars.patterns[2], BarPattern::Hatch);
        assert_eq!(bars.colors[2], palette::CRITICAL);
        assert_eq!(bars.patterns[0], BarPattern::Solid);
        assert_eq!(bars.colors[0], palette::POSITIVE);
        assert_eq!(bars.labels[2], "-14.1%");
    }

    #[test]
    fn test_cumulative_goal_rule() {
        let spec = build_chart(ChartKind::Cumulative, &sample(), &options()).spec;
        assert_eq!(spec.lines[0].marker, MarkerSymbol::Diamond);
        assert_eq!(spec.lines[0].values.last().copied(), Some(226.0));
        assert_eq!(spec.rules[0].y, 200.0);
        assert_eq!(spec.rules[0].annotation, "연간 목표 200 백만원");
    }

    #[test]
    fn test_heatmap_pivot_with_gaps() {
        let table = load_data(
            "월,매출액,전년동월,증감률\n2023-11,1000000,0,0\n2024-01,2000000,0,0\n2024-11,3000000,0,0\n",
            DisplayUnit::Million,
        )
        .unwrap();
        let spec = build_chart(ChartKind::Heatmap, &table, &options()).spec;
        let heatmap = spec.heatmap.unwrap();
        assert_eq!(heatmap.y_labels, vec!["2023", "2024"]);
        assert_eq!(heatmap.x_labels, vec!["01월", "11월"]);
        assert_eq!(heatmap.z, vec![vec![None, Some(1.0)], vec![Some(2.0), Some(3.0)]]);
        assert_eq!(heatmap.colorbar_title, "백만원");
    }

    #[test]
    fn test_split_month_short_label() {
        assert_eq!(split_month("2024-07"), ("2024".to_string(), "07".to_string()));
        assert_eq!(split_month("2024"), ("2024".to_string(), String::new()));
    }
}
