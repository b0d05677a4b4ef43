use contracts::dashboards::d400_monthly_sales::{KpiCard, KpiSummary, KpiTone};
use contracts::shared::format::{format_amount, format_grouped, format_percent};

use super::loader::SalesTable;

/// Attainment below this share of the goal is flagged.
const ATTAINMENT_WARNING_PCT: f64 = 80.0;

/// Computes the four summary KPIs and their pre-formatted cards.
pub fn compute_kpis(table: &SalesTable, goal: f64) -> KpiSummary {
    let unit = table.unit;
    let revenues = table.revenues();
    let count = revenues.len().max(1) as f64;

    let max_revenue = revenues.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg_revenue = revenues.iter().sum::<f64>() / count;
    let avg_change_rate = table
        .rows
        .iter()
        .map(|r| if r.change_rate.is_finite() { r.change_rate } else { 0.0 })
        .sum::<f64>()
        / count;
    let cumulative_total = table.cumulative_total();
    let goal_attainment = (goal > 0.0).then(|| cumulative_total / goal * 100.0);

    let attainment_for_card = if goal != 0.0 {
        100.0 * cumulative_total / goal
    } else {
        0.0
    };
    let attainment_tone = if attainment_for_card >= 100.0 {
        KpiTone::Positive
    } else if attainment_for_card < ATTAINMENT_WARNING_PCT {
        KpiTone::Negative
    } else {
        KpiTone::Neutral
    };

    let cards = vec![
        KpiCard {
            id: "max_revenue".to_string(),
            label: "최고 매출".to_string(),
            value_text: format_amount(unit.scale(max_revenue), 1, unit.label()),
            badge_text: None,
            tone: KpiTone::Neutral,
        },
        KpiCard {
            id: "avg_revenue".to_string(),
            label: "평균 매출".to_string(),
            value_text: format_amount(unit.scale(avg_revenue), 1, unit.label()),
            badge_text: None,
            tone: KpiTone::Neutral,
        },
        KpiCard {
            id: "avg_change_rate".to_string(),
            label: "평균 증감률".to_string(),
            value_text: format_percent(avg_change_rate, 1),
            badge_text: None,
            tone: if avg_change_rate >= 0.0 {
                KpiTone::Positive
            } else {
                KpiTone::Negative
            },
        },
        KpiCard {
            id: "goal_attainment".to_string(),
            label: "누적/목표".to_string(),
            value_text: format!(
                "{} / {} {}",
                format_grouped(unit.scale(cumulative_total), 1),
                format_grouped(unit.scale(goal), 1),
                unit.label()
            ),
            badge_text: Some(format!("({})", format_percent(attainment_for_card, 1))),
            tone: attainment_tone,
        },
    ];

    KpiSummary {
        max_revenue,
        avg_revenue,
        avg_change_rate,
        cumulative_total,
        goal,
        goal_attainment,
        cards,
    }
}
