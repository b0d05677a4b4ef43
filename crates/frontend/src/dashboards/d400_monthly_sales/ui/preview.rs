use contracts::dashboards::d400_monthly_sales::{
    DescriptiveStats, SalesRecord, COL_CHANGE_RATE, COL_MONTH, COL_PRIOR_YEAR, COL_REVENUE,
};
use contracts::shared::format::format_grouped;
use leptos::prelude::*;
use thaw::*;

fn stat_text(label: &str, value: Option<f64>) -> String {
    match value {
        None => "-".to_string(),
        Some(v) if label == "count" => format_grouped(v, 0),
        Some(v) => format_grouped(v, 1),
    }
}

/// Collapsible raw data table with `describe()` statistics of revenue.
#[component]
pub fn PreviewPanel(records: Vec<SalesRecord>, stats: DescriptiveStats) -> impl IntoView {
    let entries = stats.entries();
    let header_cells = entries
        .iter()
        .copied()
        .map(|(label, _)| view! { <TableHeaderCell>{label}</TableHeaderCell> })
        .collect_view();
    let value_cells = entries
        .iter()
        .copied()
        .map(|(label, value)| view! {
            <TableCell>
                <TableCellLayout>{stat_text(label, value)}</TableCellLayout>
            </TableCell>
        })
        .collect_view();

    view! {
        <details class="d400-preview">
            <summary>"데이터 미리보기 / 기술통계"</summary>
            <div class="d400-preview__body">
                <Table>
                    <TableHeader>
                        <TableRow>
                            <TableHeaderCell>{COL_MONTH}</TableHeaderCell>
                            <TableHeaderCell>{COL_REVENUE}</TableHeaderCell>
                            <TableHeaderCell>{COL_PRIOR_YEAR}</TableHeaderCell>
                            <TableHeaderCell>{COL_CHANGE_RATE}</TableHeaderCell>
                        </TableRow>
                    </TableHeader>
                    <TableBody>
                        {records
                            .into_iter()
                            .map(|r| view! {
                                <TableRow>
                                    <TableCell><TableCellLayout>{r.month}</TableCellLayout></TableCell>
                                    <TableCell>
                                        <TableCellLayout>{format_grouped(r.revenue, 0)}</TableCellLayout>
                                    </TableCell>
                                    <TableCell>
                                        <TableCellLayout>{format_grouped(r.prior_year, 0)}</TableCellLayout>
                                    </TableCell>
                                    <TableCell>
                                        <TableCellLayout>{format!("{:.1}", r.change_rate)}</TableCellLayout>
                                    </TableCell>
                                </TableRow>
                            })
                            .collect_view()}
                    </TableBody>
                </Table>

                <h4 class="d400-preview__caption">"기술통계 (매출액):"</h4>
                <Table>
                    <TableHeader>
                        <TableRow>
                            {header_cells}
                        </TableRow>
                    </TableHeader>
                    <TableBody>
                        <TableRow>
                            {value_cells}
                        </TableRow>
                    </TableBody>
                </Table>
            </div>
        </details>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_text() {
        assert_eq!(stat_text("count", Some(12.0)), "12");
        assert_eq!(stat_text("mean", Some(18833333.33)), "18,833,333.3");
        assert_eq!(stat_text("std", None), "-");
        assert_eq!(stat_text("max", Some(f64::INFINITY)), "inf");
        assert_eq!(stat_text("std", Some(f64::NAN)), "NaN");
    }
}
