use contracts::dashboards::d400_monthly_sales::svg::render_chart_default;
use contracts::dashboards::d400_monthly_sales::ChartPanel;
use leptos::prelude::*;
use thaw::*;

use crate::shared::export::download_svg;

/// One chart rendered as inline SVG, with an export button.
#[component]
pub fn ChartPanelView(panel: ChartPanel) -> impl IntoView {
    let svg = render_chart_default(&panel.spec);
    let svg_for_download = svg.clone();
    let file_name = panel.file_name.clone();
    let save_label = format!("{} SVG로 저장", panel.spec.title);

    let on_save = move |_| {
        if let Err(e) = download_svg(&svg_for_download, &file_name) {
            log::error!("D400: failed to export {}: {}", file_name, e);
        }
    };

    view! {
        <section class="d400-chart" data-chart=panel.kind.file_stem()>
            <div class="d400-chart__svg" inner_html=svg></div>
            <div class="d400-chart__actions">
                <Button
                    appearance=ButtonAppearance::Secondary
                    size=ButtonSize::Small
                    attr:aria-label=save_label
                    on_click=on_save
                >
                    "SVG 저장"
                </Button>
            </div>
        </section>
    }
}
