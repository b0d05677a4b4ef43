use contracts::dashboards::d400_monthly_sales::{
    DashboardOptions, DashboardRequest, DashboardResponse, DashboardSettings, DisplayUnit, LoadWarning,
    ViewMode, DASHBOARD_TITLE, DEFAULT_GOAL,
};
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;

use super::chart_panel::ChartPanelView;
use super::kpi_cards::KpiCards;
use super::preview::PreviewPanel;
use super::sidebar::{Sidebar, UploadedCsv};
use crate::dashboards::d400_monthly_sales::api;

/// Turns the raw sidebar control values into request options.
fn build_options(
    unit: &str,
    goal: &str,
    view: &str,
    show_labels: bool,
    use_brand_primary: bool,
) -> Result<DashboardOptions, String> {
    let unit = unit
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(DisplayUnit::from_divisor)
        .ok_or_else(|| format!("알 수 없는 표시 단위: {}", unit))?;
    let goal_text = goal.trim().replace(',', "");
    let goal = if goal_text.is_empty() {
        0.0
    } else {
        goal_text
            .parse::<f64>()
            .ok()
            .filter(|g| g.is_finite() && *g >= 0.0)
            .ok_or_else(|| "연간 목표 매출은 0 이상의 숫자여야 합니다".to_string())?
    };
    let view = ViewMode::from_code(view).ok_or_else(|| format!("알 수 없는 보기 모드: {}", view))?;

    Ok(DashboardOptions {
        unit,
        goal,
        view,
        show_labels,
        use_brand_primary,
    })
}

fn charts_class(view: ViewMode) -> &'static str {
    match view {
        ViewMode::All => "d400-charts d400-charts--grid",
        _ => "d400-charts",
    }
}

#[component]
fn Warnings(warnings: Vec<LoadWarning>) -> impl IntoView {
    (!warnings.is_empty()).then(|| {
        view! {
            <details class="d400-warnings" role="status">
                <summary>{format!("제외되었거나 확인이 필요한 행 {}개", warnings.len())}</summary>
                <ul>
                    {warnings
                        .into_iter()
                        .map(|w| {
                            let prefix = w.line.map(|l| format!("{}행: ", l)).unwrap_or_default();
                            view! { <li>{prefix}{w.message}</li> }
                        })
                        .collect_view()}
                </ul>
            </details>
        }
    })
}

#[component]
fn AccessibilityFooter() -> impl IntoView {
    view! {
        <footer class="d400-footer">
            <strong>"접근성 체크리스트"</strong>
            <ul>
                <li>"색상 + 패턴/마커/선스타일 병행 (색에만 의존하지 않음)"</li>
                <li>"텍스트 대비(본문 7:1, 보조 4.5:1) 확보"</li>
                <li>"월 표기 YYYY-MM, 단위 명확히 표기"</li>
            </ul>
        </footer>
    }
}

/// Monthly sales dashboard page
#[component]
pub fn MonthlySalesDashboard() -> impl IntoView {
    // Sidebar controls, kept as raw input values
    let unit = RwSignal::new(DisplayUnit::default().divisor().to_string());
    let goal = RwSignal::new(format!("{:.0}", DEFAULT_GOAL));
    let view_mode = RwSignal::new(ViewMode::default().code().to_string());
    let show_labels = RwSignal::new(false);
    let use_brand_primary = RwSignal::new(false);
    let upload = RwSignal::new(None::<UploadedCsv>);

    let (settings, set_settings) = signal(None::<DashboardSettings>);
    let (settings_ready, set_settings_ready) = signal(false);

    // Data state
    let (data, set_data) = signal(None::<DashboardResponse>);
    let (loading, set_loading) = signal(false);
    let (error, set_error) = signal(None::<String>);
    // Only the latest request may update the page
    let request_seq = StoredValue::new(0u64);

    // Load defaults on mount
    Effect::new(move |_| {
        spawn_local(async move {
            match api::get_settings().await {
                Ok(loaded) => {
                    let defaults = &loaded.defaults;
                    unit.set(defaults.unit.divisor().to_string());
                    goal.set(format!("{:.0}", defaults.goal));
                    view_mode.set(defaults.view.code().to_string());
                    show_labels.set(defaults.show_labels);
                    use_brand_primary.set(defaults.use_brand_primary);
                    set_settings.set(Some(loaded));
                }
                Err(err) => {
                    log::error!("Failed to load D400 settings: {}", err);
                }
            }
            set_settings_ready.set(true);
        });
    });

    // Reload the dashboard whenever a control or the uploaded file changes
    Effect::new(move |_| {
        if !settings_ready.get() {
            return;
        }
        let options = match build_options(
            &unit.get(),
            &goal.get(),
            &view_mode.get(),
            show_labels.get(),
            use_brand_primary.get(),
        ) {
            Ok(options) => options,
            Err(e) => {
                set_error.set(Some(e));
                return;
            }
        };
        let (csv_text, file_name) = match upload.get() {
            Some(file) => (Some(file.text), Some(file.name)),
            None => (None, None),
        };
        let request = DashboardRequest {
            csv_text,
            file_name,
            options,
        };

        let seq = request_seq.get_value() + 1;
        request_seq.set_value(seq);
        set_loading.set(true);
        set_error.set(None);

        spawn_local(async move {
            let result = api::post_dashboard(&request).await;
            if request_seq.get_value() != seq {
                return;
            }
            match result {
                Ok(response) => set_data.set(Some(response)),
                Err(e) => {
                    log::error!("D400: dashboard request failed: {}", e);
                    set_data.set(None);
                    set_error.set(Some(e));
                }
            }
            set_loading.set(false);
        });
    });

    let on_error = Callback::new(move |message: String| set_error.set(Some(message)));

    view! {
        <div id="d400_monthly_sales--dashboard" class="d400-dashboard">
            <header class="d400-header">
                <h1>{DASHBOARD_TITLE}</h1>
                {move || data.get().map(|d| view! {
                    <span class="d400-header__source">
                        {format!("데이터: {} · 단위: {}", d.source.label(), d.unit_label)}
                    </span>
                })}
            </header>

            <div class="d400-layout">
                <Sidebar
                    settings=settings
                    unit=unit
                    goal=goal
                    view_mode=view_mode
                    show_labels=show_labels
                    use_brand_primary=use_brand_primary
                    upload=upload
                    on_error=on_error
                />

                <main class="d400-main">
                    {move || loading.get().then(|| view! {
                        <div class="d400-loading" aria-live="polite">
                            <Spinner/>
                            <span>"불러오는 중..."</span>
                        </div>
                    })}

                    {move || error.get().map(|err| view! {
                        <div class="d400-error" role="alert">
                            <strong>"⚠ "</strong>
                            {err}
                        </div>
                    })}

                    {move || data.get().map(|d| {
                        let class = charts_class(d.options.view);
                        view! {
                            <KpiCards cards=d.kpi.cards/>
                            <Warnings warnings=d.warnings/>
                            <div class=class>
                                {d.charts
                                    .into_iter()
                                    .map(|panel| view! { <ChartPanelView panel=panel/> })
                                    .collect_view()}
                            </div>
                            <PreviewPanel records=d.preview stats=d.stats/>
                        }
                    })}

                    <AccessibilityFooter/>
                </main>
            </div>
        </div>
    }
}
