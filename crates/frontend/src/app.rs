use crate::dashboards::MonthlySalesDashboard;
use leptos::prelude::*;
use thaw::*;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <ConfigProvider>
            <MonthlySalesDashboard />
        </ConfigProvider>
    }
}
