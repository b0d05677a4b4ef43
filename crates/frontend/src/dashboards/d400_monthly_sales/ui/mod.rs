mod chart_panel;
mod dashboard;
mod kpi_cards;
mod preview;
mod sidebar;

pub use dashboard::MonthlySalesDashboard;
