pub mod d400_monthly_sales;

pub use d400_monthly_sales::ui::MonthlySalesDashboard;
