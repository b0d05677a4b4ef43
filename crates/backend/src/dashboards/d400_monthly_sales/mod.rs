//! D400: monthly sales dashboard.
//!
//! `loader` turns CSV text into a cleaned [`loader::SalesTable`]; `kpi`,
//! `stats` and `charts` derive the dashboard parts from it; `service`
//! wires everything to the configured sample data and request options.

pub mod charts;
pub mod error;
pub mod kpi;
pub mod loader;
pub mod sample;
pub mod service;
pub mod stats;
