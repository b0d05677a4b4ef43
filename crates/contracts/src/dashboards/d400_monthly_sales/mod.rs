//! D400: monthly sales dashboard contracts.
//!
//! Shared between backend (builds everything) and frontend (renders it).

pub mod chart;
pub mod dto;
pub mod svg;

pub use chart::*;
pub use dto::*;
