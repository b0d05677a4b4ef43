pub mod float;
pub mod format;
pub mod palette;
