pub mod config;
pub mod http_log;
