pub mod announce;
pub mod app;
pub mod config;
pub mod host;
pub mod modes;
pub mod speech;
