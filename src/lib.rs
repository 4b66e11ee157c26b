pub mod bulk;
pub mod cli;
pub mod config;
pub mod core;
pub mod dates;
pub mod exit;
pub mod export;
pub mod logs;
pub mod stats;
pub mod store;
pub mod tui;
pub mod ui;
pub mod view;
