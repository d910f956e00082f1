// Library surface for the binary, headless tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod catalog;
pub mod config;
pub mod countdown;
pub mod error;
pub mod logging;
pub mod proof;
pub mod runtime;
pub mod selector;
pub mod session;
pub mod stats;
pub mod ui;
