pub mod action;
pub mod app;
pub mod config;
pub mod feeds;
pub mod logging;
pub mod ui;
