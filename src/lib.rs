//! dockconsole - Docker TUI
//!
//! A terminal console over the containers and images of a Docker daemon,
//! kept live by polling, with bulk actions on marked rows.

pub mod actions;
pub mod app;
pub mod config;
pub mod core;
pub mod docker;
pub mod keys;
pub mod poller;
pub mod state;
pub mod ui;
