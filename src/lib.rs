//! Gridboard - Headless real-time dashboard engine
//!
//! This library provides the core functionality for driving dashboards of
//! pluggable datasources and widgets: datasource payloads feed calculated
//! settings (small expressions over a `resources` namespace), which are
//! statically scanned for dependencies so only affected widgets are
//! re-evaluated when a datasource updates. Dashboards serialize to a
//! versioned JSON document.

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod datasource;
pub mod expr;
pub mod layout;
pub mod logging;
pub mod pane;
pub mod plugin;
pub mod widget;
