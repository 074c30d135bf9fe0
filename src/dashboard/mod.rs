//! The dashboard summarises the current month's spending.
//!
//! This module is organized into focused submodules:
//! - `summary`: Month to date SQL aggregation queries
//! - `cards`: The monthly total summary card
//! - `charts`: Chart generation and rendering
//! - `handlers`: HTTP route handlers and page views

mod cards;
mod charts;
mod handlers;
mod summary;

pub use handlers::get_dashboard_page;
