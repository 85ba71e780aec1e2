//! HTTP surface for the linkstash bookmark tracker.
//!
//! One authenticated endpoint serves the listing and accepts the
//! bookmarklet's add/delete/backup requests; a companion proxy endpoint
//! hands out the raw data files.

pub mod app;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod notify;
pub mod state;
