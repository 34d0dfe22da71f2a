//! Caching gateway for the JewGo listings API.
//!
//! Fronts the paginated restaurants search and filter-options backends with
//! a short-TTL cache, a single-flight registry that coalesces concurrent
//! identical requests, and a recency suppressor that absorbs back-to-back
//! duplicates.

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod state;
pub mod upstream;
pub mod utils;
pub mod web;
