//! Web API module for the jewgo gateway.

pub mod filter_options_cache;
pub mod listings;
pub mod listings_cache;
pub mod middleware;
pub mod pagination;
pub mod params;
pub mod recent;
pub mod routes;
pub mod singleflight;
pub mod status;

pub use routes::*;
