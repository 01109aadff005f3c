//! HTTP surface — thin glue over the analysis and conversation cores.

pub mod routes;

pub use routes::{AppState, api_routes};
