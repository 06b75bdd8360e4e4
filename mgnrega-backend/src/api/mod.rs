//! HTTP API handlers

pub mod districts;
pub mod health;
pub mod sync;

pub use districts::district_routes;
pub use health::health_routes;
pub use sync::sync_routes;
