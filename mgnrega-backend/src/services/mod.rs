//! Service layer: the data freshness and resolution pipeline

pub mod cache;
pub mod freshness;
pub mod normalize;
pub mod resolver;
pub mod sync_job;
pub mod upstream;
