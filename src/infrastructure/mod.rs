//! Infrastructure layer - External service implementations

pub mod crag;
pub mod embedding;
pub mod http_client;
pub mod llm;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod store;
