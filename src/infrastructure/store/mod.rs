//! Passage store implementations

mod in_memory;
mod qdrant;

pub use in_memory::InMemoryPassageStore;
pub use qdrant::{QdrantConfig, QdrantPassageStore};
