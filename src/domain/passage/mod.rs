//! Legal passages and the document store port

mod entity;
mod store;

pub use entity::{Passage, UNKNOWN_SOURCE, UNSPECIFIED};
pub use store::{PassageStore, SearchParams};
pub(crate) use store::sort_by_score;

#[cfg(test)]
pub use store::mock::MockPassageStore;
