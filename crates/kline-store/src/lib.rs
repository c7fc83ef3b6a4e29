//! Reference implementations of the cache's boundary traits: an in-memory
//! block store and a deterministic synthetic data source.

mod memory;
mod synthetic;

pub use memory::MemoryBlockStore;
pub use synthetic::SyntheticDataFetcher;
