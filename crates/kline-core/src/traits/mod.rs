//! Boundary traits between the cache core and its collaborators.

mod block_store;
mod data_fetcher;

pub use block_store::BlockStore;
pub use data_fetcher::DataFetcher;
