//! Memory service: validation, embedding and ranking over a record store.

mod crud;
mod retry;
mod search;
mod service;


pub use retry::RetryPolicy;
pub use service::{DEFAULT_QUERY_LIMIT, MAX_INPUT_LENGTH, MAX_SEARCH_LIMIT, MemoryService};
