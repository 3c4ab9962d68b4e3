//! Infrastructure adapters for the external job and config stores.

pub mod memory;

pub use memory::{InMemoryConfigStore, InMemoryJobStore};
