//! Persistence Adapters
//!
//! Storage implementations of the journal port.

pub mod in_memory;

pub use in_memory::InMemoryJournal;
