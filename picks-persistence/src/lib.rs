pub mod memory;
pub mod repositories;
pub mod store;

pub use memory::MemoryStore;
pub use store::{DocumentMutation, DocumentStore, FieldUpdate, StoreError};
