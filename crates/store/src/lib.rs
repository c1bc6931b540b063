pub mod file;
pub mod memory;

pub use file::FileStatusStore;
pub use memory::InMemoryStatusStore;
pub use stockwatch_core::ports::{StatusStore, StoreError};
