//! Progress persistence: libSQL-backed and in-memory stores behind one trait.

pub mod libsql_backend;
pub mod memory;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlProgressStore;
pub use memory::MemoryProgressStore;
pub use traits::{Progress, ProgressKey, ProgressStore, calculate_progress};
