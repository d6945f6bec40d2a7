//! Baseline storage backends
//!
//! Each backend persists at most one snapshot per project key, overwritten on
//! every completed generation. A missing snapshot is not an error; it signals
//! the first-baseline path to the caller.

pub mod memory;
pub mod sqlite_backend;
pub mod traits;
pub mod yaml_backend;

pub use memory::MemoryStore;
pub use sqlite_backend::SqliteStore;
pub use traits::{BackendType, BaselineStore};
pub use yaml_backend::YamlStore;
