//! Repository layer for the persisted save slot.
//!
//! Repositories own the bytes at rest:
//! - [`FileSaveRepository`] writes one file in the data directory
//! - [`InMemorySaveRepo`] keeps the encoded frame in memory for tests
//!
//! Both go through [`crate::codec`], so corruption is detected the same way.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileSaveRepository;
pub use memory::InMemorySaveRepo;
pub use traits::SaveRepository;
