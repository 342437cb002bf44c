pub mod error;
pub mod file;
pub mod line;
pub mod memory;
pub mod traits;

pub use error::StorageError;
pub use file::FileJournalStore;
pub use line::{IDENTITY_SEPARATOR, JournalLine};
pub use memory::MemoryJournalStore;
pub use traits::*;
