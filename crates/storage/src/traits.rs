use crate::error::StorageError;

/// Durable backing for the recovery journal.
///
/// A single writer owns the store for the whole session. `write_lines`
/// replaces the previous contents entirely; there is no append path.
pub trait JournalStore {
    fn write_lines(&mut self, lines: &[String]) -> Result<(), StorageError>;

    /// Returns an empty list if nothing has been written.
    fn read_lines(&self) -> Result<Vec<String>, StorageError>;

    /// Removes the durable contents.
    fn clear(&mut self) -> Result<(), StorageError>;
}
