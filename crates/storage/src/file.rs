use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::traits::JournalStore;

/// Journal stored as a text file, one line per entity.
///
/// Every write goes to a sibling `.tmp` file which is synced and then
/// renamed over the journal, so a crash mid-write leaves the previous
/// contents intact.
#[derive(Debug)]
pub struct FileJournalStore {
    path: PathBuf,
}

impl FileJournalStore {
    /// Does not touch the filesystem; the file is created on first write.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

impl JournalStore for FileJournalStore {
    fn write_lines(&mut self, lines: &[String]) -> Result<(), StorageError> {
        let temp = self.temp_path();
        let result = (|| -> io::Result<()> {
            let mut file = File::create(&temp)?;
            for line in lines {
                file.write_all(line.as_bytes())?;
                file.write_all(b"\n")?;
            }
            file.sync_all()?;
            fs::rename(&temp, &self.path)
        })();
        if let Err(e) = result {
            log::warn!("journal write to {} failed: {e}", self.path.display());
            let _ = remove_if_exists(&temp);
            return Err(e.into());
        }
        Ok(())
    }

    fn read_lines(&self) -> Result<Vec<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        remove_if_exists(&self.temp_path())?;
        remove_if_exists(&self.path)?;
        Ok(())
    }
}
