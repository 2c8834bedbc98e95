//! Output archive
//!
//! Collects one document per worksheet into a single zip, in worksheet
//! order. Entry names that clash after sanitizing get a numeric suffix.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use omrsheet_core::normalize::MAX_FILENAME_LEN;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::batch::BatchError;

/// A name chosen for an archive entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryName {
    /// Final entry name, extension included
    pub name: String,
    /// True when a suffix was added to avoid a clash
    pub renamed: bool,
}

/// Zip archive built in memory
pub struct OutputArchive {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    /// Lowercased names already used
    taken: HashSet<String>,
    entries: Vec<String>,
}

impl OutputArchive {
    /// Start an empty archive
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            taken: HashSet::new(),
            entries: Vec::new(),
        }
    }

    /// Pick a free entry name for a stem and extension
    ///
    /// Comparison ignores case so entries survive extraction on
    /// case-insensitive file systems.
    pub fn reserve_name(&mut self, stem: &str, extension: &str) -> EntryName {
        let mut name = format!("{}.{}", stem, extension);
        let mut counter = 1;
        while self.taken.contains(&name.to_lowercase()) {
            counter += 1;
            let suffix = format!("_{}", counter);
            // Suffixed stems stay within the sanitized filename limit
            let kept: String = stem
                .chars()
                .take(MAX_FILENAME_LEN.saturating_sub(suffix.len()))
                .collect();
            name = format!("{}{}.{}", kept, suffix, extension);
        }
        self.taken.insert(name.to_lowercase());

        EntryName {
            name,
            renamed: counter > 1,
        }
    }

    /// Write an entry
    pub fn add(&mut self, name: &str, contents: &[u8]) -> Result<(), BatchError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(name, options)?;
        self.zip.write_all(contents)?;
        self.entries.push(name.to_string());
        Ok(())
    }

    /// Entry names written so far, in order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Finish the archive and return its bytes
    pub fn finish(self) -> Result<Vec<u8>, BatchError> {
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for OutputArchive {
    fn default() -> Self {
        Self::new()
    }
}
