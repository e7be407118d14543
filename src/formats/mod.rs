//! Format parsers.
//!
//! A [`FormatReader`] recognizes its files, fills the dimension model,
//! configures one [`PlaneDecoder`] per series and writes the metadata
//! graph. The caller-facing [`ImageReader`](crate::ImageReader) picks the
//! first registered reader that accepts a file.
//!
//! - [`IcsReader`] - Image Cytometry Standard (`.ics` / `.ids`)

mod ics;

use std::path::Path;

use crate::core::{Dataset, FileGroupOption};
use crate::io::PlaneDecoder;
use crate::meta::{Attributes, MetadataGraph};
use crate::util::Result;

pub use ics::IcsReader;

/// How much of the metadata graph a parser populates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MetadataLevel {
    /// Image and pixels only.
    Minimum,
    /// Everything the format carries.
    #[default]
    All,
}

/// Options passed to [`FormatReader::parse`].
#[derive(Clone, Debug)]
pub struct ReaderOptions {
    /// Memory-map uncompressed pixel payloads.
    pub use_mmap: bool,
    pub metadata_level: MetadataLevel,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            use_mmap: true,
            metadata_level: MetadataLevel::All,
        }
    }
}

impl ReaderOptions {
    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn with_metadata_level(mut self, level: MetadataLevel) -> Self {
        self.metadata_level = level;
        self
    }
}

/// Everything a parser produces for one dataset.
pub struct ParsedDataset {
    pub dataset: Dataset,
    /// One decoder per series, in series order.
    pub decoders: Vec<PlaneDecoder>,
    /// Unresolved graph; references are linked by the caller.
    pub metadata: MetadataGraph,
    /// Format-specific key/value pairs as found in the file.
    pub global_meta: Attributes,
}

/// A file format parser.
pub trait FormatReader: Send + Sync {
    /// Human-readable format name.
    fn name(&self) -> &'static str;

    /// Lower-case file suffixes without the dot.
    fn suffixes(&self) -> &'static [&'static str];

    /// How files of this format group with their companions.
    fn file_group_option(&self, _path: &Path) -> FileGroupOption {
        FileGroupOption::CannotGroup
    }

    /// Check whether the file name alone identifies this format.
    fn is_this_type_by_name(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.suffixes().iter().any(|s| s.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    /// Check a file's leading bytes.
    fn is_this_type_by_header(&self, header: &[u8]) -> bool;

    /// Parse a dataset.
    fn parse(&self, path: &Path, options: &ReaderOptions) -> Result<ParsedDataset>;
}

/// Every built-in format, in detection order.
pub fn default_readers() -> Vec<Box<dyn FormatReader>> {
    vec![Box::new(IcsReader::new())]
}
