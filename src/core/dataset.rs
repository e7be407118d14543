//! Datasets: ordered series sharing one companion file group.

use std::path::{Path, PathBuf};

use super::series::SeriesDescriptor;
use crate::util::{Error, Result};

/// How a format relates one file to the other files of its dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FileGroupOption {
    /// The file is meaningless without its companions.
    MustGroup,
    /// Companions are used when present.
    CanGroup,
    /// Each file is a dataset of its own.
    #[default]
    CannotGroup,
}

/// Ordered series of one logical dataset.
///
/// Exactly one series is current; series-level queries answer for it.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    series: Vec<SeriesDescriptor>,
    files: Vec<PathBuf>,
    current: usize,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a series, finalizing it and assigning its index.
    pub fn push_series(&mut self, mut descriptor: SeriesDescriptor) -> Result<usize> {
        let index = self.series.len();
        descriptor.set_series(index);
        descriptor.finalize()?;
        self.series.push(descriptor);
        Ok(index)
    }

    /// Add a file to the companion group, keeping first-seen order.
    pub fn add_file(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.files.contains(&path) {
            self.files.push(path);
        }
    }

    /// Companion file group, in the order files were added.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn contains_file(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f == path)
    }

    #[inline]
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Make series `index` current.
    pub fn set_series(&mut self, index: usize) -> Result<()> {
        if index >= self.series.len() {
            return Err(Error::SeriesOutOfBounds { index, count: self.series.len() });
        }
        self.current = index;
        Ok(())
    }

    /// The current series.
    pub fn current(&self) -> Result<&SeriesDescriptor> {
        self.get(self.current)
    }

    pub fn get(&self, index: usize) -> Result<&SeriesDescriptor> {
        self.series
            .get(index)
            .ok_or(Error::SeriesOutOfBounds { index, count: self.series.len() })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesDescriptor> {
        self.series.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_index_and_finalizes() {
        let mut ds = Dataset::new();
        assert_eq!(ds.push_series(SeriesDescriptor::new(4, 4)).unwrap(), 0);
        assert_eq!(ds.push_series(SeriesDescriptor::new(8, 8).with_zct(2, 1, 1)).unwrap(), 1);
        let s = ds.get(1).unwrap();
        assert_eq!(s.series(), 1);
        assert!(s.is_finalized());
        assert_eq!(s.image_count(), 2);
    }

    #[test]
    fn test_set_series() {
        let mut ds = Dataset::new();
        ds.push_series(SeriesDescriptor::new(4, 4)).unwrap();
        ds.push_series(SeriesDescriptor::new(8, 8)).unwrap();
        ds.set_series(1).unwrap();
        assert_eq!(ds.current().unwrap().size_x(), 8);
        assert!(matches!(
            ds.set_series(2),
            Err(Error::SeriesOutOfBounds { index: 2, count: 2 })
        ));
        assert_eq!(ds.current_index(), 1);
    }

    #[test]
    fn test_file_group_is_ordered_set() {
        let mut ds = Dataset::new();
        ds.add_file("a.ics");
        ds.add_file("a.ids");
        ds.add_file("a.ics");
        assert_eq!(ds.files(), &[PathBuf::from("a.ics"), PathBuf::from("a.ids")]);
        assert!(ds.contains_file(Path::new("a.ids")));
    }
}
