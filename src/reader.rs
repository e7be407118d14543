//! Caller-facing dataset handle.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::core::{ChannelDim, Dataset, DimensionOrder, Region, SeriesDescriptor};
use crate::formats::{default_readers, FormatReader, ParsedDataset, ReaderOptions};
use crate::io::PlaneDecoder;
use crate::meta::{Attributes, MetadataGraph, UnresolvedReference};
use crate::util::{Error, Result};

/// Bytes read from the start of a file for header detection.
const DETECT_LEN: usize = 512;

/// One open dataset handle shared between threads.
///
/// Plane reads mutate decoder state, so all access goes through the lock.
pub type SharedReader = Arc<Mutex<ImageReader>>;

/// An open dataset: its series, one plane decoder per series and the
/// metadata graph.
///
/// # Example
/// ```ignore
/// let mut reader = ImageReader::open("cells.ics")?;
/// for s in 0..reader.series_count() {
///     reader.set_series(s)?;
///     let plane = reader.open_plane(0)?;
/// }
/// let (graph, unresolved) = reader.resolve_metadata()?;
/// ```
pub struct ImageReader {
    format: &'static str,
    path: PathBuf,
    dataset: Dataset,
    decoders: Vec<PlaneDecoder>,
    metadata: Arc<MetadataGraph>,
    unresolved: Option<Vec<UnresolvedReference>>,
    global_meta: Attributes,
}

impl ImageReader {
    /// Open a dataset with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &ReaderOptions::default())
    }

    /// Open a dataset, detecting the format among the built-in readers.
    pub fn open_with<P: AsRef<Path>>(path: P, options: &ReaderOptions) -> Result<Self> {
        Self::open_with_readers(path, options, &default_readers())
    }

    /// Open a dataset using an explicit reader list, tried in order.
    pub fn open_with_readers<P: AsRef<Path>>(
        path: P,
        options: &ReaderOptions,
        readers: &[Box<dyn FormatReader>],
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let reader = detect(path, readers)?;
        info!("{}: {}", reader.name(), path.display());

        let parsed = reader.parse(path, options)?;
        Self::from_parsed(reader.name(), path, parsed)
    }

    /// Wrap the output of a format parser.
    pub fn from_parsed(format: &'static str, path: &Path, parsed: ParsedDataset) -> Result<Self> {
        let ParsedDataset {
            dataset,
            decoders,
            metadata,
            global_meta,
        } = parsed;
        if decoders.len() != dataset.series_count() {
            return Err(Error::other(format!(
                "{} series but {} plane decoders",
                dataset.series_count(),
                decoders.len()
            )));
        }
        Ok(Self {
            format,
            path: path.to_path_buf(),
            dataset,
            decoders,
            metadata: Arc::new(metadata),
            unresolved: None,
            global_meta,
        })
    }

    /// Move into a handle that can be shared between threads.
    pub fn into_shared(self) -> SharedReader {
        Arc::new(Mutex::new(self))
    }

    /// Name of the format that parsed this dataset.
    pub fn format(&self) -> &'static str {
        self.format
    }

    /// Path the dataset was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // === Series selection ===

    pub fn series_count(&self) -> usize {
        self.dataset.series_count()
    }

    /// Select the series that the getters and plane reads refer to.
    pub fn set_series(&mut self, index: usize) -> Result<()> {
        self.dataset.set_series(index)
    }

    pub fn current_series(&self) -> usize {
        self.dataset.current_index()
    }

    /// Descriptor of the current series.
    pub fn series(&self) -> Result<&SeriesDescriptor> {
        self.dataset.current()
    }

    // === Current series dimensions ===

    pub fn size_x(&self) -> Result<usize> {
        Ok(self.series()?.size_x())
    }

    pub fn size_y(&self) -> Result<usize> {
        Ok(self.series()?.size_y())
    }

    pub fn size_z(&self) -> Result<usize> {
        Ok(self.series()?.size_z())
    }

    pub fn size_c(&self) -> Result<usize> {
        Ok(self.series()?.size_c())
    }

    pub fn size_t(&self) -> Result<usize> {
        Ok(self.series()?.size_t())
    }

    pub fn dimension_order(&self) -> Result<DimensionOrder> {
        Ok(self.series()?.dimension_order())
    }

    pub fn image_count(&self) -> Result<usize> {
        Ok(self.series()?.image_count())
    }

    pub fn rgb_channel_count(&self) -> Result<usize> {
        Ok(self.series()?.rgb_channel_count())
    }

    pub fn channel_dims(&self) -> Result<Vec<ChannelDim>> {
        Ok(self.series()?.channel_dims())
    }

    /// Every file that makes up the dataset.
    pub fn used_files(&self) -> &[PathBuf] {
        self.dataset.files()
    }

    /// Format-specific key/value pairs as found in the file.
    pub fn global_meta(&self) -> &Attributes {
        &self.global_meta
    }

    // === Pixels ===

    /// Read a full plane of the current series.
    pub fn open_plane(&mut self, index: usize) -> Result<Vec<u8>> {
        self.decoder()?.open_plane(index)
    }

    /// Read a sub-region of a plane of the current series.
    pub fn open_plane_region(
        &mut self,
        index: usize,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<Vec<u8>> {
        self.decoder()?
            .open_plane_region(index, Region::new(x, y, width, height))
    }

    fn decoder(&mut self) -> Result<&mut PlaneDecoder> {
        let index = self.dataset.current_index();
        let count = self.decoders.len();
        self.decoders
            .get_mut(index)
            .ok_or(Error::SeriesOutOfBounds { index, count })
    }

    /// Release every open stream. Later plane reads fail until
    /// [`reopen`](Self::reopen).
    pub fn close(&mut self) {
        for decoder in &mut self.decoders {
            decoder.close();
        }
        debug!("closed {}", self.path.display());
    }

    /// Make every decoder usable again after [`close`](Self::close) or a
    /// decode failure.
    pub fn reopen(&mut self) {
        for decoder in &mut self.decoders {
            decoder.reopen();
        }
    }

    // === Metadata ===

    /// The metadata graph, resolved or not.
    pub fn metadata(&self) -> &MetadataGraph {
        &self.metadata
    }

    /// Link all pending references and return the graph with the
    /// references that could not be linked.
    ///
    /// Resolution runs on the first call; later calls return the same
    /// graph and diagnostics.
    pub fn resolve_metadata(&mut self) -> Result<(Arc<MetadataGraph>, &[UnresolvedReference])> {
        if self.unresolved.is_none() {
            let unresolved = Arc::make_mut(&mut self.metadata).resolve()?;
            self.unresolved = Some(unresolved);
        }
        let unresolved = self.unresolved.as_deref().unwrap_or_default();
        Ok((Arc::clone(&self.metadata), unresolved))
    }
}

impl std::fmt::Debug for ImageReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageReader")
            .field("format", &self.format)
            .field("path", &self.path)
            .field("series", &self.dataset.series_count())
            .field("metadata", &self.metadata.state())
            .finish()
    }
}

/// Pick the first reader that claims the file, by name then by header.
fn detect<'a>(path: &Path, readers: &'a [Box<dyn FormatReader>]) -> Result<&'a dyn FormatReader> {
    if let Some(r) = readers.iter().find(|r| r.is_this_type_by_name(path)) {
        return Ok(r.as_ref());
    }

    let mut header = Vec::with_capacity(DETECT_LEN);
    File::open(path)?
        .take(DETECT_LEN as u64)
        .read_to_end(&mut header)?;
    readers
        .iter()
        .find(|r| r.is_this_type_by_header(&header))
        .map(|r| r.as_ref())
        .ok_or_else(|| Error::UnknownFormat(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FileGroupOption;
    use crate::io::{DecoderOptions, MemorySource, PixelStorage};
    use crate::meta::{NodeKind, RefKind, Slot};

    /// In-memory format for exercising the facade.
    struct Synthetic;

    impl FormatReader for Synthetic {
        fn name(&self) -> &'static str {
            "Synthetic"
        }

        fn suffixes(&self) -> &'static [&'static str] {
            &["syn"]
        }

        fn file_group_option(&self, _path: &Path) -> FileGroupOption {
            FileGroupOption::CannotGroup
        }

        fn is_this_type_by_header(&self, header: &[u8]) -> bool {
            header.starts_with(b"SYN")
        }

        fn parse(&self, path: &Path, _options: &ReaderOptions) -> Result<ParsedDataset> {
            let mut dataset = Dataset::new();
            dataset.add_file(path);
            let index = dataset.push_series(SeriesDescriptor::new(2, 2).with_zct(1, 2, 1))?;
            let series = dataset.get(index)?.clone();

            let pixels: Vec<u8> = (0..8).collect();
            let storage = PixelStorage::Direct {
                source: Box::new(MemorySource::new(pixels)),
                offset: 0,
            };
            let decoder = PlaneDecoder::new(series, storage, DecoderOptions::default())?;

            let mut metadata = MetadataGraph::new();
            let image = metadata.register_node("Image:0", NodeKind::Image)?;
            metadata.register_node("Instrument:0", NodeKind::Instrument)?;
            metadata.enqueue_reference(image, RefKind::Instrument, "Instrument:0")?;
            metadata.enqueue_reference(image, RefKind::Experimenter, "Experimenter:9")?;

            Ok(ParsedDataset {
                dataset,
                decoders: vec![decoder],
                metadata,
                global_meta: Attributes::new(),
            })
        }
    }

    fn open_synthetic(name: &str, contents: &[u8]) -> (tempfile::TempDir, Result<ImageReader>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        let readers: Vec<Box<dyn FormatReader>> = vec![Box::new(Synthetic)];
        let reader = ImageReader::open_with_readers(&path, &ReaderOptions::default(), &readers);
        (dir, reader)
    }

    #[test]
    fn test_open_and_read() {
        let (_dir, reader) = open_synthetic("a.syn", b"");
        let mut reader = reader.unwrap();
        assert_eq!(reader.format(), "Synthetic");
        assert_eq!(reader.series_count(), 1);
        assert_eq!(reader.image_count().unwrap(), 2);
        assert_eq!(reader.open_plane(1).unwrap(), vec![4, 5, 6, 7]);
        assert_eq!(reader.open_plane_region(1, 1, 1, 1, 1).unwrap(), vec![7]);
        assert!(matches!(reader.open_plane(2), Err(Error::OutOfRange { .. })));
        assert!(matches!(reader.set_series(1), Err(Error::SeriesOutOfBounds { .. })));
    }

    #[test]
    fn test_detect_by_header() {
        let (_dir, reader) = open_synthetic("a.bin", b"SYN\0");
        assert!(reader.is_ok());

        let (_dir, reader) = open_synthetic("b.bin", b"???");
        assert!(matches!(reader, Err(Error::UnknownFormat(_))));
    }

    #[test]
    fn test_close_and_reopen() {
        let (_dir, reader) = open_synthetic("a.syn", b"");
        let mut reader = reader.unwrap();
        reader.close();
        assert!(matches!(reader.open_plane(0), Err(Error::DecoderClosed { .. })));
        reader.reopen();
        assert_eq!(reader.open_plane(0).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_resolve_metadata_once() {
        let (_dir, reader) = open_synthetic("a.syn", b"");
        let mut reader = reader.unwrap();

        let (graph, unresolved) = reader.resolve_metadata().unwrap();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].target_id, "Experimenter:9");
        let image = graph.handle("Image:0").unwrap();
        assert_eq!(graph.get_linked(image, Slot::Instrument).unwrap().len(), 1);

        let (again, unresolved) = reader.resolve_metadata().unwrap();
        assert!(Arc::ptr_eq(&graph, &again));
        assert_eq!(unresolved.len(), 1);
    }

    #[test]
    fn test_shared_reader() {
        let (_dir, reader) = open_synthetic("a.syn", b"");
        let shared = reader.unwrap().into_shared();
        let worker = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || shared.lock().open_plane(1).unwrap())
        };
        assert_eq!(worker.join().unwrap(), vec![4, 5, 6, 7]);
        assert_eq!(shared.lock().open_plane(0).unwrap(), vec![0, 1, 2, 3]);
    }
}
