//! Byte sources for pixel payloads.
//!
//! Supports memory-mapped files, buffered files and in-memory buffers.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use memmap2::Mmap;

use crate::util::{Error, Result};

/// Random-access byte source.
///
/// Format parsers hand these to the plane decoder; compressed payloads
/// are opened through the same abstraction and then wrapped in a
/// sequential decompressing stream.
pub trait ByteSource: Send {
    /// Move the read position to an absolute offset.
    fn seek(&mut self, offset: u64) -> io::Result<()>;

    /// Read up to `buf.len()` bytes, returning how many were read.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Total length in bytes.
    fn length(&self) -> u64;

    /// Current read position.
    fn position(&self) -> u64;

    /// Fill `buf` completely or fail with `UnexpectedEof`.
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..])? {
                0 => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("source ended at {} of {} bytes", filled, buf.len()),
                    ))
                }
                n => filled += n,
            }
        }
        Ok(())
    }
}

/// File-backed source.
pub struct FileSource {
    inner: FileInner,
    pos: u64,
    size: u64,
}

enum FileInner {
    /// Memory-mapped file (preferred for large files)
    Mmap(Mmap),
    /// Buffered file access (fallback)
    File(File),
}

impl FileSource {
    /// Open a file with memory mapping.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, true)
    }

    /// Open a file with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        let size = file.metadata()?.len();

        // Zero-length files cannot be mapped
        let inner = if use_mmap && size > 0 {
            // Safety: the file is opened read-only and never written through this mapping
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
            FileInner::Mmap(mmap)
        } else {
            FileInner::File(file)
        };

        Ok(Self { inner, pos: 0, size })
    }

    /// Check if the file is memory-mapped.
    #[inline]
    pub fn is_mapped(&self) -> bool {
        matches!(self.inner, FileInner::Mmap(_))
    }
}

impl ByteSource for FileSource {
    fn seek(&mut self, offset: u64) -> io::Result<()> {
        if let FileInner::File(f) = &mut self.inner {
            f.seek(SeekFrom::Start(offset))?;
        }
        self.pos = offset;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = match &mut self.inner {
            FileInner::Mmap(mmap) => copy_from(mmap, self.pos, buf),
            FileInner::File(f) => f.read(buf)?,
        };
        self.pos += n as u64;
        Ok(n)
    }

    fn length(&self) -> u64 {
        self.size
    }

    fn position(&self) -> u64 {
        self.pos
    }
}

/// In-memory source over shared bytes.
#[derive(Clone)]
pub struct MemorySource {
    data: Arc<[u8]>,
    pos: u64,
}

impl MemorySource {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self { data: data.into(), pos: 0 }
    }
}

impl ByteSource for MemorySource {
    fn seek(&mut self, offset: u64) -> io::Result<()> {
        self.pos = offset;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = copy_from(&self.data, self.pos, buf);
        self.pos += n as u64;
        Ok(n)
    }

    fn length(&self) -> u64 {
        self.data.len() as u64
    }

    fn position(&self) -> u64 {
        self.pos
    }
}

fn copy_from(data: &[u8], pos: u64, buf: &mut [u8]) -> usize {
    let start = (pos as usize).min(data.len());
    let n = buf.len().min(data.len() - start);
    buf[..n].copy_from_slice(&data[start..start + n]);
    n
}

/// Where a payload lives, so it can be reopened from the start.
#[derive(Clone, Debug)]
pub enum Location {
    /// A file, reopened mapped or buffered.
    File { path: PathBuf, use_mmap: bool },
    Memory(Arc<[u8]>),
}

impl Location {
    pub fn file(path: impl Into<PathBuf>, use_mmap: bool) -> Self {
        Self::File {
            path: path.into(),
            use_mmap,
        }
    }

    /// Open a fresh source positioned at offset 0.
    pub fn open(&self) -> Result<Box<dyn ByteSource>> {
        match self {
            Self::File { path, use_mmap } => Ok(Box::new(FileSource::open_opts(path, *use_mmap)?)),
            Self::Memory(data) => Ok(Box::new(MemorySource::new(Arc::clone(data)))),
        }
    }

    /// Short human-readable name.
    pub fn describe(&self) -> String {
        match self {
            Self::File { path, .. } => path.display().to_string(),
            Self::Memory(data) => format!("<memory: {} bytes>", data.len()),
        }
    }
}

/// Adapter exposing a [`ByteSource`] as a sequential [`Read`].
pub struct SourceReader {
    source: Box<dyn ByteSource>,
}

impl SourceReader {
    pub fn new(source: Box<dyn ByteSource>) -> Self {
        Self { source }
    }
}

impl Read for SourceReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.source.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PAGE: [u8; 16] = [
        0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0xFF,
        0xFE,
    ];

    fn check_source(src: &mut dyn ByteSource) {
        assert_eq!(src.length(), 16);

        let mut b = [0u8; 16];
        src.read_exact(&mut b).unwrap();
        assert_eq!(b, PAGE);
        assert_eq!(src.position(), 16);

        // seek forward then back
        src.seek(15).unwrap();
        src.seek(7).unwrap();
        let mut b = [0u8; 2];
        assert_eq!(src.read(&mut b).unwrap(), 2);
        assert_eq!(b, [0x08, 0x09]);
        assert_eq!(src.position(), 9);

        // reset
        src.seek(0).unwrap();
        src.read_exact(&mut b).unwrap();
        assert_eq!(b, [0x01, 0x02]);

        // short read at the end
        src.seek(14).unwrap();
        let mut b = [0u8; 4];
        assert_eq!(src.read(&mut b).unwrap(), 2);
        src.seek(14).unwrap();
        let err = src.read_exact(&mut b).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_memory_source() {
        let mut src = MemorySource::new(PAGE.to_vec());
        check_source(&mut src);
    }

    #[test]
    fn test_file_source_both_modes() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&PAGE).unwrap();
        tmp.flush().unwrap();

        let mut mapped = FileSource::open_opts(tmp.path(), true).unwrap();
        assert!(mapped.is_mapped());
        check_source(&mut mapped);

        let mut buffered = FileSource::open_opts(tmp.path(), false).unwrap();
        assert!(!buffered.is_mapped());
        check_source(&mut buffered);
    }

    #[test]
    fn test_missing_file() {
        let result = FileSource::open("/definitely/not/here.ids");
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_source_reader() {
        let loc = Location::Memory(Arc::from(PAGE.to_vec()));
        let mut reader = SourceReader::new(loc.open().unwrap());
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, PAGE);
    }
}
