//! Error types for the decoding core.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dataset, decoder and metadata graph operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Plane index outside `[0, image_count)`
    #[error("Plane index {index} out of range for series {series} (image count: {count})")]
    OutOfRange { series: usize, index: usize, count: usize },

    /// Z, C or T coordinate outside its axis extent
    #[error("{axis} coordinate {value} out of range for series {series} (extent: {extent})")]
    CoordOutOfRange {
        series: usize,
        axis: char,
        value: usize,
        extent: usize,
    },

    /// Region does not fit inside the plane
    #[error(
        "Invalid region x={x} y={y} w={width} h={height} for plane {index} of series {series} \
         (plane is {size_x}x{size_y})"
    )]
    InvalidRegion {
        series: usize,
        index: usize,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        size_x: usize,
        size_y: usize,
    },

    /// Underlying stream or decompression failure while reading a plane
    #[error("Decode failed for plane {plane} of series {series}: {source}")]
    Decode {
        series: usize,
        plane: usize,
        #[source]
        source: std::io::Error,
    },

    /// Two metadata nodes registered with the same ID
    #[error("Duplicate metadata ID: {0}")]
    DuplicateId(String),

    /// Reference tag that the source node kind cannot carry
    #[error("{kind} node {source_id} cannot hold a {tag} reference")]
    UnsupportedReference {
        source_id: String,
        kind: &'static str,
        tag: &'static str,
    },

    /// Node handle not issued by this graph
    #[error("Unknown metadata node handle: {0}")]
    UnknownHandle(usize),

    /// Graph operation not allowed in the current lifecycle state
    #[error("Metadata graph is {actual}, operation requires {expected}")]
    GraphState {
        expected: &'static str,
        actual: &'static str,
    },

    /// Dimension order is not a permutation of XYZCT starting with XY
    #[error("Invalid dimension order: {0}")]
    InvalidDimensionOrder(String),

    /// Z/C/T extents mutated after the image count was finalized
    #[error("Series {series} is finalized; Z, C and T extents are frozen")]
    SeriesFrozen { series: usize },

    /// Series index out of bounds
    #[error("Series index {index} out of bounds (count: {count})")]
    SeriesOutOfBounds { index: usize, count: usize },

    /// Read attempted on a closed decoder
    #[error("Plane decoder for series {series} is closed")]
    DecoderClosed { series: usize },

    /// No registered format reader accepts the file
    #[error("Unknown file format: {0}")]
    UnknownFormat(PathBuf),

    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Malformed file content found by a format parser
    #[error("Invalid file structure: {0}")]
    Format(String),

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create a file structure error.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Wrap an I/O failure that happened while decoding a plane.
    pub fn decode(series: usize, plane: usize, source: std::io::Error) -> Self {
        Self::Decode { series, plane, source }
    }

    /// True for errors caused by bad caller input (index, coordinate or region).
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange { .. } | Self::CoordOutOfRange { .. } | Self::InvalidRegion { .. }
        )
    }
}

/// Result type alias for decoding operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::OutOfRange { series: 2, index: 7, count: 6 };
        let s = e.to_string();
        assert!(s.contains("7"));
        assert!(s.contains("series 2"));
        assert!(s.contains("6"));

        let e = Error::InvalidRegion {
            series: 0,
            index: 1,
            x: 8,
            y: 0,
            width: 4,
            height: 2,
            size_x: 10,
            size_y: 5,
        };
        assert!(e.to_string().contains("10x5"));
        assert!(e.is_caller_error());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_caller_error());
    }

    #[test]
    fn test_decode_keeps_source() {
        use std::error::Error as _;
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let err = Error::decode(1, 3, io_err);
        assert!(err.to_string().contains("plane 3"));
        assert!(err.source().is_some());
    }
}
