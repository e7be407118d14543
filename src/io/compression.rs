//! Deflate-family stream plumbing for compressed pixel payloads.
//!
//! Codec internals come from `flate2`; this module only opens streams,
//! skips through them and builds fixtures.

use std::io::{self, BufReader, Read, Write};

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;

use super::source::{ByteSource, SourceReader};

/// GZIP member header magic.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Compression applied to a whole pixel payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Codec {
    Gzip,
    Zlib,
}

impl Codec {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Zlib => "zlib",
        }
    }
}

/// Sequential decompressing stream.
pub type PlaneStream = Box<dyn Read + Send>;

/// Wrap a source positioned at the payload start in a decompressing stream.
pub fn decompressing_stream(codec: Codec, source: Box<dyn ByteSource>) -> PlaneStream {
    let raw = BufReader::new(SourceReader::new(source));
    match codec {
        Codec::Gzip => Box::new(GzDecoder::new(raw)),
        Codec::Zlib => Box::new(ZlibDecoder::new(raw)),
    }
}

/// Discard exactly `count` decompressed bytes.
pub fn skip_bytes(stream: &mut dyn Read, count: u64) -> io::Result<()> {
    if count == 0 {
        return Ok(());
    }
    let skipped = io::copy(&mut Read::take(&mut *stream, count), &mut io::sink())?;
    if skipped < count {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("stream ended after skipping {} of {} bytes", skipped, count),
        ));
    }
    Ok(())
}

/// Check whether `header` starts a GZIP member.
#[inline]
pub fn is_gzip(header: &[u8]) -> bool {
    header.len() >= 2 && header[..2] == GZIP_MAGIC
}

/// Compress a whole buffer.
///
/// # Arguments
/// * `data` - Data to compress
/// * `level` - Compression level (0-9)
pub fn compress(codec: Codec, data: &[u8], level: u32) -> io::Result<Vec<u8>> {
    let level = Compression::new(level.min(9));
    match codec {
        Codec::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), level);
            encoder.write_all(data)?;
            encoder.finish()
        }
        Codec::Zlib => {
            let mut encoder = ZlibEncoder::new(Vec::new(), level);
            encoder.write_all(data)?;
            encoder.finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemorySource;

    #[test]
    fn test_stream_roundtrip() {
        let original = b"Plane data that should compress well when repeated. ".repeat(64);
        for codec in [Codec::Gzip, Codec::Zlib] {
            let packed = compress(codec, &original, 6).unwrap();
            assert!(packed.len() < original.len());
            let mut stream = decompressing_stream(codec, Box::new(MemorySource::new(packed)));
            let mut out = Vec::new();
            stream.read_to_end(&mut out).unwrap();
            assert_eq!(out, original);
        }
    }

    #[test]
    fn test_skip_bytes() {
        let original: Vec<u8> = (0..=255u8).collect();
        let packed = compress(Codec::Gzip, &original, 6).unwrap();
        let mut stream = decompressing_stream(Codec::Gzip, Box::new(MemorySource::new(packed)));
        skip_bytes(&mut stream, 200).unwrap();
        let mut b = [0u8; 3];
        stream.read_exact(&mut b).unwrap();
        assert_eq!(b, [200, 201, 202]);
        let err = skip_bytes(&mut stream, 100).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_is_gzip() {
        let packed = compress(Codec::Gzip, b"abc", 1).unwrap();
        assert!(is_gzip(&packed));
        assert!(!is_gzip(b"abc"));
        assert!(!is_gzip(&[0x1F]));
    }
}
