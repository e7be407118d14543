//! Pixel payload I/O.
//!
//! This module provides:
//! - [`ByteSource`] - Random-access byte source (mmap, file or memory)
//! - [`Location`] - Reopenable payload location
//! - [`Codec`] / [`decompressing_stream`] - Deflate-family sequential streams
//! - [`PlaneDecoder`] - Stateful plane reader with a forward-only cursor
//! - [`extract_region`] / [`invert_rows`] - Buffer post-processing

mod compression;
mod decoder;
mod region;
mod source;

pub use compression::*;
pub use decoder::*;
pub use region::*;
pub use source::*;
