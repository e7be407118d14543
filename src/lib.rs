//! # bioformats
//!
//! Decoding core for scientific microscopy image files.
//!
//! Every format parser plugs into the same infrastructure: a dimension
//! model that maps linear plane indices onto Z, C and T coordinates, a
//! streaming plane decoder that serves random-access reads even over
//! sequential compressed payloads, and a metadata graph whose ID-based
//! references are resolved into bidirectional links in one pass.
//!
//! ## Modules
//!
//! - [`util`] - Pixel types, errors, typed sample access
//! - [`core`] - Dimension model and plane addressing
//! - [`io`] - Byte sources, codecs and the plane decoder
//! - [`meta`] - Metadata graph and its node vocabulary
//! - [`text`] - Tokenizer and key classifier for text headers
//! - [`formats`] - Format parsers (ICS)
//!
//! ## Example
//!
//! ```ignore
//! use bioformats::ImageReader;
//!
//! let mut reader = ImageReader::open("cells.ics")?;
//! println!("{} planes", reader.image_count()?);
//! let plane = reader.open_plane(0)?;
//! let (graph, unresolved) = reader.resolve_metadata()?;
//! ```

pub mod util;
pub mod core;
pub mod io;
pub mod meta;
pub mod text;
pub mod formats;

mod reader;

pub use reader::{ImageReader, SharedReader};
pub use util::{Error, PixelType, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{ChannelDim, ChannelKind, DimensionOrder, Region, SeriesDescriptor, ZctCoord};
    pub use crate::formats::{MetadataLevel, ReaderOptions};
    pub use crate::meta::{MetadataGraph, NodeHandle, NodeKind, RefKind, Slot, UnresolvedReference};
    pub use crate::reader::{ImageReader, SharedReader};
    pub use crate::util::{Error, PixelType, Result};
}
