//! Utility types shared by every layer.
//!
//! - [`PixelType`] - Sample storage types
//! - [`Error`] / [`Result`] - Error handling
//! - [`samples_as_f64`] / [`min_max`] - Typed access to raw plane bytes

mod error;
mod pixel_type;
mod samples;

pub use error::*;
pub use pixel_type::*;
pub use samples::*;
