//! Dimension model - pure shape and addressing arithmetic, no I/O.
//!
//! This module provides:
//! - [`SeriesDescriptor`] - Extents, pixel type and layout of one series
//! - [`DimensionOrder`] - Axis priority governing the plane sequence
//! - [`index_to_coord`] / [`coord_to_index`] / [`check_plane_region`] - Plane addressing
//! - [`ChannelDim`] - Explicit sub-dimensions of the channel axis
//! - [`Dataset`] - Ordered series plus their companion file group

mod addressing;
mod channel;
mod dataset;
mod dimension_order;
mod series;

pub use addressing::{
    check_plane_region, coord_to_index, effective_extent, index_to_coord, Region, ZctCoord,
};
pub use channel::{ChannelDim, ChannelKind};
pub use dataset::{Dataset, FileGroupOption};
pub use dimension_order::{Axis, DimensionOrder};
pub use series::SeriesDescriptor;
