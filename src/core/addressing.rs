//! Plane index arithmetic.
//!
//! A plane index is a mixed-radix number whose digits are the Z, C and T
//! coordinates, weighted fastest axis first according to the series'
//! dimension order. The channel digit uses the effective channel count,
//! so interleaved RGB samples never get planes of their own.

use super::dimension_order::Axis;
use super::series::SeriesDescriptor;
use crate::util::{Error, Result};

/// Z, C, T coordinate of a plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ZctCoord {
    pub z: usize,
    pub c: usize,
    pub t: usize,
}

impl ZctCoord {
    pub const fn new(z: usize, c: usize, t: usize) -> Self {
        Self { z, c, t }
    }

    #[inline]
    pub fn get(&self, axis: Axis) -> usize {
        match axis {
            Axis::Z => self.z,
            Axis::C => self.c,
            Axis::T => self.t,
        }
    }

    #[inline]
    fn set(&mut self, axis: Axis, value: usize) {
        match axis {
            Axis::Z => self.z = value,
            Axis::C => self.c = value,
            Axis::T => self.t = value,
        }
    }
}

impl From<(usize, usize, usize)> for ZctCoord {
    fn from((z, c, t): (usize, usize, usize)) -> Self {
        Self { z, c, t }
    }
}

/// Rectangular sub-region of a plane, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self { x, y, width, height }
    }
}

/// Extent of `axis` as seen by the plane index.
#[inline]
pub fn effective_extent(desc: &SeriesDescriptor, axis: Axis) -> usize {
    match axis {
        Axis::Z => desc.size_z(),
        Axis::C => desc.effective_size_c(),
        Axis::T => desc.size_t(),
    }
}

/// Decode a plane index into its Z, C, T coordinate.
pub fn index_to_coord(desc: &SeriesDescriptor, index: usize) -> Result<ZctCoord> {
    let count = desc.image_count();
    if index >= count {
        return Err(Error::OutOfRange { series: desc.series(), index, count });
    }
    let mut coord = ZctCoord::default();
    let mut rest = index;
    for axis in desc.dimension_order().axes() {
        let extent = effective_extent(desc, axis);
        coord.set(axis, rest % extent);
        rest /= extent;
    }
    Ok(coord)
}

/// Encode a Z, C, T coordinate as a plane index.
pub fn coord_to_index(desc: &SeriesDescriptor, coord: ZctCoord) -> Result<usize> {
    let mut index = 0;
    let mut weight = 1;
    for axis in desc.dimension_order().axes() {
        let extent = effective_extent(desc, axis);
        let value = coord.get(axis);
        if value >= extent {
            return Err(Error::CoordOutOfRange {
                series: desc.series(),
                axis: axis.letter(),
                value,
                extent,
            });
        }
        index += value * weight;
        weight *= extent;
    }
    Ok(index)
}

/// Validate a plane index and a region against the series extents.
///
/// Every decode path calls this before touching storage.
pub fn check_plane_region(desc: &SeriesDescriptor, index: usize, region: Region) -> Result<()> {
    let count = desc.image_count();
    if index >= count {
        return Err(Error::OutOfRange { series: desc.series(), index, count });
    }
    let fits_x = region.x.checked_add(region.width).is_some_and(|end| end <= desc.size_x());
    let fits_y = region.y.checked_add(region.height).is_some_and(|end| end <= desc.size_y());
    if region.width == 0 || region.height == 0 || !fits_x || !fits_y {
        return Err(Error::InvalidRegion {
            series: desc.series(),
            index,
            x: region.x,
            y: region.y,
            width: region.width,
            height: region.height,
            size_x: desc.size_x(),
            size_y: desc.size_y(),
        });
    }
    Ok(())
}
