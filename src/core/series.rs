//! Series descriptor: shape and storage layout of one image series.

use super::addressing::{self, Region, ZctCoord};
use super::channel::ChannelDim;
use super::dimension_order::DimensionOrder;
use crate::util::{Error, PixelType, Result};

/// Shape and pixel layout of one independently addressable image series.
///
/// Format parsers fill a descriptor through the setters and then call
/// [`finalize`](Self::finalize). Finalizing computes the image count and
/// freezes the Z, C and T extents, so the number of addressable planes
/// can never drift from what the decoder serves.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesDescriptor {
    series: usize,
    size_x: usize,
    size_y: usize,
    size_z: usize,
    size_c: usize,
    size_t: usize,
    samples_per_pixel: usize,
    dimension_order: DimensionOrder,
    pixel_type: PixelType,
    bits_per_pixel: usize,
    little_endian: bool,
    indexed: bool,
    interleaved: bool,
    channel_dims: Vec<ChannelDim>,
    image_count: Option<usize>,
}

impl Default for SeriesDescriptor {
    fn default() -> Self {
        Self {
            series: 0,
            size_x: 1,
            size_y: 1,
            size_z: 1,
            size_c: 1,
            size_t: 1,
            samples_per_pixel: 1,
            dimension_order: DimensionOrder::default(),
            pixel_type: PixelType::default(),
            bits_per_pixel: 0,
            little_endian: true,
            indexed: false,
            interleaved: false,
            channel_dims: Vec::new(),
            image_count: None,
        }
    }
}

impl SeriesDescriptor {
    /// Create a single-plane descriptor of the given plane size.
    pub fn new(size_x: usize, size_y: usize) -> Self {
        Self { size_x, size_y, ..Self::default() }
    }

    // === Builder-style setters (consume self) ===

    pub fn with_zct(mut self, size_z: usize, size_c: usize, size_t: usize) -> Self {
        self.size_z = size_z;
        self.size_c = size_c;
        self.size_t = size_t;
        self
    }

    pub fn with_dimension_order(mut self, order: DimensionOrder) -> Self {
        self.dimension_order = order;
        self
    }

    pub fn with_pixel_type(mut self, pixel_type: PixelType) -> Self {
        self.pixel_type = pixel_type;
        self
    }

    pub fn with_samples_per_pixel(mut self, spp: usize) -> Self {
        self.samples_per_pixel = spp;
        self
    }

    pub fn with_little_endian(mut self, little_endian: bool) -> Self {
        self.little_endian = little_endian;
        self
    }

    pub fn with_channel_dims(mut self, dims: Vec<ChannelDim>) -> Self {
        self.channel_dims = dims;
        self
    }

    // === Getters ===

    /// Index of this series within its dataset.
    #[inline]
    pub fn series(&self) -> usize {
        self.series
    }
    #[inline]
    pub fn size_x(&self) -> usize {
        self.size_x
    }
    #[inline]
    pub fn size_y(&self) -> usize {
        self.size_y
    }
    #[inline]
    pub fn size_z(&self) -> usize {
        self.size_z
    }
    #[inline]
    pub fn size_c(&self) -> usize {
        self.size_c
    }
    #[inline]
    pub fn size_t(&self) -> usize {
        self.size_t
    }
    #[inline]
    pub fn samples_per_pixel(&self) -> usize {
        self.samples_per_pixel
    }
    #[inline]
    pub fn dimension_order(&self) -> DimensionOrder {
        self.dimension_order
    }
    #[inline]
    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }
    #[inline]
    pub fn little_endian(&self) -> bool {
        self.little_endian
    }
    #[inline]
    pub fn indexed(&self) -> bool {
        self.indexed
    }
    #[inline]
    pub fn interleaved(&self) -> bool {
        self.interleaved
    }

    /// Valid bits per sample; defaults to the full sample width.
    pub fn bits_per_pixel(&self) -> usize {
        if self.bits_per_pixel == 0 {
            self.pixel_type.bytes_per_pixel() * 8
        } else {
            self.bits_per_pixel
        }
    }

    /// True when every pixel carries more than one interleaved sample.
    #[inline]
    pub fn is_rgb(&self) -> bool {
        self.samples_per_pixel > 1
    }

    /// Samples stored per pixel of one plane.
    #[inline]
    pub fn rgb_channel_count(&self) -> usize {
        if self.is_rgb() { self.samples_per_pixel } else { 1 }
    }

    /// Channel extent as seen by the plane index.
    #[inline]
    pub fn effective_size_c(&self) -> usize {
        if self.is_rgb() {
            self.size_c / self.samples_per_pixel
        } else {
            self.size_c
        }
    }

    /// Number of planes, fixed once finalized.
    ///
    /// Before [`finalize`](Self::finalize) an overflowing shape saturates.
    pub fn image_count(&self) -> usize {
        self.image_count
            .unwrap_or_else(|| self.checked_image_count().unwrap_or(usize::MAX))
    }

    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.image_count.is_some()
    }

    /// Explicit (length, kind) list for the channel axis.
    ///
    /// When the parser did not provide one, the whole channel axis is a
    /// single plain channel dimension.
    pub fn channel_dims(&self) -> Vec<ChannelDim> {
        if self.channel_dims.is_empty() {
            vec![ChannelDim::channels(self.size_c)]
        } else {
            self.channel_dims.clone()
        }
    }

    /// Bytes of one full plane.
    #[inline]
    pub fn plane_size(&self) -> usize {
        self.region_size(self.size_x, self.size_y)
    }

    /// Bytes of a `width` x `height` region of one plane.
    ///
    /// Saturates on overflow; a finalized descriptor guarantees the full
    /// plane fits.
    #[inline]
    pub fn region_size(&self, width: usize, height: usize) -> usize {
        self.checked_region_size(width, height).unwrap_or(usize::MAX)
    }

    fn checked_region_size(&self, width: usize, height: usize) -> Option<usize> {
        width
            .checked_mul(height)?
            .checked_mul(self.rgb_channel_count())?
            .checked_mul(self.pixel_type.bytes_per_pixel())
    }

    // === Mutators ===

    pub(crate) fn set_series(&mut self, series: usize) {
        self.series = series;
    }

    pub fn set_size_x(&mut self, v: usize) {
        self.size_x = v;
    }

    pub fn set_size_y(&mut self, v: usize) {
        self.size_y = v;
    }

    pub fn set_size_z(&mut self, v: usize) -> Result<()> {
        self.check_mutable()?;
        self.size_z = v;
        Ok(())
    }

    pub fn set_size_c(&mut self, v: usize) -> Result<()> {
        self.check_mutable()?;
        self.size_c = v;
        Ok(())
    }

    pub fn set_size_t(&mut self, v: usize) -> Result<()> {
        self.check_mutable()?;
        self.size_t = v;
        Ok(())
    }

    pub fn set_samples_per_pixel(&mut self, spp: usize) -> Result<()> {
        self.check_mutable()?;
        self.samples_per_pixel = spp;
        Ok(())
    }

    pub fn set_dimension_order(&mut self, order: DimensionOrder) -> Result<()> {
        self.check_mutable()?;
        self.dimension_order = order;
        Ok(())
    }

    pub fn set_channel_dims(&mut self, dims: Vec<ChannelDim>) -> Result<()> {
        self.check_mutable()?;
        self.channel_dims = dims;
        Ok(())
    }

    pub fn set_pixel_type(&mut self, pixel_type: PixelType) {
        self.pixel_type = pixel_type;
    }

    pub fn set_bits_per_pixel(&mut self, bits: usize) {
        self.bits_per_pixel = bits;
    }

    pub fn set_little_endian(&mut self, little_endian: bool) {
        self.little_endian = little_endian;
    }

    pub fn set_indexed(&mut self, indexed: bool) {
        self.indexed = indexed;
    }

    pub fn set_interleaved(&mut self, interleaved: bool) {
        self.interleaved = interleaved;
    }

    fn check_mutable(&self) -> Result<()> {
        if self.is_finalized() {
            Err(Error::SeriesFrozen { series: self.series })
        } else {
            Ok(())
        }
    }

    fn checked_image_count(&self) -> Option<usize> {
        self.size_z
            .checked_mul(self.effective_size_c())?
            .checked_mul(self.size_t)
    }

    /// Validate extents and freeze the image count.
    ///
    /// Calling it again on a finalized descriptor is a no-op.
    pub fn finalize(&mut self) -> Result<()> {
        if self.is_finalized() {
            return Ok(());
        }
        let extents = [self.size_x, self.size_y, self.size_z, self.size_c, self.size_t];
        if extents.contains(&0) || self.samples_per_pixel == 0 {
            return Err(Error::format(format!(
                "series {}: zero extent in {}x{}x{}x{}x{} (spp {})",
                self.series,
                self.size_x,
                self.size_y,
                self.size_z,
                self.size_c,
                self.size_t,
                self.samples_per_pixel
            )));
        }
        if self.is_rgb() && self.size_c % self.samples_per_pixel != 0 {
            return Err(Error::format(format!(
                "series {}: size_c {} is not a multiple of {} samples per pixel",
                self.series, self.size_c, self.samples_per_pixel
            )));
        }
        if !self.channel_dims.is_empty() {
            let product = self
                .channel_dims
                .iter()
                .try_fold(1usize, |acc, d| acc.checked_mul(d.length));
            if product != Some(self.size_c) {
                return Err(Error::format(format!(
                    "series {}: channel dimensions {:?} do not multiply to size_c {}",
                    self.series, self.channel_dims, self.size_c
                )));
            }
        }
        // every plane of the series must be addressable as a byte offset
        let image_count = self.checked_image_count();
        let total = self
            .checked_region_size(self.size_x, self.size_y)
            .zip(image_count)
            .and_then(|(plane, count)| plane.checked_mul(count))
            .filter(|&bytes| u64::try_from(bytes).is_ok());
        let (Some(image_count), Some(_)) = (image_count, total) else {
            return Err(Error::format(format!(
                "series {}: shape {}x{}x{}x{}x{} overflows the addressable size",
                self.series, self.size_x, self.size_y, self.size_z, self.size_c, self.size_t
            )));
        };
        self.image_count = Some(image_count);
        Ok(())
    }

    // === Addressing shortcuts ===

    pub fn index_to_coord(&self, index: usize) -> Result<ZctCoord> {
        addressing::index_to_coord(self, index)
    }

    pub fn coord_to_index(&self, coord: impl Into<ZctCoord>) -> Result<usize> {
        addressing::coord_to_index(self, coord.into())
    }

    pub fn check_plane_region(&self, index: usize, region: Region) -> Result<()> {
        addressing::check_plane_region(self, index, region)
    }

    /// The region covering the whole plane.
    pub fn full_region(&self) -> Region {
        Region::new(0, 0, self.size_x, self.size_y)
    }
}
