//! Cropping and flipping of decoded plane buffers.

use crate::core::{Region, SeriesDescriptor};

/// Copy `region` out of a full plane buffer.
///
/// `plane` holds `size_y` rows of `size_x` pixels, each pixel being
/// `rgb_channel_count` interleaved samples.
pub fn extract_region(plane: &[u8], desc: &SeriesDescriptor, region: Region) -> Vec<u8> {
    let pixel = desc.rgb_channel_count() * desc.pixel_type().bytes_per_pixel();
    let row_len = desc.size_x() * pixel;
    let out_row = region.width * pixel;
    let mut out = Vec::with_capacity(out_row * region.height);
    for row in region.y..region.y + region.height {
        let start = row * row_len + region.x * pixel;
        out.extend_from_slice(&plane[start..start + out_row]);
    }
    out
}

/// Pull channel `channel` out of a record that stores `channels` samples
/// per pixel, cropping to `region`.
pub fn extract_channel(
    record: &[u8],
    desc: &SeriesDescriptor,
    channel: usize,
    channels: usize,
    region: Region,
) -> Vec<u8> {
    let bpp = desc.pixel_type().bytes_per_pixel();
    let mut out = Vec::with_capacity(region.width * region.height * bpp);
    for row in region.y..region.y + region.height {
        for col in region.x..region.x + region.width {
            let src = bpp * (channel + channels * (row * desc.size_x() + col));
            out.extend_from_slice(&record[src..src + bpp]);
        }
    }
    out
}

/// Reverse row order in place.
pub fn invert_rows(buf: &mut [u8], row_len: usize, height: usize) {
    if row_len == 0 {
        return;
    }
    for r in 0..height / 2 {
        let (top, bottom) = buf.split_at_mut((height - r - 1) * row_len);
        top[r * row_len..(r + 1) * row_len].swap_with_slice(&mut bottom[..row_len]);
    }
}
