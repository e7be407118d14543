//! Typed views over raw plane bytes.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use super::PixelType;

/// Convert raw plane bytes into `f64` samples.
///
/// Trailing bytes that do not form a whole sample are ignored.
pub fn samples_as_f64(bytes: &[u8], pixel_type: PixelType, little_endian: bool) -> Vec<f64> {
    if little_endian {
        convert::<LittleEndian>(bytes, pixel_type)
    } else {
        convert::<BigEndian>(bytes, pixel_type)
    }
}

fn convert<B: ByteOrder>(bytes: &[u8], pixel_type: PixelType) -> Vec<f64> {
    let bpp = pixel_type.bytes_per_pixel();
    bytes
        .chunks_exact(bpp)
        .map(|s| match pixel_type {
            PixelType::Int8 => s[0] as i8 as f64,
            PixelType::Uint8 => s[0] as f64,
            PixelType::Int16 => B::read_i16(s) as f64,
            PixelType::Uint16 => B::read_u16(s) as f64,
            PixelType::Int32 => B::read_i32(s) as f64,
            PixelType::Uint32 => B::read_u32(s) as f64,
            PixelType::Float => B::read_f32(s) as f64,
            PixelType::Double => B::read_f64(s),
        })
        .collect()
}

/// Minimum and maximum sample value, or `None` for an empty buffer.
///
/// NaN samples are skipped.
pub fn min_max(bytes: &[u8], pixel_type: PixelType, little_endian: bool) -> Option<(f64, f64)> {
    samples_as_f64(bytes, pixel_type, little_endian)
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u16_both_orders() {
        let le = [0x01, 0x00, 0xFF, 0xFF];
        assert_eq!(samples_as_f64(&le, PixelType::Uint16, true), vec![1.0, 65535.0]);
        let be = [0x00, 0x01, 0x01, 0x00];
        assert_eq!(samples_as_f64(&be, PixelType::Uint16, false), vec![1.0, 256.0]);
    }

    #[test]
    fn test_signed_and_float() {
        assert_eq!(samples_as_f64(&[0xFF], PixelType::Int8, true), vec![-1.0]);
        let f = 2.5f32.to_le_bytes();
        assert_eq!(samples_as_f64(&f, PixelType::Float, true), vec![2.5]);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min_max(&[3, 9, 1, 4], PixelType::Uint8, true), Some((1.0, 9.0)));
        assert_eq!(min_max(&[], PixelType::Uint8, true), None);
    }
}
