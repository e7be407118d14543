//! Dimension order: how a linear plane index walks the Z, C and T axes.

use std::fmt;
use std::str::FromStr;

use crate::util::{Error, Result};

/// A non-spatial axis of the plane sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Z,
    C,
    T,
}

impl Axis {
    /// Single-letter label as used in dimension order strings.
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            Self::Z => 'Z',
            Self::C => 'C',
            Self::T => 'T',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'Z' => Some(Self::Z),
            'C' => Some(Self::C),
            'T' => Some(Self::T),
            _ => None,
        }
    }
}

/// Permutation of `XYZCT` with the spatial axes first.
///
/// The three remaining axes are stored fastest- to slowest-varying, so
/// `XYCZT` means channel changes with every plane, then Z, then T.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DimensionOrder {
    axes: [Axis; 3],
}

impl DimensionOrder {
    pub const XYZCT: Self = Self { axes: [Axis::Z, Axis::C, Axis::T] };
    pub const XYZTC: Self = Self { axes: [Axis::Z, Axis::T, Axis::C] };
    pub const XYCZT: Self = Self { axes: [Axis::C, Axis::Z, Axis::T] };
    pub const XYCTZ: Self = Self { axes: [Axis::C, Axis::T, Axis::Z] };
    pub const XYTZC: Self = Self { axes: [Axis::T, Axis::Z, Axis::C] };
    pub const XYTCZ: Self = Self { axes: [Axis::T, Axis::C, Axis::Z] };

    /// All six valid orders.
    pub const ALL: [DimensionOrder; 6] = [
        Self::XYZCT,
        Self::XYZTC,
        Self::XYCZT,
        Self::XYCTZ,
        Self::XYTZC,
        Self::XYTCZ,
    ];

    /// Build from the three non-spatial axes, fastest first.
    pub fn from_axes(axes: [Axis; 3]) -> Result<Self> {
        let distinct = axes[0] != axes[1] && axes[1] != axes[2] && axes[0] != axes[2];
        if !distinct {
            let s: String = axes.iter().map(|a| a.letter()).collect();
            return Err(Error::InvalidDimensionOrder(format!("XY{}", s)));
        }
        Ok(Self { axes })
    }

    /// Non-spatial axes, fastest-varying first.
    #[inline]
    pub fn axes(&self) -> [Axis; 3] {
        self.axes
    }

    /// Position of `axis` in the fastest-to-slowest list.
    #[inline]
    pub fn position(&self, axis: Axis) -> usize {
        // axes is a permutation, the search cannot miss
        self.axes.iter().position(|a| *a == axis).unwrap_or(0)
    }

    /// Complete a partial order into a valid one.
    ///
    /// Spatial axes are forced to the front, unknown letters are dropped
    /// and missing axes are appended in `Z`, `C`, `T` sequence. `"XYC"`
    /// becomes `XYCZT`, `"XYTZ"` becomes `XYTZC`.
    pub fn make_sane(partial: &str) -> Self {
        let mut axes: Vec<Axis> = Vec::with_capacity(3);
        for c in partial.chars() {
            if let Some(a) = Axis::from_letter(c) {
                if !axes.contains(&a) {
                    axes.push(a);
                }
            }
        }
        for a in [Axis::Z, Axis::C, Axis::T] {
            if !axes.contains(&a) {
                axes.push(a);
            }
        }
        Self { axes: [axes[0], axes[1], axes[2]] }
    }
}

impl Default for DimensionOrder {
    fn default() -> Self {
        Self::XYZCT
    }
}

impl FromStr for DimensionOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let bytes = upper.as_bytes();
        if bytes.len() != 5 || &bytes[..2] != b"XY" {
            return Err(Error::InvalidDimensionOrder(s.to_string()));
        }
        let mut axes = [Axis::Z; 3];
        for (slot, c) in axes.iter_mut().zip(upper[2..].chars()) {
            *slot = Axis::from_letter(c).ok_or_else(|| Error::InvalidDimensionOrder(s.to_string()))?;
        }
        Self::from_axes(axes).map_err(|_| Error::InvalidDimensionOrder(s.to_string()))
    }
}

impl fmt::Display for DimensionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("XY")?;
        for a in self.axes {
            write!(f, "{}", a.letter())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display_roundtrip() {
        for order in DimensionOrder::ALL {
            let s = order.to_string();
            assert_eq!(s.parse::<DimensionOrder>().unwrap(), order);
        }
        assert_eq!("xyczt".parse::<DimensionOrder>().unwrap(), DimensionOrder::XYCZT);
    }

    #[test]
    fn test_parse_rejects() {
        for bad in ["XYZZT", "ZXYCT", "XYZC", "XYZCTT", "XYABC", ""] {
            assert!(bad.parse::<DimensionOrder>().is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn test_make_sane() {
        assert_eq!(DimensionOrder::make_sane("XY"), DimensionOrder::XYZCT);
        assert_eq!(DimensionOrder::make_sane("XYC"), DimensionOrder::XYCZT);
        assert_eq!(DimensionOrder::make_sane("XYTZ"), DimensionOrder::XYTZC);
        assert_eq!(DimensionOrder::make_sane("XYZTZ"), DimensionOrder::XYZTC);
        assert_eq!(DimensionOrder::make_sane("CXY"), DimensionOrder::XYCZT);
    }

    #[test]
    fn test_position() {
        let o = DimensionOrder::XYTCZ;
        assert_eq!(o.position(Axis::T), 0);
        assert_eq!(o.position(Axis::C), 1);
        assert_eq!(o.position(Axis::Z), 2);
    }
}
