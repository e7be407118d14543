//! Pixel sample types.

use std::fmt;

/// Storage type of a single pixel sample.
///
/// Every plane of a series stores samples of exactly one of these types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PixelType {
    /// Signed 8-bit integer
    Int8 = 0,
    /// Unsigned 8-bit integer
    #[default]
    Uint8 = 1,
    /// Signed 16-bit integer
    Int16 = 2,
    /// Unsigned 16-bit integer
    Uint16 = 3,
    /// Signed 32-bit integer
    Int32 = 4,
    /// Unsigned 32-bit integer
    Uint32 = 5,
    /// 32-bit floating point
    Float = 6,
    /// 64-bit floating point
    Double = 7,
}

impl PixelType {
    /// All pixel types, in tag order.
    pub const ALL: [PixelType; 8] = [
        Self::Int8,
        Self::Uint8,
        Self::Int16,
        Self::Uint16,
        Self::Int32,
        Self::Uint32,
        Self::Float,
        Self::Double,
    ];

    /// Size in bytes of one sample.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float => 4,
            Self::Double => 8,
        }
    }

    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Float | Self::Double
        )
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Canonical lowercase name.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// Parse from its canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// Pick the pixel type for a sample width and signedness.
    ///
    /// Returns `None` for combinations no format stores (e.g. 2-byte floats).
    pub fn from_bytes(bytes: usize, signed: bool, float: bool) -> Option<Self> {
        match (bytes, signed, float) {
            (1, false, false) => Some(Self::Uint8),
            (1, true, false) => Some(Self::Int8),
            (2, false, false) => Some(Self::Uint16),
            (2, true, false) => Some(Self::Int16),
            (4, false, false) => Some(Self::Uint32),
            (4, true, false) => Some(Self::Int32),
            (4, _, true) => Some(Self::Float),
            (8, _, true) => Some(Self::Double),
            _ => None,
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
