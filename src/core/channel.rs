//! Sub-dimensions folded into the channel axis.

use std::fmt;

/// Meaning of one physical axis folded into the logical channel axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    #[default]
    Channel,
    Lifetime,
    Spectra,
    Phase,
    Frequency,
    Other,
}

impl ChannelKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Channel => "Channel",
            Self::Lifetime => "Lifetime",
            Self::Spectra => "Spectra",
            Self::Phase => "Phase",
            Self::Frequency => "Frequency",
            Self::Other => "",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One (axis-length, axis-kind) pair of the channel axis.
///
/// The product of all lengths of a series equals its `size_c`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelDim {
    pub length: usize,
    pub kind: ChannelKind,
}

impl ChannelDim {
    pub const fn new(length: usize, kind: ChannelKind) -> Self {
        Self { length, kind }
    }

    /// Plain channel axis of the given length.
    pub const fn channels(length: usize) -> Self {
        Self::new(length, ChannelKind::Channel)
    }
}
