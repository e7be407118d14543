//! Metadata node records.

use smallvec::SmallVec;
use std::fmt;

use super::attributes::Attributes;
use super::reference::Slot;

/// Stable handle of a node inside one [`MetadataGraph`](super::MetadataGraph).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub(super) usize);

impl NodeHandle {
    /// Position of the node in registration order.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Type of a metadata node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Image,
    Pixels,
    Plane,
    Channel,
    Instrument,
    Objective,
    Detector,
    Laser,
    FilterSet,
    Filter,
    Dichroic,
    Experimenter,
    Experiment,
    Plate,
    Well,
    WellSample,
    PlateAcquisition,
    Annotation,
}

impl NodeKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Pixels => "Pixels",
            Self::Plane => "Plane",
            Self::Channel => "Channel",
            Self::Instrument => "Instrument",
            Self::Objective => "Objective",
            Self::Detector => "Detector",
            Self::Laser => "Laser",
            Self::FilterSet => "FilterSet",
            Self::Filter => "Filter",
            Self::Dichroic => "Dichroic",
            Self::Experimenter => "Experimenter",
            Self::Experiment => "Experiment",
            Self::Plate => "Plate",
            Self::Well => "Well",
            Self::WellSample => "WellSample",
            Self::PlateAcquisition => "PlateAcquisition",
            Self::Annotation => "Annotation",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type Links = SmallVec<[NodeHandle; 2]>;

/// One typed record of the graph.
///
/// Holds scalar attributes plus reference slots. Each slot is an
/// ordered set of non-owning handles filled during resolution.
#[derive(Clone, Debug)]
pub struct MetadataNode {
    id: String,
    kind: NodeKind,
    attrs: Attributes,
    slots: SmallVec<[(Slot, Links); 2]>,
}

impl MetadataNode {
    pub(super) fn new(id: String, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            attrs: Attributes::new(),
            slots: SmallVec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[inline]
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub(super) fn attrs_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }

    /// Shortcut for `attrs().get(key)`.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key)
    }

    /// Handles in `slot`, in link order.
    pub fn linked(&self, slot: Slot) -> &[NodeHandle] {
        self.slots
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, links)| links.as_slice())
            .unwrap_or(&[])
    }

    /// Non-empty slots.
    pub fn slots(&self) -> impl Iterator<Item = (Slot, &[NodeHandle])> {
        self.slots.iter().map(|(s, links)| (*s, links.as_slice()))
    }

    /// Add `target` to `slot` unless already present; returns whether it was added.
    pub(super) fn link(&mut self, slot: Slot, target: NodeHandle) -> bool {
        let links = match self.slots.iter().position(|(s, _)| *s == slot) {
            Some(i) => &mut self.slots[i].1,
            None => {
                self.slots.push((slot, Links::new()));
                let last = self.slots.len() - 1;
                &mut self.slots[last].1
            }
        };
        if links.contains(&target) {
            return false;
        }
        links.push(target);
        true
    }
}
