//! Reference tags and the link table.
//!
//! Every reference a parser may enqueue is a `(source kind, tag)` pair.
//! [`link_rule`] is the single table saying which pairs exist, what kind
//! the target must be, and which slots get filled on each side.

use std::fmt;

use super::node::NodeKind;

/// Target-type tag of a pending reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefKind {
    Instrument,
    Objective,
    Experimenter,
    Experiment,
    Annotation,
    Detector,
    LightSource,
    FilterSet,
    Dichroic,
    EmissionFilter,
    ExcitationFilter,
    PlateAcquisition,
    WellSample,
    Image,
}

impl RefKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Instrument => "InstrumentRef",
            Self::Objective => "ObjectiveRef",
            Self::Experimenter => "ExperimenterRef",
            Self::Experiment => "ExperimentRef",
            Self::Annotation => "AnnotationRef",
            Self::Detector => "DetectorRef",
            Self::LightSource => "LightSourceRef",
            Self::FilterSet => "FilterSetRef",
            Self::Dichroic => "DichroicRef",
            Self::EmissionFilter => "EmissionFilterRef",
            Self::ExcitationFilter => "ExcitationFilterRef",
            Self::PlateAcquisition => "PlateAcquisitionRef",
            Self::WellSample => "WellSampleRef",
            Self::Image => "ImageRef",
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named association slot on a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Instrument,
    Objective,
    Experimenter,
    Experiment,
    Annotations,
    /// Incoming side of annotation links.
    Annotated,
    Detector,
    LightSource,
    FilterSet,
    Dichroic,
    EmissionFilters,
    ExcitationFilters,
    Plate,
    PlateAcquisitions,
    WellSamples,
    Image,
}

impl Slot {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Instrument => "Instrument",
            Self::Objective => "Objective",
            Self::Experimenter => "Experimenter",
            Self::Experiment => "Experiment",
            Self::Annotations => "Annotations",
            Self::Annotated => "Annotated",
            Self::Detector => "Detector",
            Self::LightSource => "LightSource",
            Self::FilterSet => "FilterSet",
            Self::Dichroic => "Dichroic",
            Self::EmissionFilters => "EmissionFilters",
            Self::ExcitationFilters => "ExcitationFilters",
            Self::Plate => "Plate",
            Self::PlateAcquisitions => "PlateAcquisitions",
            Self::WellSamples => "WellSamples",
            Self::Image => "Image",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How one kind of reference is linked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkRule {
    /// Node kinds the target may have.
    pub targets: &'static [NodeKind],
    /// Slot filled on the source node.
    pub forward: Slot,
    /// Slot filled on the target node for bidirectional relations.
    pub backward: Option<Slot>,
}

impl LinkRule {
    const fn one_way(targets: &'static [NodeKind], forward: Slot) -> Self {
        Self { targets, forward, backward: None }
    }

    const fn both_ways(targets: &'static [NodeKind], forward: Slot, backward: Slot) -> Self {
        Self { targets, forward, backward: Some(backward) }
    }

    #[inline]
    pub fn accepts(&self, kind: NodeKind) -> bool {
        self.targets.contains(&kind)
    }
}

/// Link rule for a `(source kind, tag)` pair, `None` if the pair is not
/// a valid reference.
pub fn link_rule(source: NodeKind, tag: RefKind) -> Option<LinkRule> {
    use NodeKind as N;
    use RefKind as R;

    let rule = match (source, tag) {
        (N::Image, R::Instrument) => LinkRule::one_way(&[N::Instrument], Slot::Instrument),
        (N::Image, R::Objective) => LinkRule::one_way(&[N::Objective], Slot::Objective),
        (N::Image, R::Experimenter) => LinkRule::one_way(&[N::Experimenter], Slot::Experimenter),
        (N::Image, R::Experiment) => LinkRule::one_way(&[N::Experiment], Slot::Experiment),

        (N::Channel, R::Detector) => LinkRule::one_way(&[N::Detector], Slot::Detector),
        (N::Channel, R::LightSource) => LinkRule::one_way(&[N::Laser], Slot::LightSource),
        (N::Channel, R::FilterSet) => LinkRule::one_way(&[N::FilterSet], Slot::FilterSet),

        (N::FilterSet, R::Dichroic) => LinkRule::one_way(&[N::Dichroic], Slot::Dichroic),
        (N::FilterSet, R::EmissionFilter) => LinkRule::one_way(&[N::Filter], Slot::EmissionFilters),
        (N::FilterSet, R::ExcitationFilter) => {
            LinkRule::one_way(&[N::Filter], Slot::ExcitationFilters)
        }

        // === Screening topology ===
        (N::Plate, R::PlateAcquisition) => {
            LinkRule::both_ways(&[N::PlateAcquisition], Slot::PlateAcquisitions, Slot::Plate)
        }
        (N::PlateAcquisition, R::WellSample) => {
            LinkRule::both_ways(&[N::WellSample], Slot::WellSamples, Slot::PlateAcquisitions)
        }
        (N::WellSample, R::Image) => LinkRule::one_way(&[N::Image], Slot::Image),

        (
            N::Image | N::Plate | N::Well | N::PlateAcquisition | N::Experimenter,
            R::Annotation,
        ) => LinkRule::both_ways(&[N::Annotation], Slot::Annotations, Slot::Annotated),

        _ => return None,
    };
    Some(rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_table() {
        let rule = link_rule(NodeKind::Plate, RefKind::PlateAcquisition).unwrap();
        assert!(rule.accepts(NodeKind::PlateAcquisition));
        assert!(!rule.accepts(NodeKind::Plate));
        assert_eq!(rule.backward, Some(Slot::Plate));

        let rule = link_rule(NodeKind::Channel, RefKind::LightSource).unwrap();
        assert_eq!(rule.forward, Slot::LightSource);
        assert_eq!(rule.backward, None);

        assert!(link_rule(NodeKind::Well, RefKind::Annotation).is_some());
        assert!(link_rule(NodeKind::Detector, RefKind::Image).is_none());
        assert!(link_rule(NodeKind::Channel, RefKind::Annotation).is_none());
    }
}
