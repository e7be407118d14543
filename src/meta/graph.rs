//! ID-keyed metadata registry with deferred reference resolution.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use super::node::{MetadataNode, NodeHandle, NodeKind};
use super::reference::{link_rule, RefKind, Slot};
use crate::util::{Error, Result};

/// Lifecycle of a [`MetadataGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphState {
    /// Nodes and references may be added.
    Building,
    /// `resolve()` in progress.
    Resolving,
    /// Associations are read-only; attributes stay writable.
    Resolved,
}

impl GraphState {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Resolving => "resolving",
            Self::Resolved => "resolved",
        }
    }
}

/// A reference recorded before its target is known to exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingReference {
    pub source: NodeHandle,
    pub tag: RefKind,
    pub target_id: String,
}

/// Why a pending reference could not be linked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// No node registered under the target ID.
    Missing,
    /// The target exists but has a kind the tag does not accept.
    WrongKind(NodeKind),
}

/// Diagnostic for a reference skipped during resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub source_id: String,
    pub source_kind: NodeKind,
    pub tag: RefKind,
    pub target_id: String,
    pub reason: UnresolvedReason,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            UnresolvedReason::Missing => write!(
                f,
                "{} {} references missing {} '{}'",
                self.source_kind, self.source_id, self.tag, self.target_id
            ),
            UnresolvedReason::WrongKind(found) => write!(
                f,
                "{} {} references {} '{}' which is a {}",
                self.source_kind, self.source_id, self.tag, self.target_id, found
            ),
        }
    }
}

/// Owner of every metadata node of one dataset.
///
/// Parsers register nodes and enqueue references in any order, then call
/// [`resolve`](Self::resolve) once. Resolution links every reference whose
/// target exists and reports the rest without aborting.
///
/// # Example
/// ```
/// use bioformats::meta::{MetadataGraph, NodeKind, RefKind, Slot};
///
/// let mut graph = MetadataGraph::new();
/// let image = graph.register_node("Image:0", NodeKind::Image).unwrap();
/// graph.enqueue_reference(image, RefKind::Instrument, "Instrument:0").unwrap();
/// let instrument = graph.register_node("Instrument:0", NodeKind::Instrument).unwrap();
///
/// let unresolved = graph.resolve().unwrap();
/// assert!(unresolved.is_empty());
/// assert_eq!(graph.get_linked(image, Slot::Instrument).unwrap(), &[instrument]);
/// ```
#[derive(Clone, Debug)]
pub struct MetadataGraph {
    nodes: Vec<MetadataNode>,
    index: HashMap<String, NodeHandle>,
    pending: Vec<PendingReference>,
    state: GraphState,
}

impl Default for MetadataGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            pending: Vec::new(),
            state: GraphState::Building,
        }
    }

    #[inline]
    pub fn state(&self) -> GraphState {
        self.state
    }

    /// Number of registered nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// References waiting for `resolve()`.
    pub fn pending(&self) -> &[PendingReference] {
        &self.pending
    }

    /// Register a node under a caller-assigned ID.
    pub fn register_node(&mut self, id: impl Into<String>, kind: NodeKind) -> Result<NodeHandle> {
        self.require(GraphState::Building)?;
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(Error::DuplicateId(id));
        }
        let handle = NodeHandle(self.nodes.len());
        self.index.insert(id.clone(), handle);
        self.nodes.push(MetadataNode::new(id, kind));
        Ok(handle)
    }

    /// Record that `owner` refers to the node that will be registered as
    /// `target_id`.
    pub fn enqueue_reference(
        &mut self,
        owner: NodeHandle,
        tag: RefKind,
        target_id: impl Into<String>,
    ) -> Result<()> {
        self.require(GraphState::Building)?;
        let node = self.get(owner)?;
        if link_rule(node.kind(), tag).is_none() {
            return Err(Error::UnsupportedReference {
                source_id: node.id().to_string(),
                kind: node.kind().name(),
                tag: tag.name(),
            });
        }
        self.pending.push(PendingReference {
            source: owner,
            tag,
            target_id: target_id.into(),
        });
        Ok(())
    }

    /// Link every pending reference, in enqueue order.
    ///
    /// Runs once. References whose target is missing or of the wrong kind
    /// are skipped and returned as diagnostics.
    pub fn resolve(&mut self) -> Result<Vec<UnresolvedReference>> {
        self.require(GraphState::Building)?;
        self.state = GraphState::Resolving;

        let pending = std::mem::take(&mut self.pending);
        let total = pending.len();
        let mut unresolved = Vec::new();

        for reference in pending {
            let (source_id, source_kind) = {
                let node = &self.nodes[reference.source.0];
                (node.id().to_string(), node.kind())
            };
            // enqueue_reference already checked the pair
            let Some(rule) = link_rule(source_kind, reference.tag) else {
                continue;
            };

            let reason = match self.index.get(&reference.target_id) {
                None => Some(UnresolvedReason::Missing),
                Some(&target) => {
                    let target_kind = self.nodes[target.0].kind();
                    if rule.accepts(target_kind) {
                        self.nodes[reference.source.0].link(rule.forward, target);
                        if let Some(back) = rule.backward {
                            self.nodes[target.0].link(back, reference.source);
                        }
                        None
                    } else {
                        Some(UnresolvedReason::WrongKind(target_kind))
                    }
                }
            };

            if let Some(reason) = reason {
                let diag = UnresolvedReference {
                    source_id,
                    source_kind,
                    tag: reference.tag,
                    target_id: reference.target_id,
                    reason,
                };
                warn!("{}", diag);
                unresolved.push(diag);
            }
        }

        self.state = GraphState::Resolved;
        debug!(
            nodes = self.nodes.len(),
            references = total,
            unresolved = unresolved.len(),
            "metadata graph resolved"
        );
        Ok(unresolved)
    }

    /// Handles linked from `node` through `slot`, in link order.
    pub fn get_linked(&self, node: NodeHandle, slot: Slot) -> Result<&[NodeHandle]> {
        self.require(GraphState::Resolved)?;
        Ok(self.get(node)?.linked(slot))
    }

    /// Look up a node by ID.
    pub fn handle(&self, id: &str) -> Option<NodeHandle> {
        self.index.get(id).copied()
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&MetadataNode> {
        self.nodes.get(handle.0)
    }

    /// Like [`node`](Self::node) but with an error for foreign handles.
    pub fn get(&self, handle: NodeHandle) -> Result<&MetadataNode> {
        self.nodes.get(handle.0).ok_or(Error::UnknownHandle(handle.0))
    }

    /// Set a scalar attribute. Allowed in every state.
    pub fn set_attr(
        &mut self,
        handle: NodeHandle,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        let node = self
            .nodes
            .get_mut(handle.0)
            .ok_or(Error::UnknownHandle(handle.0))?;
        node.attrs_mut().set(key, value);
        Ok(())
    }

    /// All nodes with their handles, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &MetadataNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeHandle(i), n))
    }

    /// Nodes of one kind, in registration order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = (NodeHandle, &MetadataNode)> {
        self.iter().filter(move |(_, n)| n.kind() == kind)
    }

    fn require(&self, expected: GraphState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::GraphState {
                expected: expected.name(),
                actual: self.state.name(),
            })
        }
    }
}
