//! Metadata graph - typed nodes linked through deferred ID references.
//!
//! This module provides:
//! - [`MetadataGraph`] - Node arena, ID index and one-shot resolution
//! - [`NodeKind`] / [`MetadataNode`] - Typed records with attributes and slots
//! - [`RefKind`] / [`Slot`] / [`link_rule`] - The closed reference table
//! - [`UnresolvedReference`] - Diagnostics for dangling references
//! - Controlled vocabularies such as [`Immersion`] and [`LaserMedium`]

mod attributes;
mod enums;
mod graph;
mod lsid;
mod node;
mod reference;

pub use attributes::Attributes;
pub use enums::*;
pub use graph::{GraphState, MetadataGraph, PendingReference, UnresolvedReason, UnresolvedReference};
pub use lsid::create_lsid;
pub use node::{MetadataNode, NodeHandle, NodeKind};
pub use reference::{link_rule, LinkRule, RefKind, Slot};
