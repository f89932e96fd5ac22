//! # Ad-hoc tree reconstruction
//!
//! Turns the flat, overlap-tolerant annotation set of a [`Text`](crate::text::Text)
//! into a strictly nested tree of annotation nodes and text leaves.
//!
//! ## Algorithm
//!
//! Each annotation node scans its range left to right. At scan position
//! `from` the next child is the outermost structural annotation starting
//! there: candidates are narrowed to the smallest start and ordered by
//! document order (`xml:node` paths). Text between children becomes leaves cut
//! at every annotation boundary. A child that crosses its parent's end is
//! clipped, so siblings never overlap.

pub mod order;
pub mod tree;

pub use order::{DocumentOrder, XML_NODE_ATTR};
pub use tree::{AdhocNode, AdhocTree, NodeId, NodeKind, NodeRef, ROOT_NAME};
