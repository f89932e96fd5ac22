use std::collections::BTreeSet;

use log::{debug, trace};

use super::order::DocumentOrder;
use crate::text::{Annotation, AnnotationFilter, AnnotationRef, Range, Text};

/// Local name of the virtual annotation wrapping the whole document.
pub const ROOT_NAME: &str = "treeRoot";

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The virtual whole-document annotation.
    Root,
    Annotation(AnnotationRef),
    /// A partition of the content with no annotation of its own.
    Text,
}

#[derive(Debug, Clone)]
pub struct AdhocNode {
    pub kind: NodeKind,
    /// Clipped to the parent's range, so siblings never overlap.
    pub range: Range,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl AdhocNode {
    pub fn annotation(&self) -> Option<AnnotationRef> {
        match self.kind {
            NodeKind::Annotation(a) => Some(a),
            _ => None,
        }
    }
}

/// A strictly nested tree reconstructed from overlapping annotations.
///
/// Children of a node alternate between text leaves and annotation nodes and
/// cover the node's range without gaps or overlap.
#[derive(Debug, Clone)]
pub struct AdhocTree {
    nodes: Vec<AdhocNode>,
}

struct Scan<'a> {
    text: &'a Text,
    structural: &'a BTreeSet<String>,
    order: DocumentOrder,
}

impl AdhocTree {
    pub const ROOT: NodeId = 0;

    /// Builds the tree over the whole text. Only annotations whose local name
    /// is in `structural` become nodes; all annotations cut text leaves.
    pub fn build(text: &Text, structural: &BTreeSet<String>) -> Self {
        let scan = Scan {
            text,
            structural,
            order: DocumentOrder::new(text),
        };
        let mut tree = Self {
            nodes: vec![AdhocNode {
                kind: NodeKind::Root,
                range: Range::new(0, text.content_length()),
                parent: None,
                children: Vec::new(),
            }],
        };
        let mut ancestors = Vec::new();
        tree.expand(&scan, Self::ROOT, &mut ancestors);
        debug!("ad-hoc tree: {} nodes", tree.nodes.len());
        tree
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &AdhocNode {
        &self.nodes[id]
    }

    /// Read access to one node together with the text it was built from.
    pub fn view<'a>(&'a self, text: &'a Text, id: NodeId) -> NodeRef<'a> {
        NodeRef {
            tree: self,
            text,
            id,
        }
    }

    /// Nested markup of the tree, e.g. `<zone><line>ab</line></zone>`.
    pub fn to_markup(&self, text: &Text) -> String {
        let mut out = String::new();
        self.write_markup(text, Self::ROOT, &mut out);
        out
    }

    fn write_markup(&self, text: &Text, id: NodeId, out: &mut String) {
        let node = &self.nodes[id];
        match node.kind {
            NodeKind::Text => out.push_str(&text.slice(node.range)),
            NodeKind::Root => {
                for c in &node.children {
                    self.write_markup(text, *c, out);
                }
            }
            NodeKind::Annotation(a) => {
                let name = text.annotation(a).local_name();
                out.push('<');
                out.push_str(name);
                out.push('>');
                for c in &node.children {
                    self.write_markup(text, *c, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }

    fn push(&mut self, kind: NodeKind, range: Range, parent: NodeId) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(AdhocNode {
            kind,
            range,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    fn push_text(&mut self, scan: &Scan<'_>, parent: NodeId, range: Range) {
        for part in scan
            .text
            .partition(None, Some(range.start), Some(range.end))
        {
            self.push(NodeKind::Text, part, parent);
        }
    }

    /// Fills in the children of `id`. `ancestors` holds the annotations of
    /// `id` and everything above it.
    fn expand(&mut self, scan: &Scan<'_>, id: NodeId, ancestors: &mut Vec<AnnotationRef>) {
        let range = self.nodes[id].range;
        let parent = self.nodes[id].annotation();
        let mut siblings: Vec<AnnotationRef> = Vec::new();
        let mut from = range.start;

        while let Some(next) = next_outermost(scan, from, range.end, &siblings, ancestors, parent) {
            let clipped = scan
                .text
                .annotation(next)
                .local_range()
                .unwrap_or(Range::new(from, from))
                .clamp_to(Range::new(from, range.end));
            if clipped.start > from {
                self.push_text(scan, id, Range::new(from, clipped.start));
            }
            trace!(
                "node {id}: child {} at {clipped}",
                scan.text.annotation(next).name
            );
            siblings.push(next);
            self.push(NodeKind::Annotation(next), clipped, id);
            from = from.max(clipped.end);
        }
        if from < range.end {
            self.push_text(scan, id, Range::new(from, range.end));
        }

        let children = self.nodes[id].children.clone();
        for child in children {
            if let Some(a) = self.nodes[child].annotation() {
                ancestors.push(a);
                self.expand(scan, child, ancestors);
                ancestors.pop();
            }
        }
    }
}

/// The next annotation to emit as a child of `parent` at or after `from`:
/// among structural candidates overlapping `[from, end)` that are document
/// descendants of `parent`, not ancestors, not emitted siblings and not below
/// an emitted sibling, the first in document order among those with the
/// smallest start.
fn next_outermost(
    scan: &Scan<'_>,
    from: usize,
    end: usize,
    siblings: &[AnnotationRef],
    ancestors: &[AnnotationRef],
    parent: Option<AnnotationRef>,
) -> Option<AnnotationRef> {
    let mut candidates: Vec<(usize, AnnotationRef)> = scan
        .text
        .find(Some(from), Some(end), AnnotationFilter::Names(scan.structural))
        .into_iter()
        .filter(|a| !ancestors.contains(a) && !siblings.contains(a))
        .filter(|a| scan.order.is_descendant(*a, parent))
        .filter(|a| !siblings.iter().any(|s| scan.order.is_descendant(*a, Some(*s))))
        .filter_map(|a| scan.text.annotation(a).local_range().map(|r| (r.start, a)))
        .collect();

    let smallest = candidates.iter().map(|(start, _)| *start).min()?;
    candidates.retain(|(start, _)| *start == smallest);
    candidates
        .into_iter()
        .map(|(_, a)| a)
        .min_by(|a, b| scan.order.compare(*a, *b))
}

/// A node of an [`AdhocTree`] paired with its [`Text`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a AdhocTree,
    text: &'a Text,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.tree.nodes[self.id].kind
    }

    pub fn range(&self) -> Range {
        self.tree.nodes[self.id].range
    }

    pub fn text(&self) -> &'a Text {
        self.text
    }

    pub fn annotation(&self) -> Option<&'a Annotation> {
        self.tree.nodes[self.id]
            .annotation()
            .map(|a| self.text.annotation(a))
    }

    /// Local markup name; empty for text leaves.
    pub fn local_name(&self) -> &'a str {
        match self.kind() {
            NodeKind::Root => ROOT_NAME,
            NodeKind::Annotation(a) => self.text.annotation(a).local_name(),
            NodeKind::Text => "",
        }
    }

    pub fn attr(&self, key: &str) -> Option<&'a str> {
        self.annotation().and_then(|a| a.attr(key))
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attr(key).is_some()
    }

    /// Content of a text leaf, or of the whole range for annotation nodes.
    pub fn content(&self) -> String {
        self.text.slice(self.range())
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.tree.nodes[self.id]
            .parent
            .map(|id| self.tree.view(self.text, id))
    }

    pub fn ancestors(&self) -> impl Iterator<Item = NodeRef<'a>> + use<'a> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + use<'a> {
        let tree = self.tree;
        let text = self.text;
        tree.nodes[self.id]
            .children
            .iter()
            .map(move |c| tree.view(text, *c))
    }

    pub fn has_ancestor(&self, local: &str) -> bool {
        self.ancestors().any(|a| a.local_name() == local)
    }
}
