use log::{debug, trace};

use super::{context::BuildContext, policy::PolicyRegistry};
use crate::{
    adhoc::{AdhocTree, NodeId, NodeKind, NodeRef},
    error::{EncodingError, RenderError},
    layout::{Align, Axis, ComponentId, ComponentKind, Overlay, Priority, ViewTree},
    text::Text,
};

/// Attributes anchoring an element to another element by `xml:id`:
/// `(attribute, axis, my joint, your joint)`.
const ALIGNING_ATTRIBUTES: [(&str, Axis, f64, f64); 9] = [
    ("f:at", Axis::Horizontal, 1.0, 0.0),
    ("f:left", Axis::Horizontal, 0.0, 0.0),
    ("f:left-right", Axis::Horizontal, 0.0, 1.0),
    ("f:right", Axis::Horizontal, 1.0, 1.0),
    ("f:right-left", Axis::Horizontal, 1.0, 0.0),
    ("f:top", Axis::Vertical, 0.0, 0.0),
    ("f:top-bottom", Axis::Vertical, 0.0, 1.0),
    ("f:bottom", Axis::Vertical, 1.0, 1.0),
    ("f:bottom-top", Axis::Vertical, 1.0, 0.0),
];

/// Trailing text of every line; gives empty lines a height.
const EMPTY_LINE_FILLER: &str = "\u{a0}";

/// Options for turning an ad-hoc tree into a view tree.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    pub overlay: Overlay,
    /// Elements whose whitespace-only text is dropped.
    pub strip_whitespace: Vec<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            overlay: Overlay::None,
            strip_whitespace: vec!["overw".to_string()],
        }
    }
}

/// An explicit alignment waiting for its anchor to exist.
#[derive(Debug)]
struct DeferredAlign {
    vc: ComponentId,
    anchor: String,
    axis: Axis,
    my_joint: f64,
    your_joint: f64,
}

struct Builder<'a> {
    tree: &'a AdhocTree,
    cx: BuildContext<'a>,
    strip_whitespace: &'a [String],
    deferred: Vec<DeferredAlign>,
}

/// Builds the view tree for `tree` and resolves cross-references.
pub fn build_view(
    tree: &AdhocTree,
    text: &Text,
    registry: &PolicyRegistry,
    options: &BuildOptions,
) -> Result<ViewTree, RenderError> {
    let mut builder = Builder {
        tree,
        cx: BuildContext::new(text, registry, options.overlay),
        strip_whitespace: &options.strip_whitespace,
        deferred: Vec::new(),
    };
    builder.visit(None, AdhocTree::ROOT)?;
    builder.resolve_deferred()?;

    let views = builder.cx.into_views();
    debug!("view tree: {} components", views.len());
    Ok(views)
}

impl<'a> Builder<'a> {
    fn visit(&mut self, parent: Option<ComponentId>, id: NodeId) -> Result<(), RenderError> {
        let tree = self.tree;
        let node = tree.view(self.cx.text(), id);
        match node.kind() {
            NodeKind::Text => self.visit_text(parent, node),
            NodeKind::Root | NodeKind::Annotation(_) => self.visit_element(parent, node),
        }
    }

    /// Text is only rendered inside lines.
    fn visit_text(&mut self, parent: Option<ComponentId>, node: NodeRef<'a>) -> Result<(), RenderError> {
        let Some(parent) = parent else {
            return Ok(());
        };
        if !node.has_ancestor("line") {
            return Ok(());
        }
        let content = node.content();
        let container = node.parent().map_or("", |p| p.local_name());
        if content.trim().is_empty() && self.strip_whitespace.iter().any(|n| n == container) {
            trace!("stripped whitespace in {container} at {}", node.range());
            return Ok(());
        }
        self.cx.add_text(parent, &content, node.range())?;
        Ok(())
    }

    fn visit_element(&mut self, parent: Option<ComponentId>, node: NodeRef<'a>) -> Result<(), RenderError> {
        let local = node.local_name();
        let policy = self.cx.registry().policy(local);

        let mut vc = policy.build(node, &mut self.cx)?;
        if vc.is_none() && parent.is_none() {
            vc = Some(self.cx.views.create(ComponentKind::Surface));
        }
        self.defer_explicit_aligns(&mut vc, node);
        if let (Some(vc), Some(parent)) = (vc, parent) {
            self.apply_rend(vc, parent, node)?;
        }

        if let Some(vc) = vc {
            let xml_id = node.attr("xml:id");
            let c = self.cx.views.get_mut(vc);
            c.element_name = local.to_string();
            c.xml_id = xml_id.map(str::to_string);
            match parent {
                Some(parent) => self.cx.views.attach(parent, vc)?,
                None => self.cx.views.set_root(vc),
            }
            if let Some(xml_id) = xml_id {
                self.cx.id_map.insert(xml_id.to_string(), vc);
            }
            policy.on_attach(vc, node, &mut self.cx)?;
        } else {
            trace!("{local} at {} builds no component", node.range());
        }

        let container = vc.or(parent);
        let tree = self.tree;
        for child in &tree.node(node.id()).children {
            self.visit(container, *child)?;
        }

        if let Some(vc) = vc {
            if local == "line" {
                let filler = self.cx.views.create_with_classes(
                    ComponentKind::text(EMPTY_LINE_FILLER),
                    vec!["noBackground".to_string()],
                );
                self.cx.views.attach(vc, filler)?;
            }
            policy.on_detach(vc, node, &mut self.cx)?;
        }
        Ok(())
    }

    /// Records `f:at`, `f:left`, ... for resolution after the walk. An
    /// element without a component gets a plain inline one.
    fn defer_explicit_aligns(&mut self, vc: &mut Option<ComponentId>, node: NodeRef<'a>) {
        for (attribute, axis, my_joint, your_joint) in ALIGNING_ATTRIBUTES {
            let Some(value) = node.attr(attribute) else {
                continue;
            };
            let id = *vc.get_or_insert_with(|| self.cx.views.create(ComponentKind::Inline));
            let my_joint = match node.attr("f:orient") {
                Some("left") => 1.0,
                Some(_) => 0.0,
                None => my_joint,
            };
            self.deferred.push(DeferredAlign {
                vc: id,
                anchor: value.strip_prefix('#').unwrap_or(value).to_string(),
                axis,
                my_joint,
                your_joint,
            });
        }
    }

    /// `rend="left|right|centered"` aligns horizontally within the parent.
    fn apply_rend(&mut self, vc: ComponentId, parent: ComponentId, node: NodeRef<'a>) -> Result<(), EncodingError> {
        let joint = match node.attr("rend") {
            Some("right") => 1.0,
            Some("left") => 0.0,
            Some("centered") => 0.5,
            _ => return Ok(()),
        };
        let rotation = self.cx.views.global_rotation(parent);
        self.cx.views.set_align(
            vc,
            Axis::Horizontal,
            Align::relative(parent, rotation, joint, joint, Priority::RendAttr),
        )
    }

    fn resolve_deferred(&mut self) -> Result<(), EncodingError> {
        for d in std::mem::take(&mut self.deferred) {
            let anchor = *self
                .cx
                .id_map
                .get(&d.anchor)
                .ok_or_else(|| EncodingError::UnresolvedReference(d.anchor.clone()))?;
            let rotation = d.axis.base_rotation() + self.cx.views.global_rotation(anchor);
            trace!("{} aligned to #{} on {}", d.vc, d.anchor, d.axis);
            self.cx.views.set_align(
                d.vc,
                d.axis,
                Align::relative(anchor, rotation, d.my_joint, d.your_joint, Priority::Explicit),
            )?;
        }
        Ok(())
    }
}
