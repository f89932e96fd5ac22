use std::sync::OnceLock;

use regex::Regex;

use crate::{
    adhoc::NodeRef,
    build::{context::BuildContext, policy::ElementPolicy},
    error::{EncodingError, RenderError},
    layout::{Align, Axis, ComponentId, ComponentKind, LineAttrs, Priority},
    text::Annotation,
};

/// Empty anchor element: a line when it stands directly in a zone, an empty
/// text run otherwise.
pub struct Anchor;

impl ElementPolicy for Anchor {
    fn is_structural(&self) -> bool {
        true
    }

    fn build(&self, node: NodeRef<'_>, cx: &mut BuildContext<'_>) -> Result<Option<ComponentId>, RenderError> {
        let in_zone = node.parent().is_some_and(|p| p.local_name() == "zone");
        let kind = if in_zone {
            ComponentKind::Line(LineAttrs::default())
        } else {
            ComponentKind::text("")
        };
        Ok(Some(cx.views.create(kind)))
    }
}

/// Writing surface; `type="patch"` makes it a patch glued onto the surface.
pub struct Surface;

impl ElementPolicy for Surface {
    fn is_structural(&self) -> bool {
        true
    }

    fn build(&self, node: NodeRef<'_>, cx: &mut BuildContext<'_>) -> Result<Option<ComponentId>, RenderError> {
        let kind = if node.attr("type") == Some("patch") {
            ComponentKind::Patch
        } else {
            ComponentKind::Surface
        };
        Ok(Some(cx.views.create(kind)))
    }
}

/// Braces take part in the tree but are not drawn.
pub struct GrBrace;

impl ElementPolicy for GrBrace {
    fn is_structural(&self) -> bool {
        true
    }
}

pub struct Line;

impl Line {
    fn indent(rend: &str, pattern: &Regex) -> Result<f64, EncodingError> {
        pattern
            .captures(rend)
            .and_then(|c| c[1].parse::<u32>().ok())
            .map(|percent| f64::from(percent) / 100.0)
            .ok_or_else(|| EncodingError::InvalidAttribute {
                element: "line",
                attribute: "rend",
                value: rend.to_string(),
            })
    }

    fn attrs(node: NodeRef<'_>) -> Result<LineAttrs, EncodingError> {
        static INDENT_CENTER: OnceLock<Regex> = OnceLock::new();
        static INDENT: OnceLock<Regex> = OnceLock::new();

        let mut attrs = LineAttrs::default();
        let rend = node.attr("rend").unwrap_or("");
        // centered lines are handled by the generic rend alignment
        if !rend.contains("centered") {
            if rend.contains("indent-center") {
                let pattern = INDENT_CENTER
                    .get_or_init(|| Regex::new(r"indent-center-(\d+)").expect("Invalid indent regex"));
                attrs.indent_center = Some(Self::indent(rend, pattern)?);
            } else if rend.contains("indent") {
                let pattern =
                    INDENT.get_or_init(|| Regex::new(r"indent-(\d+)").expect("Invalid indent regex"));
                attrs.indent = Some(Self::indent(rend, pattern)?);
            }
        }

        let pos = node.attr("f:pos").unwrap_or("");
        attrs.over = pos.contains("over");
        attrs.between = pos.contains("between");
        attrs.interline = node.attr("type").is_some_and(|t| t.contains("inter"));
        Ok(attrs)
    }
}

impl ElementPolicy for Line {
    fn is_structural(&self) -> bool {
        true
    }

    fn build(&self, node: NodeRef<'_>, cx: &mut BuildContext<'_>) -> Result<Option<ComponentId>, RenderError> {
        let number = cx.next_line_number();
        let attrs = Self::attrs(node)?;
        let classes = vec![
            format!("lineNumber{number}"),
            format!("xmlId-{}", node.attr("xml:id").unwrap_or("")),
        ];
        Ok(Some(cx.views.create_with_classes(ComponentKind::Line(attrs), classes)))
    }

    fn on_text(&self, annotation: &Annotation, text_vc: ComponentId, cx: &mut BuildContext<'_>) -> Result<(), RenderError> {
        let interline = annotation.attr("type").is_some_and(|t| t.contains("inter"));
        cx.views
            .get_mut(text_vc)
            .add_class(if interline { "interline" } else { "normal" });
        Ok(())
    }
}

/// Topographical zone. `type="main"` pins the zone to the origin; `rotate`
/// turns its coordinate system.
pub struct Zone;

impl ElementPolicy for Zone {
    fn is_structural(&self) -> bool {
        true
    }

    fn build(&self, node: NodeRef<'_>, cx: &mut BuildContext<'_>) -> Result<Option<ComponentId>, RenderError> {
        let vc = cx.views.create(ComponentKind::Zone);
        if let Some(rotate) = node.attr("rotate") {
            let degrees = rotate
                .trim()
                .parse::<f64>()
                .map_err(|_| EncodingError::InvalidAttribute {
                    element: "zone",
                    attribute: "rotate",
                    value: rotate.to_string(),
                })?;
            cx.views.get_mut(vc).rotation = degrees;
        }
        if node.attr("type") == Some("main") {
            cx.set_main_zone(vc)?;
            for axis in [Axis::Horizontal, Axis::Vertical] {
                let align = Align::absolute(axis.base_rotation(), 0.0, Priority::MainZone);
                cx.views.set_align(vc, axis, align)?;
            }
        }
        cx.set_current_zone(vc);
        Ok(Some(vc))
    }
}
