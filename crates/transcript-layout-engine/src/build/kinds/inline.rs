use super::{annotation_range, rend_tokens};
use crate::{
    adhoc::NodeRef,
    build::{
        context::{BuildContext, IMAGE_PATH},
        policy::ElementPolicy,
    },
    error::{EncodingError, RenderError},
    layout::{ComponentId, ComponentKind, Graphic},
    text::Annotation,
};

/// Pixels per em for graphic sizes given in ems.
const EM: f64 = 10.0;
const GAP_CHAR: char = '\u{d7}';
const GAP_UNCERTAIN_CHAR: char = '.';
/// Upper bound for `@quantity` and `@atLeast` of a gap.
pub const MAX_GAP_CHARS: usize = 1000;

/// An inline container with no rendering of its own.
pub struct Plain;

impl ElementPolicy for Plain {
    fn is_structural(&self) -> bool {
        true
    }

    fn build(&self, _node: NodeRef<'_>, cx: &mut BuildContext<'_>) -> Result<Option<ComponentId>, RenderError> {
        Ok(Some(cx.views.create(ComponentKind::Inline)))
    }
}

/// Segment; its `rend` positions the text between, under or over lines.
pub struct Seg;

impl ElementPolicy for Seg {
    fn is_structural(&self) -> bool {
        true
    }

    fn build(&self, node: NodeRef<'_>, cx: &mut BuildContext<'_>) -> Result<Option<ComponentId>, RenderError> {
        Plain.build(node, cx)
    }

    fn on_text(&self, annotation: &Annotation, text_vc: ComponentId, cx: &mut BuildContext<'_>) -> Result<(), RenderError> {
        let vc = cx.views.get_mut(text_vc);
        for token in rend_tokens(annotation.attr("rend")) {
            match token {
                "inbetween" | "between" => vc.add_class("inbetween"),
                "under" => vc.add_class("under"),
                "over" => vc.add_class("over"),
                _ => {}
            }
        }
        Ok(())
    }
}

/// Illegible characters, drawn as crosses.
pub struct Gap;

impl Gap {
    fn count(attribute: &'static str, value: &str) -> Result<usize, EncodingError> {
        value
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|&n| n <= MAX_GAP_CHARS)
            .ok_or_else(|| EncodingError::InvalidAttribute {
                element: "gap",
                attribute,
                value: value.to_string(),
            })
    }

    /// `×..×` spanning `n` characters.
    fn uncertain(n: usize) -> String {
        let mut s = String::new();
        s.push(GAP_CHAR);
        s.extend(std::iter::repeat_n(GAP_UNCERTAIN_CHAR, n.saturating_sub(2)));
        s.push(GAP_CHAR);
        s
    }

    pub fn representation(annotation: &Annotation) -> Result<String, EncodingError> {
        if annotation.attr("unit") != Some("chars") {
            return Err(EncodingError::InvalidUnit {
                context: "gap element",
                expected: "chars",
            });
        }
        match (annotation.attr("quantity"), annotation.attr("atLeast")) {
            (Some(q), _) if annotation.attr("precision") == Some("medium") => {
                Ok(Self::uncertain(Self::count("quantity", q)?))
            }
            (Some(q), _) => Ok(std::iter::repeat_n(GAP_CHAR, Self::count("quantity", q)?).collect()),
            (None, Some(at_least)) => Ok(Self::uncertain(Self::count("atLeast", at_least)?)),
            (None, None) => Err(EncodingError::GapExtent),
        }
    }
}

impl ElementPolicy for Gap {
    fn on_text(&self, annotation: &Annotation, text_vc: ComponentId, cx: &mut BuildContext<'_>) -> Result<(), RenderError> {
        let representation = Self::representation(annotation)?;
        cx.views.get_mut(text_vc).set_content(&representation);
        Ok(())
    }
}

/// Graphical lines. Only lines inside a written line are drawn, as inline
/// images.
pub struct GrLine;

impl GrLine {
    fn ems(node: NodeRef<'_>, attribute: &'static str) -> Result<Option<f64>, EncodingError> {
        node.attr(attribute)
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .map(|n| n * EM)
                    .map_err(|_| EncodingError::InvalidAttribute {
                        element: "grLine",
                        attribute,
                        value: v.to_string(),
                    })
            })
            .transpose()
    }

    fn graphic(image: &str, size: (f64, f64), display: (Option<f64>, Option<f64>)) -> ComponentKind {
        ComponentKind::InlineGraphic(Graphic {
            kind: "grLine".to_string(),
            image_url: format!("{IMAGE_PATH}{image}"),
            image_width: size.0,
            image_height: size.1,
            display_width: display.0,
            display_height: display.1,
        })
    }
}

impl ElementPolicy for GrLine {
    fn is_structural(&self) -> bool {
        true
    }

    fn build(&self, node: NodeRef<'_>, cx: &mut BuildContext<'_>) -> Result<Option<ComponentId>, RenderError> {
        let inline = node.has_ancestor("line");
        let style = node.attr("f:style");
        if style == Some("s-left-right") {
            return if inline {
                Err(EncodingError::InlineSCurve.into())
            } else {
                Ok(None)
            };
        }
        if !inline {
            return Ok(None);
        }

        let kind = match (style, node.attr("f:orient")) {
            (Some("curly"), Some("horiz")) => Self::graphic(
                "grLineCurlyHorizontal.svg#img",
                (100.0, 100.0),
                (Some(20.0 * EM), Some(2.0 * EM)),
            ),
            (Some("curly"), Some("vert")) => Self::graphic(
                "grLineCurlyVertical.svg#img",
                (100.0, 100.0),
                (Self::ems(node, "width")?, Self::ems(node, "height")?),
            ),
            (Some("linear"), Some("horiz")) => Self::graphic(
                "grLineStraightHorizontal.svg#img",
                (100.0, 20.0),
                (Some(10.0 * EM), Some(2.0 * EM)),
            ),
            (Some("linear"), Some("vert")) => Self::graphic(
                "grLineStraightVertical.svg#img",
                (20.0, 100.0),
                (Some(EM), Some(2.0 * EM)),
            ),
            _ => return Ok(None),
        };
        Ok(Some(cx.views.create(kind)))
    }
}

/// Horizontal space in characters or vertical space in lines.
pub struct Space;

impl Space {
    fn quantity(node: NodeRef<'_>) -> Result<f64, EncodingError> {
        let value = node.attr("quantity").ok_or(EncodingError::MissingAttribute {
            element: "space",
            attribute: "quantity",
        })?;
        value.trim().parse().map_err(|_| EncodingError::InvalidAttribute {
            element: "space",
            attribute: "quantity",
            value: value.to_string(),
        })
    }
}

impl ElementPolicy for Space {
    fn is_structural(&self) -> bool {
        true
    }

    fn build(&self, node: NodeRef<'_>, cx: &mut BuildContext<'_>) -> Result<Option<ComponentId>, RenderError> {
        let unit = node.attr("unit");
        let kind = if node.attr("dim") == Some("horizontal") {
            if unit != Some("chars") {
                return Err(EncodingError::InvalidUnit {
                    context: "space dim='horizontal'",
                    expected: "chars",
                }
                .into());
            }
            ComponentKind::HSpace {
                chars: Self::quantity(node)?,
            }
        } else {
            if unit != Some("lines") {
                return Err(EncodingError::InvalidUnit {
                    context: "space dim='vertical'",
                    expected: "lines",
                }
                .into());
            }
            ComponentKind::VSpace {
                lines: Self::quantity(node)?,
            }
        };
        Ok(Some(cx.views.create(kind)))
    }
}

/// Insertion, marked with a bracket on the side of `f:orient`. The bracket
/// points down when the insertion anchor is already laid out.
pub struct Ins;

impl Ins {
    fn mark(
        vc: ComponentId,
        node: NodeRef<'_>,
        cx: &mut BuildContext<'_>,
        anchored: &str,
        dangling: &str,
    ) -> Result<(), RenderError> {
        let at = node.attr("f:at").ok_or(EncodingError::MissingAttribute {
            element: "ins",
            attribute: "f:at",
        })?;
        let anchor = at.strip_prefix('#').unwrap_or(at);
        let sign = if cx.id_map.contains_key(anchor) {
            anchored
        } else {
            dangling
        };
        cx.add_text(vc, sign, annotation_range(node))?;
        Ok(())
    }
}

impl ElementPolicy for Ins {
    fn is_structural(&self) -> bool {
        true
    }

    fn build(&self, node: NodeRef<'_>, cx: &mut BuildContext<'_>) -> Result<Option<ComponentId>, RenderError> {
        Plain.build(node, cx)
    }

    fn on_attach(&self, vc: ComponentId, node: NodeRef<'_>, cx: &mut BuildContext<'_>) -> Result<(), RenderError> {
        if node.attr("f:orient") == Some("right") {
            Self::mark(vc, node, cx, "\u{230a}", "\u{2308}")?;
        }
        Ok(())
    }

    fn on_detach(&self, vc: ComponentId, node: NodeRef<'_>, cx: &mut BuildContext<'_>) -> Result<(), RenderError> {
        if node.attr("f:orient") == Some("left") {
            Self::mark(vc, node, cx, "\u{230b}", "\u{2309}")?;
        }
        Ok(())
    }
}

/// Editorial supplement, in square brackets.
pub struct Supplied;

impl ElementPolicy for Supplied {
    fn is_structural(&self) -> bool {
        true
    }

    fn build(&self, node: NodeRef<'_>, cx: &mut BuildContext<'_>) -> Result<Option<ComponentId>, RenderError> {
        Plain.build(node, cx)
    }

    fn on_attach(&self, vc: ComponentId, node: NodeRef<'_>, cx: &mut BuildContext<'_>) -> Result<(), RenderError> {
        cx.add_text(vc, "[", annotation_range(node))?;
        Ok(())
    }

    fn on_detach(&self, vc: ComponentId, node: NodeRef<'_>, cx: &mut BuildContext<'_>) -> Result<(), RenderError> {
        cx.add_text(vc, "]", annotation_range(node))?;
        Ok(())
    }
}

/// Uncertain reading in braces, doubled for low certainty. A low-certainty
/// alternative in a choice with a high-certainty sibling is hidden.
pub struct Unclear;

impl Unclear {
    fn is_low(node: NodeRef<'_>) -> bool {
        node.attr("cert") == Some("low")
    }
}

impl ElementPolicy for Unclear {
    fn is_structural(&self) -> bool {
        true
    }

    fn build(&self, node: NodeRef<'_>, cx: &mut BuildContext<'_>) -> Result<Option<ComponentId>, RenderError> {
        Plain.build(node, cx)
    }

    fn on_attach(&self, vc: ComponentId, node: NodeRef<'_>, cx: &mut BuildContext<'_>) -> Result<(), RenderError> {
        let marker = if Self::is_low(node) { "{{" } else { "{" };
        cx.add_text(vc, marker, annotation_range(node))?;
        Ok(())
    }

    fn on_detach(&self, vc: ComponentId, node: NodeRef<'_>, cx: &mut BuildContext<'_>) -> Result<(), RenderError> {
        let marker = if Self::is_low(node) { "}}" } else { "}" };
        cx.add_text(vc, marker, annotation_range(node))?;

        if let Some(parent) = node.parent() {
            if parent.local_name() == "choice"
                && Self::is_low(node)
                && parent.children().any(|c| c.attr("cert") == Some("high"))
            {
                cx.views.get_mut(vc).hidden = true;
            }
        }
        Ok(())
    }
}
