use super::{hand_classes, rend_tokens};
use crate::{
    adhoc::NodeRef,
    build::{context::BuildContext, policy::ElementPolicy},
    error::RenderError,
    layout::{ComponentId, ComponentKind, DecorationShape, DecorationStyle, TextDecoration},
    text::Annotation,
};

/// Vertical distance between stacked strikethroughs, in line heights.
const STRIKETHROUGH_STEP: f64 = 0.15;
const STRIKETHROUGH_OFFSET: f64 = -0.2;

/// Writer, material and script classes from `@value`.
pub struct Hand;

impl ElementPolicy for Hand {
    fn on_text(&self, annotation: &Annotation, text_vc: ComponentId, cx: &mut BuildContext<'_>) -> Result<(), RenderError> {
        if let Some(value) = annotation.attr("value") {
            cx.views.get_mut(text_vc).classes.extend(hand_classes(value));
        }
        Ok(())
    }
}

/// Highlighting. Frames and circles become inline decorations around the
/// text; lines and raised or lowered text decorate the text runs.
pub struct Hi;

impl ElementPolicy for Hi {
    fn is_structural(&self) -> bool {
        true
    }

    fn build(&self, node: NodeRef<'_>, cx: &mut BuildContext<'_>) -> Result<Option<ComponentId>, RenderError> {
        let tokens = rend_tokens(node.attr("rend"));
        let shape = if tokens.contains(&"frame") {
            DecorationShape::Rect
        } else if tokens.contains(&"circle") {
            DecorationShape::Circle
        } else {
            return Ok(None);
        };
        let classes = node.attr("hand").map(hand_classes).unwrap_or_default();
        Ok(Some(cx.views.create_with_classes(
            ComponentKind::InlineDecoration(shape),
            classes,
        )))
    }

    fn on_text(&self, annotation: &Annotation, text_vc: ComponentId, cx: &mut BuildContext<'_>) -> Result<(), RenderError> {
        let hand = annotation.attr("hand").map(hand_classes).unwrap_or_default();
        let vc = cx.views.get_mut(text_vc);
        for token in rend_tokens(annotation.attr("rend")) {
            let line = |y_offset| TextDecoration::new(token, DecorationStyle::Line { y_offset }, &hand);
            match token {
                "underline" => vc.decorate(line(0.1)),
                "underdots" => vc.decorate(line(0.2)),
                "overline" => vc.decorate(line(-0.7)),
                "sup" | "sub" => vc.add_class(token),
                _ => {}
            }
        }
        Ok(())
    }
}

/// Adds a fixed class to every text run.
pub struct ClassMarker(pub &'static str);

impl ElementPolicy for ClassMarker {
    fn on_text(&self, _annotation: &Annotation, text_vc: ComponentId, cx: &mut BuildContext<'_>) -> Result<(), RenderError> {
        cx.views.get_mut(text_vc).add_class(self.0);
        Ok(())
    }
}

/// Retraced text, drawn twice with a slight offset.
pub struct Retrace;

impl ElementPolicy for Retrace {
    fn on_text(&self, _annotation: &Annotation, text_vc: ComponentId, cx: &mut BuildContext<'_>) -> Result<(), RenderError> {
        cx.views.get_mut(text_vc).decorate(TextDecoration::new(
            "rewrite",
            DecorationStyle::Clone {
                x_offset: 0.005,
                y_offset: -0.005,
            },
            &[],
        ));
        Ok(())
    }
}

/// Modifications: strikethroughs and erasures.
///
/// Vertical and block strikethroughs are one covering image per annotation
/// laid over all of its text runs. Horizontal strikethroughs are lines on
/// each run, stacked when several apply to the same run.
pub struct Mod;

impl ElementPolicy for Mod {
    fn on_text(&self, annotation: &Annotation, text_vc: ComponentId, cx: &mut BuildContext<'_>) -> Result<(), RenderError> {
        let tokens = rend_tokens(annotation.attr("rend"));
        let erase = tokens.contains(&"erase");
        if !erase && !tokens.contains(&"strikethrough") {
            return Ok(());
        }

        let classes = match annotation.attr("hand") {
            Some(hand) => hand_classes(hand),
            None => cx
                .views
                .get(text_vc)
                .classes
                .iter()
                .filter(|c| c.starts_with("hand-") || c.starts_with("material-"))
                .cloned()
                .collect(),
        };

        let vertical = tokens.contains(&"vertical");
        if vertical || tokens.contains(&"block") {
            let image = if vertical {
                "grLineStraightVertical.svg#img"
            } else {
                "grLineDiagonalFalling.svg#img"
            };
            let (float, created) = cx.covering_image("mod", annotation, image, classes.clone())?;
            let vc = cx.views.get_mut(text_vc);
            if created {
                vc.decorate(TextDecoration::new(
                    "strikethrough",
                    DecorationStyle::Null,
                    &classes,
                ));
            }
            vc.add_class("st-vertical");
            cx.cover(float, text_vc);
            return Ok(());
        }

        let stacked = cx.text_state.strikethroughs as f64 * STRIKETHROUGH_STEP;
        let vc = cx.views.get_mut(text_vc);
        if erase {
            vc.add_class("erase");
            vc.decorate(TextDecoration::new(
                "erase",
                DecorationStyle::Clone {
                    x_offset: 0.0,
                    y_offset: 0.0,
                },
                &[],
            ));
        } else {
            vc.decorate(TextDecoration::new(
                "strikethrough",
                DecorationStyle::Line {
                    y_offset: STRIKETHROUGH_OFFSET - stacked,
                },
                &classes,
            ));
        }
        cx.text_state.strikethroughs += 1;
        Ok(())
    }
}

/// Metamarks. A `used` mark is one covering image over all text runs.
pub struct Metamark;

impl ElementPolicy for Metamark {
    fn on_text(&self, annotation: &Annotation, text_vc: ComponentId, cx: &mut BuildContext<'_>) -> Result<(), RenderError> {
        if annotation.attr("function") != Some("used") {
            return Ok(());
        }
        let (float, _) = cx.covering_image("metamark", annotation, "usedMarker.svg#svgroot", Vec::new())?;
        cx.cover(float, text_vc);
        cx.views.get_mut(text_vc).add_class("used");
        Ok(())
    }
}
