//! Serialisable form of a laid-out view tree.

use serde::Serialize;

use crate::layout::{ComponentId, ComponentKind, DecorationStyle, TextDecoration, ViewTree};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedComponent {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_id: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub decorations: Vec<RenderedDecoration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<RenderedImage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderedComponent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub floats: Vec<RenderedComponent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "style", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum RenderedDecoration {
    Line {
        name: String,
        y_offset: f64,
        classes: Vec<String>,
    },
    Clone {
        name: String,
        x_offset: f64,
        y_offset: f64,
        classes: Vec<String>,
    },
    Null {
        name: String,
        classes: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedImage {
    pub kind: String,
    pub url: String,
}

impl From<&TextDecoration> for RenderedDecoration {
    fn from(d: &TextDecoration) -> Self {
        let name = d.name.clone();
        let classes = d.classes.clone();
        match d.style {
            DecorationStyle::Line { y_offset } => Self::Line {
                name,
                y_offset,
                classes,
            },
            DecorationStyle::Clone { x_offset, y_offset } => Self::Clone {
                name,
                x_offset,
                y_offset,
                classes,
            },
            DecorationStyle::Null => Self::Null { name, classes },
        }
    }
}

impl RenderedComponent {
    /// Converts `id` and everything below it, floats included.
    pub fn from_view(views: &ViewTree, id: ComponentId) -> Self {
        let c = views.get(id);
        let (text, decorations) = match &c.kind {
            ComponentKind::Text {
                content,
                decorations,
            } => (
                Some(content.clone()),
                decorations.iter().map(RenderedDecoration::from).collect(),
            ),
            _ => (None, Vec::new()),
        };
        let image = match &c.kind {
            ComponentKind::InlineGraphic(g) => Some(RenderedImage {
                kind: g.kind.clone(),
                url: g.image_url.clone(),
            }),
            ComponentKind::CoveringImage(cover) => Some(RenderedImage {
                kind: cover.kind.clone(),
                url: cover.image_url.clone(),
            }),
            _ => None,
        };

        Self {
            kind: c.kind.name(),
            element: (!c.element_name.is_empty()).then(|| c.element_name.clone()),
            xml_id: c.xml_id.clone(),
            x: c.x,
            y: c.y,
            width: c.width,
            height: c.height,
            rotation: c.rotation,
            classes: views.compute_classes(id),
            text,
            decorations,
            image,
            children: c.children.iter().map(|ch| Self::from_view(views, *ch)).collect(),
            floats: c.floats.iter().map(|f| Self::from_view(views, *f)).collect(),
        }
    }

    /// The whole tree, or `None` when nothing was built.
    pub fn from_tree(views: &ViewTree) -> Option<Self> {
        views.root().map(|root| Self::from_view(views, root))
    }
}
