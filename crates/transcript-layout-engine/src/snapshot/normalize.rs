use serde::Serialize;

use crate::layout::{ComponentId, ComponentKind, DecorationStyle, ViewTree};

#[derive(Serialize)]
pub struct Snap {
    pub root: Option<ComponentSnap>,
}

#[derive(Serialize)]
pub struct ComponentSnap {
    pub kind: String,
    pub geometry: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub decorations: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ComponentSnap>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub floats: Vec<ComponentSnap>,
}

pub fn normalize(views: &ViewTree) -> Snap {
    Snap {
        root: views.root().map(|root| component(views, root)),
    }
}

fn component(views: &ViewTree, id: ComponentId) -> ComponentSnap {
    let c = views.get(id);
    let (text, decorations) = match &c.kind {
        ComponentKind::Text {
            content,
            decorations,
        } => (
            // no-break spaces are invisible in snapshots
            Some(content.replace('\u{a0}', "_")),
            decorations
                .iter()
                .map(|d| match d.style {
                    DecorationStyle::Line { y_offset } => format!("{} line({y_offset:.2})", d.name),
                    DecorationStyle::Clone { x_offset, y_offset } => {
                        format!("{} clone({x_offset:.3}, {y_offset:.3})", d.name)
                    }
                    DecorationStyle::Null => format!("{} null", d.name),
                })
                .collect(),
        ),
        _ => (None, Vec::new()),
    };

    ComponentSnap {
        kind: c.kind.name().to_string(),
        geometry: format!(
            "x={:.1} y={:.1} w={:.1} h={:.1}",
            c.x, c.y, c.width, c.height
        ),
        rotation: (c.rotation != 0.0).then(|| format!("{}deg", c.rotation)),
        classes: views.compute_classes(id),
        text,
        decorations,
        children: c.children.iter().map(|ch| component(views, *ch)).collect(),
        floats: c.floats.iter().map(|f| component(views, *f)).collect(),
    }
}
