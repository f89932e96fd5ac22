use std::sync::OnceLock;

use regex::Regex;

use super::{
    Overlay,
    align::{Align, AlignKind, Axis, Priority, cos_sin},
};
use crate::error::EncodingError;

pub type ComponentId = usize;

/// Vertical distance of an interline, in line heights.
const INTERLINE_DISTANCE: f64 = 0.58;
const REGULAR_LINE_DISTANCE: f64 = 1.0;

/// Layout-relevant attributes of a written line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineAttrs {
    pub interline: bool,
    pub over: bool,
    pub between: bool,
    /// Left indent as a fraction of the parent's width.
    pub indent: Option<f64>,
    /// Center position as a fraction of the parent's width.
    pub indent_center: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationShape {
    Rect,
    Circle,
}

impl DecorationShape {
    fn class(self) -> &'static str {
        match self {
            DecorationShape::Rect => "inline-decoration-type-rect",
            DecorationShape::Circle => "inline-decoration-type-circle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecorationStyle {
    /// A rule at `y_offset` line heights from the baseline.
    Line { y_offset: f64 },
    /// A shifted copy of the text.
    Clone { x_offset: f64, y_offset: f64 },
    /// Marker only; drawn elsewhere.
    Null,
}

/// Decoration drawn over or around a text run.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDecoration {
    pub name: String,
    pub style: DecorationStyle,
    pub classes: Vec<String>,
}

impl TextDecoration {
    pub fn new(name: &str, style: DecorationStyle, classes: &[String]) -> Self {
        let mut all = classes.to_vec();
        all.push(format!("text-decoration-type-{name}"));
        all.push("text-decoration".to_string());
        Self {
            name: name.to_string(),
            style,
            classes: all,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Graphic {
    pub kind: String,
    pub image_url: String,
    pub image_width: f64,
    pub image_height: f64,
    pub display_width: Option<f64>,
    pub display_height: Option<f64>,
}

/// An image laid over the union of the components it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct Covering {
    pub kind: String,
    pub image_url: String,
    pub fixed_width: f64,
    pub fixed_height: f64,
    pub covered: Vec<ComponentId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    Surface,
    Patch,
    Zone,
    VSpace { lines: f64 },
    Line(LineAttrs),
    Inline,
    InlineDecoration(DecorationShape),
    Text {
        content: String,
        decorations: Vec<TextDecoration>,
    },
    HSpace { chars: f64 },
    InlineGraphic(Graphic),
    CoveringImage(Covering),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Block,
    Inline,
    Line,
    Floating,
}

impl ComponentKind {
    /// A text run; whitespace runs collapse to one no-break space.
    pub fn text(content: &str) -> Self {
        ComponentKind::Text {
            content: collapse_whitespace(content),
            decorations: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Surface => "Surface",
            ComponentKind::Patch => "Patch",
            ComponentKind::Zone => "Zone",
            ComponentKind::VSpace { .. } => "VSpace",
            ComponentKind::Line(_) => "Line",
            ComponentKind::Inline => "Inline",
            ComponentKind::InlineDecoration(DecorationShape::Rect) => "RectInlineDecoration",
            ComponentKind::InlineDecoration(DecorationShape::Circle) => "CircleInlineDecoration",
            ComponentKind::Text { .. } => "Text",
            ComponentKind::HSpace { .. } => "HSpace",
            ComponentKind::InlineGraphic(_) => "InlineGraphic",
            ComponentKind::CoveringImage(_) => "CoveringImage",
        }
    }

    fn flow(&self) -> Flow {
        match self {
            ComponentKind::Surface
            | ComponentKind::Patch
            | ComponentKind::Zone
            | ComponentKind::VSpace { .. } => Flow::Block,
            ComponentKind::Line(_) => Flow::Line,
            ComponentKind::Inline
            | ComponentKind::InlineDecoration(_)
            | ComponentKind::Text { .. }
            | ComponentKind::HSpace { .. }
            | ComponentKind::InlineGraphic(_) => Flow::Inline,
            ComponentKind::CoveringImage(_) => Flow::Floating,
        }
    }

    /// Classes every component of this kind carries.
    fn implied_classes(&self) -> &'static [&'static str] {
        match self {
            ComponentKind::InlineDecoration(_) => &["inline-decoration"],
            ComponentKind::InlineGraphic(_) | ComponentKind::CoveringImage(_) => &["use-image"],
            _ => &[],
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE
        .get_or_init(|| Regex::new(r"\s+").expect("Invalid whitespace regex"))
        .replace_all(s, "\u{a0}")
        .into_owned()
}

/// One node of the view tree.
#[derive(Debug, Clone)]
pub struct Component {
    pub kind: ComponentKind,
    pub parent: Option<ComponentId>,
    /// Index among the parent's children (or floats).
    pub pos: usize,
    pub children: Vec<ComponentId>,
    /// Overlay components laid out after the children. Zones only.
    pub floats: Vec<ComponentId>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Local rotation in degrees.
    pub rotation: f64,
    pub h_align: Option<Align>,
    pub v_align: Option<Align>,
    pub classes: Vec<String>,
    pub element_name: String,
    pub xml_id: Option<String>,
    /// Improbable alternative; reported with the `invisible` class only.
    pub hidden: bool,
    pub floating: bool,
    /// Moved less than epsilon in the last pass.
    pub settled: bool,
}

impl Component {
    fn new(kind: ComponentKind, mut classes: Vec<String>) -> Self {
        classes.extend(kind.implied_classes().iter().map(|c| c.to_string()));
        if let ComponentKind::InlineDecoration(shape) = &kind {
            classes.push(shape.class().to_string());
        }
        Self {
            kind,
            parent: None,
            pos: 0,
            children: Vec::new(),
            floats: Vec::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            h_align: None,
            v_align: None,
            classes,
            element_name: String::new(),
            xml_id: None,
            hidden: false,
            floating: false,
            settled: false,
        }
    }

    pub fn align(&self, axis: Axis) -> Option<&Align> {
        match axis {
            Axis::Horizontal => self.h_align.as_ref(),
            Axis::Vertical => self.v_align.as_ref(),
        }
    }

    pub fn line_attrs(&self) -> Option<&LineAttrs> {
        match &self.kind {
            ComponentKind::Line(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Text content for text runs.
    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            ComponentKind::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Replaces the content of a text run. No-op for other kinds.
    pub fn set_content(&mut self, text: &str) {
        if let ComponentKind::Text { content, .. } = &mut self.kind {
            *content = text.to_string();
        }
    }

    /// Adds a decoration to a text run. No-op for other kinds.
    pub fn decorate(&mut self, decoration: TextDecoration) {
        if let ComponentKind::Text { decorations, .. } = &mut self.kind {
            decorations.push(decoration);
        }
    }

    pub fn add_class(&mut self, class: impl Into<String>) {
        self.classes.push(class.into());
    }

    fn is_interline(&self) -> bool {
        self.line_attrs().is_some_and(|a| a.interline)
    }
}

/// Arena of view components. Components are created detached and linked
/// with [`attach`](ViewTree::attach), which also installs default aligns.
#[derive(Debug, Clone, Default)]
pub struct ViewTree {
    components: Vec<Component>,
    root: Option<ComponentId>,
    overlay: Overlay,
}

impl ViewTree {
    pub fn new(overlay: Overlay) -> Self {
        Self {
            components: Vec::new(),
            root: None,
            overlay,
        }
    }

    pub fn overlay(&self) -> Overlay {
        self.overlay
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn root(&self) -> Option<ComponentId> {
        self.root
    }

    pub fn set_root(&mut self, id: ComponentId) {
        self.root = Some(id);
    }

    pub fn get(&self, id: ComponentId) -> &Component {
        &self.components[id]
    }

    pub fn get_mut(&mut self, id: ComponentId) -> &mut Component {
        &mut self.components[id]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &Component)> {
        self.components.iter().enumerate()
    }

    pub fn create(&mut self, kind: ComponentKind) -> ComponentId {
        self.create_with_classes(kind, Vec::new())
    }

    /// Creates a detached component. `classes` come before the classes the
    /// kind implies.
    pub fn create_with_classes(&mut self, kind: ComponentKind, classes: Vec<String>) -> ComponentId {
        self.components.push(Component::new(kind, classes));
        self.components.len() - 1
    }

    /// Appends `child` to `parent` and installs its default aligns.
    pub fn attach(&mut self, parent: ComponentId, child: ComponentId) -> Result<(), EncodingError> {
        let pos = self.components[parent].children.len();
        self.components[parent].children.push(child);
        let c = &mut self.components[child];
        c.parent = Some(parent);
        c.pos = pos;
        self.default_aligns(child)
    }

    /// Adds an overlay component to a zone.
    pub fn attach_float(&mut self, zone: ComponentId, float: ComponentId) {
        let pos = self.components[zone].floats.len();
        self.components[zone].floats.push(float);
        let c = &mut self.components[float];
        c.parent = Some(zone);
        c.pos = pos;
        c.floating = true;
    }

    pub fn previous(&self, id: ComponentId) -> Option<ComponentId> {
        let c = &self.components[id];
        if c.floating || c.pos == 0 {
            return None;
        }
        c.parent.map(|p| self.components[p].children[c.pos - 1])
    }

    /// Sum of rotations from the root down. Floats only use their own.
    pub fn global_rotation(&self, id: ComponentId) -> f64 {
        let c = &self.components[id];
        if c.floating {
            return c.rotation;
        }
        let mut total = c.rotation;
        let mut cursor = c.parent;
        while let Some(p) = cursor {
            total += self.components[p].rotation;
            cursor = self.components[p].parent;
        }
        total
    }

    /// Installs `align` unless a higher-priority one is present. Equal
    /// priorities on one axis conflict. A `Null` align only fills an empty
    /// axis and gives way to any other align.
    pub fn set_align(&mut self, id: ComponentId, axis: Axis, align: Align) -> Result<(), EncodingError> {
        let c = &mut self.components[id];
        let current = c.align(axis).filter(|a| !a.is_null()).map(|a| a.priority);
        match current {
            Some(_) if align.is_null() => Ok(()),
            Some(p) if p == align.priority => Err(EncodingError::ConflictingAlign {
                element: c.element_name.clone(),
                xml_id: c.xml_id.clone().unwrap_or_default(),
                axis,
                priority: align.priority,
            }),
            Some(p) if p > align.priority => Ok(()),
            _ => {
                match axis {
                    Axis::Horizontal => c.h_align = Some(align),
                    Axis::Vertical => c.v_align = Some(align),
                }
                Ok(())
            }
        }
    }

    /// Classes handed to the renderer.
    pub fn compute_classes(&self, id: ComponentId) -> Vec<String> {
        let c = &self.components[id];
        if c.hidden {
            return vec!["invisible".to_string()];
        }
        let mut classes = Vec::with_capacity(c.classes.len() + 1);
        if !c.element_name.is_empty() {
            classes.push(format!("element-{}", c.element_name));
        }
        classes.extend(c.classes.iter().cloned());
        classes
    }

    fn default_aligns(&mut self, id: ComponentId) -> Result<(), EncodingError> {
        let Some(parent) = self.components[id].parent else {
            return Ok(());
        };
        let previous = self.previous(id);
        let rot_x = self.global_rotation(id);
        let rot_y = rot_x + 90.0;
        let implicit = Priority::ImplicitByDocOrder;
        let after_previous = match previous {
            Some(p) => Align::relative(p, rot_x, 0.0, 1.0, implicit),
            None => Align::relative(parent, rot_x, 0.0, 0.0, implicit),
        };

        match self.components[id].kind.flow() {
            Flow::Block => {
                self.set_align(
                    id,
                    Axis::Horizontal,
                    Align::relative(parent, rot_x, 0.0, 0.0, implicit),
                )?;
                let below = match previous {
                    Some(p) => Align::relative(p, rot_y, 0.0, 1.0, implicit),
                    None => Align::relative(parent, rot_y, 0.0, 0.0, implicit),
                };
                self.set_align(id, Axis::Vertical, below)
            }
            Flow::Inline => {
                self.set_align(id, Axis::Vertical, Align::null())?;
                self.set_align(id, Axis::Horizontal, after_previous)
            }
            Flow::Line => self.line_aligns(id, parent, previous, rot_x, rot_y),
            Flow::Floating => Ok(()),
        }
    }

    fn line_aligns(
        &mut self,
        id: ComponentId,
        parent: ComponentId,
        previous: Option<ComponentId>,
        rot_x: f64,
        rot_y: f64,
    ) -> Result<(), EncodingError> {
        let attrs = self.components[id]
            .line_attrs()
            .cloned()
            .unwrap_or_default();

        let h = if let Some(indent) = attrs.indent {
            Align::relative(parent, rot_x, 0.0, indent, Priority::IndentAttr)
        } else if let Some(center) = attrs.indent_center {
            Align::relative(parent, rot_x, 0.5, center, Priority::IndentCenterAttr)
        } else {
            Align::relative(parent, rot_x, 0.0, 0.0, Priority::ImplicitByDocOrder)
        };
        self.set_align(id, Axis::Horizontal, h)?;

        let v = match previous {
            Some(_) => {
                let interlines = self.preceding_interlines(id) as f64;
                let mut joint = if attrs.interline {
                    (interlines + 1.0) * INTERLINE_DISTANCE
                } else {
                    (interlines - 1.0).max(0.0) * INTERLINE_DISTANCE + REGULAR_LINE_DISTANCE
                };
                match self.overlay {
                    Overlay::Overlay => {
                        if attrs.over {
                            joint = 0.1;
                        }
                    }
                    Overlay::None => {
                        if attrs.between {
                            joint = 0.7;
                        }
                        if attrs.over {
                            joint = 0.5;
                        }
                    }
                }
                let target = self.previous_regular_line(id).unwrap_or(parent);
                Align::relative(target, rot_y, 0.0, joint, Priority::ImplicitByDocOrder)
            }
            None => Align::relative(parent, rot_y, 0.0, 0.0, Priority::ImplicitByDocOrder),
        };
        self.set_align(id, Axis::Vertical, v)
    }

    /// Number of interlines directly preceding `id`.
    fn preceding_interlines(&self, id: ComponentId) -> usize {
        let mut count = 0;
        let mut cursor = self.previous(id);
        while let Some(p) = cursor {
            if !self.components[p].is_interline() {
                break;
            }
            count += 1;
            cursor = self.previous(p);
        }
        count
    }

    /// Nearest preceding sibling that is not an interline; the first child
    /// counts regardless.
    fn previous_regular_line(&self, id: ComponentId) -> Option<ComponentId> {
        let c = &self.components[id];
        let parent = c.parent?;
        if c.pos == 1 {
            return Some(self.components[parent].children[0]);
        }
        let previous = self.previous(id)?;
        if self.components[previous].is_interline() {
            self.previous_regular_line(previous)
        } else {
            Some(previous)
        }
    }

    /// Position along the axis rotated by `rotation` degrees.
    pub fn coord(&self, id: ComponentId, rotation: f64) -> f64 {
        let c = &self.components[id];
        let (cos, sin) = cos_sin(rotation);
        c.x * cos + c.y * sin
    }

    /// Extent along the axis rotated by `rotation` degrees.
    pub fn ext(&self, id: ComponentId, rotation: f64) -> f64 {
        let c = &self.components[id];
        let (cos, sin) = cos_sin(rotation - self.global_rotation(id));
        (c.width * cos).abs() + (c.height * sin).abs()
    }

    /// Moves the component along the rotated axis to `value`.
    pub fn set_coord(&mut self, id: ComponentId, value: f64, rotation: f64) {
        let delta = value - self.coord(id, rotation);
        let (cos, sin) = cos_sin(rotation);
        let c = &mut self.components[id];
        c.x += delta * cos;
        c.y += delta * sin;
    }

    pub fn apply_align(&mut self, id: ComponentId, align: Align) {
        match align.kind {
            AlignKind::Relative {
                you,
                coord_rotation,
                my_joint,
                your_joint,
            } => {
                let value = self.coord(you, coord_rotation) - my_joint * self.ext(id, coord_rotation)
                    + your_joint * self.ext(you, coord_rotation);
                self.set_coord(id, value, coord_rotation);
            }
            AlignKind::Absolute {
                coord_rotation,
                coordinate,
            } => self.set_coord(id, coordinate, coord_rotation),
            AlignKind::Null => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn line(attrs: LineAttrs) -> ComponentKind {
        ComponentKind::Line(attrs)
    }

    fn interline() -> LineAttrs {
        LineAttrs {
            interline: true,
            ..LineAttrs::default()
        }
    }

    fn joint(tree: &ViewTree, id: ComponentId, axis: Axis) -> (Option<ComponentId>, f64, f64, Priority) {
        let a = tree.get(id).align(axis).copied().unwrap();
        match a.kind {
            AlignKind::Relative {
                you,
                my_joint,
                your_joint,
                ..
            } => (Some(you), my_joint, your_joint, a.priority),
            _ => (None, 0.0, 0.0, a.priority),
        }
    }

    #[test]
    fn text_collapses_whitespace_runs() {
        assert_eq!(
            ComponentKind::text("a \n\t b "),
            ComponentKind::Text {
                content: "a\u{a0}b\u{a0}".into(),
                decorations: vec![]
            }
        );
    }

    #[test]
    fn block_children_stack_below_previous_sibling() {
        let mut tree = ViewTree::default();
        let root = tree.create(ComponentKind::Surface);
        tree.set_root(root);
        let a = tree.create(ComponentKind::Zone);
        let b = tree.create(ComponentKind::Zone);
        tree.attach(root, a).unwrap();
        tree.attach(root, b).unwrap();

        assert_eq!(joint(&tree, a, Axis::Vertical), (Some(root), 0.0, 0.0, Priority::ImplicitByDocOrder));
        assert_eq!(joint(&tree, b, Axis::Vertical), (Some(a), 0.0, 1.0, Priority::ImplicitByDocOrder));
        assert_eq!(joint(&tree, b, Axis::Horizontal), (Some(root), 0.0, 0.0, Priority::ImplicitByDocOrder));
    }

    #[test]
    fn inline_children_follow_previous_and_leave_vertical_free() {
        let mut tree = ViewTree::default();
        let l = tree.create(line(LineAttrs::default()));
        let a = tree.create(ComponentKind::text("a"));
        let b = tree.create(ComponentKind::text("b"));
        tree.attach(l, a).unwrap();
        tree.attach(l, b).unwrap();

        assert_eq!(joint(&tree, a, Axis::Horizontal).0, Some(l));
        assert_eq!(joint(&tree, b, Axis::Horizontal), (Some(a), 0.0, 1.0, Priority::ImplicitByDocOrder));
        assert_eq!(tree.get(b).v_align.map(|a| a.kind), Some(AlignKind::Null));
    }

    #[test]
    fn interline_spacing_counts_preceding_interlines() {
        let mut tree = ViewTree::default();
        let zone = tree.create(ComponentKind::Zone);
        let l0 = tree.create(line(LineAttrs::default()));
        let i1 = tree.create(line(interline()));
        let i2 = tree.create(line(interline()));
        let l3 = tree.create(line(LineAttrs::default()));
        for l in [l0, i1, i2, l3] {
            tree.attach(zone, l).unwrap();
        }

        let (you, _, j, _) = joint(&tree, i1, Axis::Vertical);
        assert_eq!(you, Some(l0));
        assert!((j - 0.58).abs() < 1e-9);

        let (you, _, j, _) = joint(&tree, i2, Axis::Vertical);
        assert_eq!(you, Some(l0));
        assert!((j - 1.16).abs() < 1e-9);

        let (you, _, j, _) = joint(&tree, l3, Axis::Vertical);
        assert_eq!(you, Some(l0));
        assert!((j - 1.58).abs() < 1e-9);
    }

    #[test]
    fn over_and_between_depend_on_overlay_mode() {
        for (overlay, expected) in [(Overlay::None, 0.5), (Overlay::Overlay, 0.1)] {
            let mut tree = ViewTree::new(overlay);
            let zone = tree.create(ComponentKind::Zone);
            let l0 = tree.create(line(LineAttrs::default()));
            let l1 = tree.create(line(LineAttrs {
                over: true,
                between: true,
                ..LineAttrs::default()
            }));
            tree.attach(zone, l0).unwrap();
            tree.attach(zone, l1).unwrap();
            assert_eq!(joint(&tree, l1, Axis::Vertical).2, expected);
        }
    }

    #[test]
    fn indent_overrides_implicit_line_alignment() {
        let mut tree = ViewTree::default();
        let zone = tree.create(ComponentKind::Zone);
        let l = tree.create(line(LineAttrs {
            indent_center: Some(0.3),
            ..LineAttrs::default()
        }));
        tree.attach(zone, l).unwrap();
        assert_eq!(
            joint(&tree, l, Axis::Horizontal),
            (Some(zone), 0.5, 0.3, Priority::IndentCenterAttr)
        );
    }

    #[test]
    fn equal_priority_conflicts_higher_wins() {
        let mut tree = ViewTree::default();
        let a = tree.create(ComponentKind::Inline);
        let b = tree.create(ComponentKind::Inline);
        tree.get_mut(a).element_name = "seg".into();
        tree.get_mut(a).xml_id = Some("s1".into());

        tree.set_align(a, Axis::Horizontal, Align::relative(b, 0.0, 0.0, 0.0, Priority::Explicit))
            .unwrap();
        // lower priority is ignored, in either order
        tree.set_align(a, Axis::Horizontal, Align::relative(b, 0.0, 1.0, 1.0, Priority::RendAttr))
            .unwrap();
        assert_eq!(tree.get(a).h_align.unwrap().priority, Priority::Explicit);

        let err = tree
            .set_align(a, Axis::Horizontal, Align::relative(b, 0.0, 1.0, 0.0, Priority::Explicit))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "ENCODING ERROR: Conflicting alignment instructions for element seg #s1 (hAlign, EXPLICIT)"
        );

        tree.set_align(a, Axis::Vertical, Align::relative(b, 90.0, 0.0, 0.0, Priority::RendAttr))
            .unwrap();
        tree.set_align(a, Axis::Vertical, Align::absolute(90.0, 0.0, Priority::MainZone))
            .unwrap();
        assert_eq!(tree.get(a).v_align.unwrap().priority, Priority::MainZone);
    }

    #[test]
    fn null_align_gives_way_without_conflict() {
        let mut tree = ViewTree::default();
        let a = tree.create(ComponentKind::Inline);
        let b = tree.create(ComponentKind::Inline);

        tree.set_align(a, Axis::Vertical, Align::null()).unwrap();
        tree.set_align(a, Axis::Vertical, Align::relative(b, 90.0, 0.0, 1.0, Priority::ImplicitByDocOrder))
            .unwrap();
        assert_eq!(
            joint(&tree, a, Axis::Vertical),
            (Some(b), 0.0, 1.0, Priority::ImplicitByDocOrder)
        );

        // a later null leaves the constraint in place
        tree.set_align(a, Axis::Vertical, Align::null()).unwrap();
        assert!(!tree.get(a).v_align.unwrap().is_null());

        tree.set_align(a, Axis::Horizontal, Align::null()).unwrap();
        tree.set_align(a, Axis::Horizontal, Align::null()).unwrap();
        assert!(tree.get(a).h_align.unwrap().is_null());
    }

    #[test]
    fn relative_align_uses_joints_and_extents() {
        let mut tree = ViewTree::default();
        let me = tree.create(ComponentKind::Inline);
        let you = tree.create(ComponentKind::Inline);
        {
            let y = tree.get_mut(you);
            y.x = 100.0;
            y.y = 40.0;
            y.width = 50.0;
            y.height = 20.0;
        }
        tree.get_mut(me).width = 10.0;
        tree.get_mut(me).height = 8.0;

        // right edge of me at the right edge of you
        tree.apply_align(me, Align::relative(you, 0.0, 1.0, 1.0, Priority::RendAttr));
        assert_eq!(tree.get(me).x, 140.0);
        // top of me at bottom of you
        tree.apply_align(me, Align::relative(you, 90.0, 0.0, 1.0, Priority::RendAttr));
        assert_eq!(tree.get(me).y, 60.0);
        assert_eq!(tree.get(me).x, 140.0);
    }

    #[test]
    fn rotated_extent_swaps_axes() {
        let mut tree = ViewTree::default();
        let zone = tree.create(ComponentKind::Zone);
        let c = tree.get_mut(zone);
        c.rotation = 90.0;
        c.width = 30.0;
        c.height = 10.0;
        assert_eq!(tree.ext(zone, 0.0), 10.0);
        assert_eq!(tree.ext(zone, 90.0), 30.0);
    }

    #[test]
    fn classes_for_hidden_and_named_components() {
        let mut tree = ViewTree::default();
        let d = tree.create_with_classes(
            ComponentKind::InlineDecoration(DecorationShape::Circle),
            vec!["hand-g".into()],
        );
        tree.get_mut(d).element_name = "hi".into();
        assert_eq!(
            tree.compute_classes(d),
            vec![
                "element-hi",
                "hand-g",
                "inline-decoration",
                "inline-decoration-type-circle"
            ]
        );
        tree.get_mut(d).hidden = true;
        assert_eq!(tree.compute_classes(d), vec!["invisible"]);
    }

    #[test]
    fn text_decoration_classes() {
        let d = TextDecoration::new(
            "underline",
            DecorationStyle::Line { y_offset: 0.1 },
            &["hand-g".to_string()],
        );
        assert_eq!(
            d.classes,
            vec!["hand-g", "text-decoration-type-underline", "text-decoration"]
        );
    }
}
