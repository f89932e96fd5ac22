use std::time::{Duration, Instant};

use log::{debug, trace};

use super::{
    align::{Align, AlignKind, Axis},
    component::{ComponentId, ComponentKind, ViewTree},
    measure::TextMeasure,
};
use crate::error::RenderError;

/// Movement below which a component counts as settled.
pub const SETTLE_EPSILON: f64 = 0.01;

/// Outcome of [`relax`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutReport {
    pub passes: usize,
    /// Components that moved less than [`SETTLE_EPSILON`] in the last pass.
    pub settled: usize,
    pub components: usize,
}

/// Runs `passes` layout passes over the whole tree. There is no convergence
/// check; `time_budget` is checked between passes.
pub fn relax(
    tree: &mut ViewTree,
    measure: &dyn TextMeasure,
    passes: usize,
    time_budget: Option<Duration>,
) -> Result<LayoutReport, RenderError> {
    let started = Instant::now();
    for pass in 0..passes {
        if let Some(budget) = time_budget {
            if started.elapsed() >= budget {
                return Err(RenderError::TimedOut { passes: pass, budget });
            }
        }
        layout_pass(tree, measure);
        trace!("pass {pass}: {} settled", settled_count(tree));
    }

    let report = LayoutReport {
        passes,
        settled: settled_count(tree),
        components: tree.len(),
    };
    debug!(
        "layout: {} passes, {}/{} settled in {:?}",
        report.passes,
        report.settled,
        report.components,
        started.elapsed()
    );
    Ok(report)
}

/// One depth-first pass from the root: dimension, then position, then the
/// children, then the floats.
pub fn layout_pass(tree: &mut ViewTree, measure: &dyn TextMeasure) {
    if let Some(root) = tree.root() {
        layout_component(tree, measure, root);
    }
}

fn settled_count(tree: &ViewTree) -> usize {
    tree.iter().filter(|(_, c)| c.settled).count()
}

fn layout_component(tree: &mut ViewTree, measure: &dyn TextMeasure, id: ComponentId) {
    let before = geometry(tree, id);
    compute_dimension(tree, measure, id);
    compute_position(tree, id);

    let mut i = 0;
    while i < tree.get(id).children.len() {
        let child = tree.get(id).children[i];
        layout_component(tree, measure, child);
        i += 1;
    }
    let mut i = 0;
    while i < tree.get(id).floats.len() {
        let float = tree.get(id).floats[i];
        layout_component(tree, measure, float);
        i += 1;
    }

    let after = geometry(tree, id);
    tree.get_mut(id).settled = before
        .iter()
        .zip(after.iter())
        .all(|(a, b)| (a - b).abs() < SETTLE_EPSILON);
}

fn geometry(tree: &ViewTree, id: ComponentId) -> [f64; 4] {
    let c = tree.get(id);
    [c.x, c.y, c.width, c.height]
}

/// Axis-aligned bounding box `(x, y, width, height)` of several components.
fn union(tree: &ViewTree, ids: &[ComponentId]) -> Option<(f64, f64, f64, f64)> {
    let mut ids = ids.iter();
    let first = tree.get(*ids.next()?);
    let (mut x0, mut y0) = (first.x, first.y);
    let (mut x1, mut y1) = (first.x + first.width, first.y + first.height);
    for id in ids {
        let c = tree.get(*id);
        x0 = x0.min(c.x);
        y0 = y0.min(c.y);
        x1 = x1.max(c.x + c.width);
        y1 = y1.max(c.y + c.height);
    }
    Some((x0, y0, x1 - x0, y1 - y0))
}

fn compute_dimension(tree: &mut ViewTree, measure: &dyn TextMeasure, id: ComponentId) {
    let c = tree.get(id);
    let sizes: Vec<(f64, f64)> = c
        .children
        .iter()
        .map(|child| {
            let child = tree.get(*child);
            (child.width, child.height)
        })
        .collect();
    let (width, height) = match &c.kind {
        ComponentKind::Surface | ComponentKind::Patch | ComponentKind::Zone => sizes
            .iter()
            .fold((0.0, 0.0), |(w, h), (cw, ch)| (f64::max(w, *cw), h + ch)),
        ComponentKind::Line(_) | ComponentKind::Inline | ComponentKind::InlineDecoration(_) => {
            sizes
                .iter()
                .fold((0.0, 0.0), |(w, h), (cw, ch)| (w + cw, f64::max(h, *ch)))
        }
        ComponentKind::VSpace { lines } => (0.0, lines * measure.line_height()),
        ComponentKind::Text { content, .. } => measure.measure(content, &c.classes),
        ComponentKind::HSpace { chars } => (chars * measure.measure("\u{a0}", &c.classes).0, 0.0),
        ComponentKind::InlineGraphic(g) => (
            g.display_width.unwrap_or(g.image_width),
            g.display_height.unwrap_or(g.image_height),
        ),
        ComponentKind::CoveringImage(cover) => match union(tree, &cover.covered) {
            Some((_, _, w, h)) => (w, h),
            None => (cover.fixed_width, cover.fixed_height),
        },
    };
    let c = tree.get_mut(id);
    c.width = width;
    c.height = height;
}

fn compute_position(tree: &mut ViewTree, id: ComponentId) {
    let c = tree.get(id);
    if matches!(c.kind, ComponentKind::Surface) && c.parent.is_none() {
        let c = tree.get_mut(id);
        c.x = 0.0;
        c.y = 0.0;
        return;
    }
    if let ComponentKind::CoveringImage(cover) = &c.kind {
        if let Some((x, y, _, _)) = union(tree, &cover.covered) {
            let c = tree.get_mut(id);
            c.x = x;
            c.y = y;
        }
        return;
    }

    for axis in [Axis::Horizontal, Axis::Vertical] {
        match tree.get(id).align(axis).copied() {
            Some(Align {
                kind: AlignKind::Null,
                ..
            }) => claim_by_parent(tree, id, axis),
            Some(align) => tree.apply_align(id, align),
            None => {}
        }
    }
}

/// An unconstrained (`Null`) axis follows the parent's leading edge, so inline
/// runs sit on their line. This stands in for the baseline placement a
/// renderer does for inline content; the `Null` align itself stays a no-op.
fn claim_by_parent(tree: &mut ViewTree, id: ComponentId, axis: Axis) {
    let c = tree.get(id);
    if c.floating {
        return;
    }
    if let Some(parent) = c.parent {
        let rotation = tree.global_rotation(id) + axis.base_rotation();
        let value = tree.coord(parent, rotation);
        tree.set_coord(id, value, rotation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{
        FixedMetrics, Overlay,
        align::Priority,
        component::{Covering, LineAttrs},
    };
    use pretty_assertions::assert_eq;

    fn bbox(tree: &ViewTree, id: ComponentId) -> (f64, f64, f64, f64) {
        let c = tree.get(id);
        (c.x, c.y, c.width, c.height)
    }

    /// Surface > Zone > [Line > [Text "ab", Text "cde"], Line > Text "f"]
    fn two_lines() -> (ViewTree, Vec<ComponentId>) {
        let mut tree = ViewTree::new(Overlay::None);
        let surface = tree.create(ComponentKind::Surface);
        tree.set_root(surface);
        let zone = tree.create(ComponentKind::Zone);
        tree.attach(surface, zone).unwrap();
        let l1 = tree.create(ComponentKind::Line(LineAttrs::default()));
        let l2 = tree.create(ComponentKind::Line(LineAttrs::default()));
        tree.attach(zone, l1).unwrap();
        tree.attach(zone, l2).unwrap();
        let ab = tree.create(ComponentKind::text("ab"));
        let cde = tree.create(ComponentKind::text("cde"));
        let f = tree.create(ComponentKind::text("f"));
        tree.attach(l1, ab).unwrap();
        tree.attach(l1, cde).unwrap();
        tree.attach(l2, f).unwrap();
        (tree, vec![surface, zone, l1, l2, ab, cde, f])
    }

    #[test]
    fn lines_stack_and_texts_flow() {
        let (mut tree, ids) = two_lines();
        let report = relax(&mut tree, &FixedMetrics::default(), 15, None).unwrap();

        let [surface, zone, l1, l2, ab, cde, f] = ids[..] else {
            unreachable!()
        };
        assert_eq!(bbox(&tree, surface), (0.0, 0.0, 50.0, 40.0));
        assert_eq!(bbox(&tree, zone), (0.0, 0.0, 50.0, 40.0));
        assert_eq!(bbox(&tree, l1), (0.0, 0.0, 50.0, 20.0));
        assert_eq!(bbox(&tree, l2), (0.0, 20.0, 10.0, 20.0));
        assert_eq!(bbox(&tree, ab), (0.0, 0.0, 20.0, 20.0));
        assert_eq!(bbox(&tree, cde), (20.0, 0.0, 30.0, 20.0));
        assert_eq!(bbox(&tree, f), (0.0, 20.0, 10.0, 20.0));
        assert_eq!(report.passes, 15);
        assert_eq!(report.settled, report.components);
    }

    #[test]
    fn single_pass_leaves_dependent_sizes_unsettled() {
        let (mut tree, _) = two_lines();
        layout_pass(&mut tree, &FixedMetrics::default());
        let report = relax(&mut tree, &FixedMetrics::default(), 1, None).unwrap();
        assert!(report.settled < report.components);
    }

    #[test]
    fn exhausted_budget_stops_between_passes() {
        let (mut tree, _) = two_lines();
        let err = relax(&mut tree, &FixedMetrics::default(), 3, Some(Duration::ZERO)).unwrap_err();
        assert!(matches!(err, RenderError::TimedOut { passes: 0, .. }));
        assert!(relax(&mut tree, &FixedMetrics::default(), 3, Some(Duration::from_secs(60))).is_ok());
    }

    #[test]
    fn covering_float_spans_covered_components() {
        let (mut tree, ids) = two_lines();
        let zone = ids[1];
        let cover = tree.create(ComponentKind::CoveringImage(Covering {
            kind: "grLine".into(),
            image_url: "./img/x.svg#img".into(),
            fixed_width: 100.0,
            fixed_height: 100.0,
            covered: vec![ids[5], ids[6]],
        }));
        tree.attach_float(zone, cover);
        let empty = tree.create(ComponentKind::CoveringImage(Covering {
            kind: "grLine".into(),
            image_url: "./img/x.svg#img".into(),
            fixed_width: 100.0,
            fixed_height: 100.0,
            covered: vec![],
        }));
        tree.attach_float(zone, empty);

        relax(&mut tree, &FixedMetrics::default(), 15, None).unwrap();
        // cde at (20, 0) and f at (0, 20)
        assert_eq!(bbox(&tree, cover), (0.0, 0.0, 50.0, 40.0));
        assert_eq!(bbox(&tree, empty), (0.0, 0.0, 100.0, 100.0));
        assert_eq!(tree.global_rotation(cover), 0.0);
    }

    #[test]
    fn absolute_align_pins_coordinate() {
        let mut tree = ViewTree::default();
        let surface = tree.create(ComponentKind::Surface);
        tree.set_root(surface);
        let a = tree.create(ComponentKind::Zone);
        let b = tree.create(ComponentKind::Zone);
        tree.attach(surface, a).unwrap();
        tree.attach(surface, b).unwrap();
        let t = tree.create(ComponentKind::VSpace { lines: 2.0 });
        tree.attach(a, t).unwrap();
        tree.set_align(b, Axis::Vertical, Align::absolute(90.0, 0.0, Priority::MainZone))
            .unwrap();

        relax(&mut tree, &FixedMetrics::default(), 5, None).unwrap();
        assert_eq!(bbox(&tree, a), (0.0, 0.0, 0.0, 40.0));
        assert_eq!(tree.get(b).y, 0.0);
    }

    #[test]
    fn rotated_zone_lays_lines_out_along_its_axes() {
        let mut tree = ViewTree::default();
        let surface = tree.create(ComponentKind::Surface);
        tree.set_root(surface);
        let zone = tree.create(ComponentKind::Zone);
        tree.get_mut(zone).rotation = 90.0;
        tree.attach(surface, zone).unwrap();
        let l1 = tree.create(ComponentKind::Line(LineAttrs::default()));
        let l2 = tree.create(ComponentKind::Line(LineAttrs::default()));
        tree.attach(zone, l1).unwrap();
        tree.attach(zone, l2).unwrap();
        let a = tree.create(ComponentKind::text("a"));
        tree.attach(l1, a).unwrap();

        relax(&mut tree, &FixedMetrics::default(), 10, None).unwrap();
        // the second line stacks "down" the zone, which is global -x
        assert_eq!(tree.get(l2).x, -20.0);
        assert_eq!(tree.get(l2).y, 0.0);
    }
}
