use std::collections::HashSet;

use crate::layout::{Axis, ComponentId, ViewTree};

pub fn check(views: &ViewTree) {
    let Some(root) = views.root() else {
        assert!(views.is_empty(), "components without a root");
        return;
    };
    assert!(views.get(root).parent.is_none(), "root has a parent");

    let mut seen = HashSet::new();
    visit(views, root, &mut seen);

    for (id, c) in views.iter() {
        for axis in [Axis::Horizontal, Axis::Vertical] {
            if let Some(target) = c.align(axis).and_then(|a| a.target()) {
                assert!(
                    target < views.len(),
                    "component {id} aligns to missing component {target}"
                );
                assert_ne!(target, id, "component {id} aligns to itself");
            }
        }
        if seen.contains(&id) {
            assert!(
                [c.x, c.y, c.width, c.height].iter().all(|v| v.is_finite()),
                "component {id} has non-finite geometry"
            );
            assert!(
                c.width >= 0.0 && c.height >= 0.0,
                "component {id} has negative size {}x{}",
                c.width,
                c.height
            );
        }
    }
}

fn visit(views: &ViewTree, id: ComponentId, seen: &mut HashSet<ComponentId>) {
    assert!(seen.insert(id), "component {id} reached twice");
    let c = views.get(id);
    for (pos, child) in c.children.iter().enumerate() {
        let ch = views.get(*child);
        assert_eq!(ch.parent, Some(id), "child {child} does not point back to {id}");
        assert_eq!(ch.pos, pos, "child {child} has a stale position");
        assert!(!ch.floating, "child {child} is marked floating");
        visit(views, *child, seen);
    }
    for float in &c.floats {
        let f = views.get(*float);
        assert_eq!(f.parent, Some(id), "float {float} does not point back to {id}");
        assert!(f.floating, "float {float} is not marked floating");
        visit(views, *float, seen);
    }
}
