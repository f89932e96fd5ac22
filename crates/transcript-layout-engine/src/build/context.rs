use std::collections::HashMap;

use log::trace;

use super::policy::PolicyRegistry;
use crate::{
    error::{EncodingError, RenderError},
    layout::{ComponentId, ComponentKind, Covering, Overlay, ViewTree},
    text::{Annotation, AnnotationFilter, Range, Text},
};

/// Directory covering images are referenced from.
pub const IMAGE_PATH: &str = "./img/";

/// Per-text-run state, reset for every created text.
#[derive(Debug, Clone, Default)]
pub struct TextState {
    /// Horizontal strikethroughs already drawn over this run.
    pub strikethroughs: usize,
}

/// State of one view-tree build, passed explicitly through the builder and
/// every policy hook.
pub struct BuildContext<'a> {
    text: &'a Text,
    registry: &'a PolicyRegistry,
    pub views: ViewTree,
    /// `xml:id` to component, for cross-references.
    pub id_map: HashMap<String, ComponentId>,
    pub text_state: TextState,
    main_zone: Option<ComponentId>,
    current_zone: Option<ComponentId>,
    line_count: Option<usize>,
    /// One covering float per (kind, annotation, zone).
    coverings: HashMap<(&'static str, String, ComponentId), ComponentId>,
}

impl<'a> BuildContext<'a> {
    pub fn new(text: &'a Text, registry: &'a PolicyRegistry, overlay: Overlay) -> Self {
        Self {
            text,
            registry,
            views: ViewTree::new(overlay),
            id_map: HashMap::new(),
            text_state: TextState::default(),
            main_zone: None,
            current_zone: None,
            line_count: None,
            coverings: HashMap::new(),
        }
    }

    pub fn text(&self) -> &'a Text {
        self.text
    }

    pub fn registry(&self) -> &'a PolicyRegistry {
        self.registry
    }

    pub fn main_zone(&self) -> Option<ComponentId> {
        self.main_zone
    }

    pub fn set_main_zone(&mut self, zone: ComponentId) -> Result<(), EncodingError> {
        if self.main_zone.is_some() {
            return Err(EncodingError::MultipleMainZones);
        }
        self.main_zone = Some(zone);
        Ok(())
    }

    pub fn set_current_zone(&mut self, zone: ComponentId) {
        self.current_zone = Some(zone);
    }

    /// The zone most recently entered; `element` names the caller in errors.
    pub fn current_zone(&self, element: &'static str) -> Result<ComponentId, EncodingError> {
        self.current_zone
            .ok_or(EncodingError::NoCurrentZone { element })
    }

    /// Zero-based number of the next line.
    pub fn next_line_number(&mut self) -> usize {
        let n = self.line_count.map_or(0, |n| n + 1);
        self.line_count = Some(n);
        n
    }

    /// Creates a detached text run and lets the policy of every non-empty
    /// annotation overlapping `range` decorate it.
    pub fn create_text(&mut self, content: &str, range: Range) -> Result<ComponentId, RenderError> {
        if content.is_empty() {
            return Err(RenderError::EmptyText);
        }
        let id = self.views.create(ComponentKind::text(content));
        self.text_state = TextState::default();

        let text = self.text;
        let registry = self.registry;
        for r in text.find(Some(range.start), Some(range.end), AnnotationFilter::Any) {
            let annotation = text.annotation(r);
            if annotation.local_range().is_none_or(|r| r.is_empty()) {
                continue;
            }
            registry
                .policy(annotation.local_name())
                .on_text(annotation, id, self)?;
        }
        trace!("text {id} {content:?} at {range}");
        Ok(id)
    }

    /// Creates a text run and appends it to `parent`.
    pub fn add_text(
        &mut self,
        parent: ComponentId,
        content: &str,
        range: Range,
    ) -> Result<ComponentId, RenderError> {
        let id = self.create_text(content, range)?;
        self.views.attach(parent, id)?;
        Ok(id)
    }

    /// The covering float for `annotation` in the current zone, created on
    /// first use. Returns whether it was created by this call.
    pub fn covering_image(
        &mut self,
        element: &'static str,
        annotation: &Annotation,
        image: &str,
        classes: Vec<String>,
    ) -> Result<(ComponentId, bool), EncodingError> {
        let zone = self.current_zone(element)?;
        let key = (element, annotation.id.clone(), zone);
        if let Some(id) = self.coverings.get(&key) {
            return Ok((*id, false));
        }

        let id = self.views.create_with_classes(
            ComponentKind::CoveringImage(Covering {
                kind: "grLine".to_string(),
                image_url: format!("{IMAGE_PATH}{image}"),
                fixed_width: 100.0,
                fixed_height: 100.0,
                covered: Vec::new(),
            }),
            classes,
        );
        self.views.get_mut(id).rotation = self.views.get(zone).rotation;
        self.views.attach_float(zone, id);
        self.coverings.insert(key, id);
        Ok((id, true))
    }

    /// Adds `component` to the components `float` covers.
    pub fn cover(&mut self, float: ComponentId, component: ComponentId) {
        if let ComponentKind::CoveringImage(covering) = &mut self.views.get_mut(float).kind {
            covering.covered.push(component);
        }
    }

    pub fn into_views(self) -> ViewTree {
        self.views
    }
}
