//! End-to-end rendering of one transcript page.

use std::time::Duration;

use log::debug;

use crate::{
    adhoc::AdhocTree,
    build::{BuildOptions, PolicyRegistry, build_view},
    error::RenderError,
    layout::{LayoutReport, TextMeasure, ViewTree, relax},
    output::RenderedComponent,
    text::Text,
};

/// Layout passes run when nothing else is configured.
pub const DEFAULT_ITERATIONS: usize = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Number of layout passes.
    pub iterations: usize,
    pub build: BuildOptions,
    /// Wall-clock budget checked between passes.
    pub time_budget: Option<Duration>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            build: BuildOptions::default(),
            time_budget: None,
        }
    }
}

/// A laid-out page.
#[derive(Debug)]
pub struct Rendering {
    pub views: ViewTree,
    pub report: LayoutReport,
}

impl Rendering {
    pub fn output(&self) -> Option<RenderedComponent> {
        RenderedComponent::from_tree(&self.views)
    }
}

/// Parses a transcript and renders it with the default policies.
pub fn render_transcript(
    json: &str,
    options: &RenderOptions,
    measure: &dyn TextMeasure,
) -> Result<Rendering, RenderError> {
    let text = Text::from_json(json)?;
    render_text(&text, &PolicyRegistry::default(), options, measure)
}

/// Renders an already loaded text with the given policies.
pub fn render_text(
    text: &Text,
    registry: &PolicyRegistry,
    options: &RenderOptions,
    measure: &dyn TextMeasure,
) -> Result<Rendering, RenderError> {
    let tree = AdhocTree::build(text, &registry.structural_names());
    debug!("ad-hoc tree: {} nodes", tree.len());

    let mut views = build_view(&tree, text, registry, &options.build)?;
    let report = relax(&mut views, measure, options.iterations, options.time_budget)?;
    Ok(Rendering { views, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FixedMetrics;

    const PAGE: &str = r#"{
        "text": {"id": 1, "t": "transcript"},
        "textContent": "ab cd",
        "names": {"z": [null, "zone"], "l": [null, "line"]},
        "annotations": [
            {"n": "z", "d": {"xml:node": "1", "type": "main"}, "t": [[0, 5, 1]], "id": 1},
            {"n": "l", "d": {"xml:node": "1/1"}, "t": [[0, 2, 1]], "id": 2},
            {"n": "l", "d": {"xml:node": "2/1"}, "t": [[3, 5, 1]], "id": 3}
        ]
    }"#;

    #[test]
    fn renders_a_page() {
        let r = render_transcript(PAGE, &RenderOptions::default(), &FixedMetrics::default()).unwrap();
        assert_eq!(r.report.passes, DEFAULT_ITERATIONS);
        assert_eq!(r.report.settled, r.report.components);

        let out = r.output().unwrap();
        let zone = &out.children[0];
        assert_eq!((zone.width, zone.height), (30.0, 40.0));
        assert_eq!(zone.children[1].y, 20.0);
        assert_eq!(zone.children[1].children[0].text.as_deref(), Some("cd"));
    }

    #[test]
    fn malformed_json_is_a_source_error() {
        let err = render_transcript("{", &RenderOptions::default(), &FixedMetrics::default()).unwrap_err();
        assert!(matches!(err, RenderError::Source(_)));
    }

    #[test]
    fn zero_budget_times_out() {
        let options = RenderOptions {
            time_budget: Some(Duration::ZERO),
            ..RenderOptions::default()
        };
        let err = render_transcript(PAGE, &options, &FixedMetrics::default()).unwrap_err();
        assert!(matches!(err, RenderError::TimedOut { passes: 0, .. }));
    }
}
