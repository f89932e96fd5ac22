//! # View components and alignment
//!
//! The view tree is an arena of [`Component`]s. Each component carries up to
//! two one-dimensional [`Align`] constraints (horizontal and vertical) against
//! another component or a fixed coordinate. Defaults are installed when a
//! component is attached; markup may override them with higher priorities.
//!
//! ## Layout
//!
//! [`relax`] runs a fixed number of depth-first passes. Each pass sizes a
//! component from its children (or from [`TextMeasure`] for leaves), positions
//! it through its aligns, then recurses. Sizes and positions depend on each
//! other across the tree, so a single pass is not enough.

use serde::{Deserialize, Serialize};

pub mod align;
pub mod component;
pub mod engine;
pub mod measure;

pub use align::{Align, AlignKind, Axis, Priority};
pub use component::{
    Component, ComponentId, ComponentKind, Covering, DecorationShape, DecorationStyle, Graphic,
    LineAttrs, TextDecoration, ViewTree,
};
pub use engine::{LayoutReport, SETTLE_EPSILON, layout_pass, relax};
pub use measure::{FixedMetrics, TextMeasure};

/// Line spacing mode. In overlay mode the transcript is drawn over the
/// facsimile, so lines written over others sit much closer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overlay {
    #[default]
    None,
    Overlay,
}
