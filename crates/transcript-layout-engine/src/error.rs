use std::time::Duration;

use crate::layout::align::{Axis, Priority};

/// Prefix carried by every [`EncodingError`] message.
pub const ENCODING_ERROR_PREFIX: &str = "ENCODING ERROR: ";

/// The transcript document itself is malformed.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Malformed transcript JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Annotation {annotation} refers to unknown name key {key:?}")]
    UnknownName { annotation: String, key: String },

    #[error("Annotation {annotation} has no target")]
    NoTarget { annotation: String },

    #[error("Annotation {annotation} has an inverted range [{start}, {end})")]
    InvertedRange {
        annotation: String,
        start: usize,
        end: usize,
    },
}

/// The markup is well-formed but cannot be laid out as encoded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodingError {
    #[error("ENCODING ERROR: Reference to #{0} cannot be resolved!")]
    UnresolvedReference(String),

    #[error("ENCODING ERROR: More than one main zone specified!")]
    MultipleMainZones,

    #[error(
        "ENCODING ERROR: Conflicting alignment instructions for element {element} #{xml_id} ({axis}, {priority})"
    )]
    ConflictingAlign {
        element: String,
        xml_id: String,
        axis: Axis,
        priority: Priority,
    },

    #[error("ENCODING ERROR: {element}: Please specify @{attribute}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("ENCODING ERROR: {element}: invalid @{attribute} value {value:?}")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },

    #[error("ENCODING ERROR: Invalid unit for {context}! Use '{expected}'!")]
    InvalidUnit {
        context: &'static str,
        expected: &'static str,
    },

    #[error("ENCODING ERROR: Please specify either @quantity or @atLeast")]
    GapExtent,

    #[error("ENCODING ERROR: S-curve can't be inline!")]
    InlineSCurve,

    #[error("ENCODING ERROR: {element} outside of any zone")]
    NoCurrentZone { element: &'static str },
}

/// Anything that aborts a single render.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("Cannot create empty text!")]
    EmptyText,

    #[error("Layout exceeded its time budget of {budget:?} after {passes} passes")]
    TimedOut { passes: usize, budget: Duration },
}
