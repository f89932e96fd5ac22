//! # Standoff text model
//!
//! A [`Text`] owns the transcript content, its flat annotation set and an
//! [`IntervalIndex`] over the annotation ranges. Annotations may overlap
//! arbitrarily; nothing here assumes nesting.
//!
//! ## Modules
//!
//! - **`range`**: half-open `[start, end)` offsets and their total order
//! - **`index`**: red-black interval tree with `max_end` augmentation
//! - **`annotation`**: names, targets and attribute data
//! - **`model`**: the [`Text`] itself, `find` and `partition`
//! - **`source`**: serde model of the transcript JSON
//! - **`slice`**: UTF-16 offset handling over the rope

pub mod annotation;
pub mod index;
pub mod model;
pub mod range;
pub mod slice;
pub mod source;

pub use annotation::{Annotation, AnnotationData, AnnotationRef, Name, TargetText, TextTarget};
pub use index::IntervalIndex;
pub use model::{AnnotationFilter, Text};
pub use range::Range;
pub use source::TranscriptSource;
