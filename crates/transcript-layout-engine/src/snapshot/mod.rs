//! # Snapshot Testing Support
//!
//! Utilities for testing the renderer via snapshot assertions and invariant checks.
//!
//! ## Modules
//!
//! - **`normalize`**: Converts a laid-out view tree to a stable, serializable `Snap`
//!   for `insta` snapshot testing
//! - **`invariants`**: Runtime checks for view-tree consistency (parent links,
//!   reachability, align targets, finite geometry)

pub mod invariants;
pub mod normalize;

pub use invariants::check as invariants;
pub use normalize::{Snap, normalize};
