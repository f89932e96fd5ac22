//! # View-tree construction
//!
//! Walks an [`AdhocTree`](crate::adhoc::AdhocTree) depth-first and asks the
//! [`ElementPolicy`] registered for each element what to build.
//!
//! ## Element hooks
//!
//! For every element the builder:
//!
//! 1. calls [`ElementPolicy::build`], which may return a component
//! 2. records explicit alignments (`f:at`, `f:left`, ...) for later
//! 3. applies `rend="left|right|centered"`
//! 4. attaches the component and registers its `xml:id`
//! 5. calls [`ElementPolicy::on_attach`], visits children, then
//!    [`ElementPolicy::on_detach`]
//!
//! Text runs are created through [`BuildContext::create_text`], which calls
//! [`ElementPolicy::on_text`] for every annotation over the run, structural
//! or not. That is how hands, strikethroughs and highlights reach text that
//! the ad-hoc tree never nested them around.
//!
//! Explicit alignments are resolved once the whole tree exists, so an element
//! may refer to an anchor that appears later in the document.

pub mod builder;
pub mod context;
pub mod kinds;
pub mod policy;

pub use builder::{BuildOptions, build_view};
pub use context::{BuildContext, IMAGE_PATH, TextState};
pub use policy::{ElementPolicy, MarkupName, PolicyRegistry};
