pub mod adhoc;
pub mod build;
pub mod error;
pub mod layout;
pub mod output;
pub mod render;
pub mod snapshot;
pub mod text;

// Re-export key types for easier usage
pub use error::{EncodingError, RenderError, SourceError};
pub use layout::{FixedMetrics, Overlay, TextMeasure};
pub use output::RenderedComponent;
pub use render::{DEFAULT_ITERATIONS, RenderOptions, Rendering, render_text, render_transcript};
pub use text::Text;
