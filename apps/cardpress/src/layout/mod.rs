// Layout engine: measured pagination and page composition.
// All height decisions defer to the LayoutRenderer; nothing here models font metrics
// except the heuristic fallback.

pub mod compositor;
pub mod heuristic;
pub mod markup;
pub mod measurer;
pub mod options;
pub mod page_break;
pub mod paginator;
pub mod presets;
pub mod text;
pub mod theme;

// Re-export the public API consumed by the cards pipeline and handlers.
pub use compositor::{compose_pages, ComposeError, RenderedPage};
pub use options::{CoverImage, RenderOptions};
pub use paginator::{paginate, Page};
pub use presets::{FontScale, Ratio};
pub use theme::Theme;
