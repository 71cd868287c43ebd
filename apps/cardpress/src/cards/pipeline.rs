//! Render pipeline — paginate, then compose every page.

use tracing::info;

use crate::config::{Config, PaginationMode};
use crate::errors::AppError;
use crate::layout::heuristic::paginate_by_estimate;
use crate::layout::{compose_pages, paginate, Page, RenderOptions, RenderedPage};
use crate::renderer::{LayoutRenderer, RenderError};

/// Pagination knobs taken from config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutTuning {
    pub mode: PaginationMode,
    pub safety_margin_px: f64,
}

impl From<&Config> for LayoutTuning {
    fn from(config: &Config) -> Self {
        Self {
            mode: config.pagination_mode,
            safety_margin_px: config.measure_safety_margin_px,
        }
    }
}

/// Splits `text` into pages with the configured paginator.
pub async fn paginate_text(
    renderer: &dyn LayoutRenderer,
    text: &str,
    options: &RenderOptions,
    tuning: LayoutTuning,
) -> Result<Vec<Page>, RenderError> {
    match tuning.mode {
        PaginationMode::Browser => paginate(renderer, text, options, tuning.safety_margin_px).await,
        PaginationMode::Heuristic => Ok(paginate_by_estimate(text, options)),
    }
}

/// Full job: pages plus one card-sized image per page, in page order.
pub async fn render_cards(
    renderer: &dyn LayoutRenderer,
    text: &str,
    options: &RenderOptions,
    tuning: LayoutTuning,
) -> Result<Vec<RenderedPage>, AppError> {
    let pages = paginate_text(renderer, text, options, tuning).await?;
    if pages.is_empty() {
        info!("No content to render");
        return Ok(Vec::new());
    }
    let rendered = compose_pages(renderer, &pages, options).await?;
    info!(pages = rendered.len(), "Cards rendered");
    Ok(rendered)
}
