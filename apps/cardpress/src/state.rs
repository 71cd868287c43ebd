use std::sync::Arc;

use crate::config::Config;
use crate::renderer::LayoutRenderer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Measurement and rasterization backend. The shared headless browser in
    /// production; swapped for a deterministic fake in tests.
    pub renderer: Arc<dyn LayoutRenderer>,
}
