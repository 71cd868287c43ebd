/// Layout Renderer — the measurement and rasterization oracle.
///
/// Everything that needs to know how tall text is, or what a page looks like,
/// goes through `LayoutRenderer`. Nothing outside this module touches the
/// browser API directly.
use async_trait::async_trait;
use thiserror::Error;

use crate::layout::presets::Dimensions;

pub mod browser;
#[cfg(test)]
pub mod fake;

pub use browser::BrowserEngine;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("browser protocol error: {0}")]
    Protocol(#[from] chromiumoxide::error::CdpError),

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("unexpected value from renderer: {0}")]
    UnexpectedValue(#[from] serde_json::Error),

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: &'static str, secs: u64 },

    #[error("element '{selector}' not found in rendered page")]
    ElementNotFound { selector: String },

    #[error("renderer reported an invalid height: {0}")]
    InvalidHeight(f64),

    #[error("{page} page has no room for content (budget {budget}px)")]
    InvalidBudget { page: &'static str, budget: f64 },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("rendered image is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("browser engine has been shut down")]
    ShutDown,
}

/// Narrow capability interface over a real layout engine.
#[async_trait]
pub trait LayoutRenderer: Send + Sync {
    /// Lays out `html` in a viewport of `viewport` and returns the rendered height,
    /// in CSS pixels, of the first element matching `selector`.
    async fn measure(
        &self,
        html: &str,
        viewport: Dimensions,
        selector: &str,
    ) -> Result<f64, RenderError>;

    /// Lays out `html` and returns a PNG screenshot of exactly `viewport`.
    async fn rasterize(&self, html: &str, viewport: Dimensions) -> Result<Vec<u8>, RenderError>;
}

/// Rejects heights no layout engine should produce.
pub(crate) fn checked_height(height: f64) -> Result<f64, RenderError> {
    if height.is_finite() && height >= 0.0 {
        Ok(height)
    } else {
        Err(RenderError::InvalidHeight(height))
    }
}
