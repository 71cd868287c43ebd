//! Deterministic stand-in for the browser, used by tests.
//!
//! Heights are derived from the generated markup: every `<p>` wraps at a fixed
//! number of characters per line, every divider costs a fixed height, and the
//! skeleton slot is the card height minus fixed chrome costs.

use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};

use crate::layout::markup::{CONTENT_SELECTOR, SLOT_SELECTOR};
use crate::layout::presets::Dimensions;
use crate::renderer::{LayoutRenderer, RenderError};

pub const CHARS_PER_LINE: usize = 30;
pub const LINE_HEIGHT: f64 = 60.0;
pub const PARAGRAPH_GAP: f64 = 30.0;
pub const DIVIDER_HEIGHT: f64 = 70.0;
pub const FOOTER_COST: f64 = 168.0;
pub const TITLE_COST: f64 = 150.0;
pub const COVER_COST: f64 = 500.0;

#[derive(Default)]
pub struct FakeRenderer {
    pub measure_calls: AtomicU32,
    pub raster_calls: AtomicU32,
    /// Forces every screenshot to this size instead of the requested viewport.
    pub raster_size: Mutex<Option<Dimensions>>,
    /// Screenshot calls (1-based) that return bytes no decoder accepts.
    pub corrupt_raster_call: Mutex<Option<u32>>,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn measure_count(&self) -> u32 {
        self.measure_calls.load(Ordering::SeqCst)
    }

    pub fn raster_count(&self) -> u32 {
        self.raster_calls.load(Ordering::SeqCst)
    }

    fn slot_height(html: &str, viewport: Dimensions) -> f64 {
        let mut height = viewport.height as f64 - FOOTER_COST;
        if html.contains("class=\"cover\"") {
            height -= COVER_COST;
        } else if html.contains("class=\"title\"") {
            height -= TITLE_COST;
        }
        height
    }

    fn content_height(html: &str) -> Option<f64> {
        let start = html.find("id=\"content-body\"")?;
        let body = &html[start..];
        let body = &body[body.find('>')? + 1..body.find("</div></main>")?];

        let mut height = 0.0;
        let mut blocks = 0usize;
        let mut rest = body;
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix("<hr class=\"divider\">") {
                height += DIVIDER_HEIGHT;
                blocks += 1;
                rest = after;
            } else if let Some(after) = rest.strip_prefix("<p>") {
                let end = after.find("</p>")?;
                let chars = after[..end].chars().count().max(1);
                height += chars.div_ceil(CHARS_PER_LINE) as f64 * LINE_HEIGHT;
                blocks += 1;
                rest = &after[end + "</p>".len()..];
            } else {
                return None;
            }
        }
        if blocks > 1 {
            height += (blocks - 1) as f64 * PARAGRAPH_GAP;
        }
        Some(height)
    }
}

#[async_trait]
impl LayoutRenderer for FakeRenderer {
    async fn measure(
        &self,
        html: &str,
        viewport: Dimensions,
        selector: &str,
    ) -> Result<f64, RenderError> {
        self.measure_calls.fetch_add(1, Ordering::SeqCst);
        let not_found = || RenderError::ElementNotFound {
            selector: selector.to_string(),
        };
        match selector {
            SLOT_SELECTOR if html.contains("id=\"content-slot\"") => {
                Ok(Self::slot_height(html, viewport))
            }
            CONTENT_SELECTOR => Self::content_height(html).ok_or_else(not_found),
            _ => Err(not_found()),
        }
    }

    async fn rasterize(&self, _html: &str, viewport: Dimensions) -> Result<Vec<u8>, RenderError> {
        let call = self.raster_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.corrupt_raster_call.lock().unwrap() == Some(call) {
            return Ok(b"not a png".to_vec());
        }
        let size = self.raster_size.lock().unwrap().unwrap_or(viewport);
        let image = RgbaImage::from_pixel(size.width, size.height, Rgba([250, 250, 250, 255]));
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_height_counts_lines_gaps_and_dividers() {
        let html = "<main class=\"content\"><div id=\"content-body\" class=\"content-body\">\
                    <p>short</p><hr class=\"divider\"><p>0123456789012345678901234567890</p>\
                    </div></main>";
        let expected = LINE_HEIGHT + DIVIDER_HEIGHT + 2.0 * LINE_HEIGHT + 2.0 * PARAGRAPH_GAP;
        assert_eq!(FakeRenderer::content_height(html), Some(expected));
    }

    #[tokio::test]
    async fn test_missing_element_is_an_error() {
        let fake = FakeRenderer::new();
        let viewport = Dimensions { width: 1080, height: 1440 };
        let err = fake.measure("<html></html>", viewport, SLOT_SELECTOR).await.unwrap_err();
        assert!(matches!(err, RenderError::ElementNotFound { .. }));
        assert_eq!(fake.measure_count(), 1);
    }
}
