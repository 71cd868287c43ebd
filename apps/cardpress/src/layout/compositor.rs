//! Page Compositor — final themed HTML for each page, rasterized to a pixel buffer.
//!
//! Variant selection follows the page position and options:
//! - later pages, or `show_cover = false`: content + footer
//! - first page with a title: title heading + content + footer
//! - first page with a supplied cover image: banner (title over gradient) + content + footer

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use thiserror::Error;
use tracing::debug;

use crate::layout::markup::{self, Footer};
use crate::layout::options::RenderOptions;
use crate::layout::paginator::Page;
use crate::layout::presets::Dimensions;
use crate::renderer::{LayoutRenderer, RenderError};

/// Composition failure, tagged with the page that failed.
#[derive(Debug, Error)]
#[error("page {page_number} failed to render: {source}")]
pub struct ComposeError {
    pub page_number: usize,
    #[source]
    pub source: RenderError,
}

/// A composed card: the page it came from plus its pixels.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub page: Page,
    pub image: RgbaImage,
}

impl RenderedPage {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, ComposeError> {
        let mut png = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| ComposeError {
                page_number: self.page.page_number,
                source: RenderError::Image(e),
            })?;
        Ok(png)
    }
}

/// Builds the final HTML for a page.
pub fn page_html(page: &Page, total: usize, options: &RenderOptions) -> String {
    markup::page(
        options,
        options.chrome(page.is_first),
        &page.blocks,
        Footer {
            page_number: page.page_number,
            total,
        },
    )
}

/// Renders one page at exactly the configured card size.
pub async fn compose_page(
    renderer: &dyn LayoutRenderer,
    page: &Page,
    total: usize,
    options: &RenderOptions,
) -> Result<RenderedPage, ComposeError> {
    let fail = |source: RenderError| ComposeError {
        page_number: page.page_number,
        source,
    };
    let dims = options.dimensions();
    let html = page_html(page, total, options);

    let png = renderer.rasterize(&html, dims).await.map_err(fail)?;
    let image = image::load_from_memory_with_format(&png, ImageFormat::Png)
        .map_err(|e| fail(RenderError::Image(e)))?
        .to_rgba8();

    if image.width() != dims.width || image.height() != dims.height {
        return Err(fail(RenderError::DimensionMismatch {
            expected_width: dims.width,
            expected_height: dims.height,
            actual_width: image.width(),
            actual_height: image.height(),
        }));
    }

    debug!(page = page.page_number, total, "Composed page");
    Ok(RenderedPage {
        page: page.clone(),
        image,
    })
}

/// Renders every page in order. Stops at the first failing page.
pub async fn compose_pages(
    renderer: &dyn LayoutRenderer,
    pages: &[Page],
    options: &RenderOptions,
) -> Result<Vec<RenderedPage>, ComposeError> {
    let total = pages.len();
    let mut rendered = Vec::with_capacity(total);
    for page in pages {
        rendered.push(compose_page(renderer, page, total, options).await?);
    }
    Ok(rendered)
}
