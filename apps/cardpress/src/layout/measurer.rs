//! Layout Measurer — how many pixels of body content fit on a page.
//!
//! Renders the themed skeleton (chrome + footer) around a flex-growing empty slot
//! and reads the slot's height. The stylesheets carry negative-margin banners and
//! other spacing that is not worth modelling by hand, so the engine decides.

use serde::Serialize;
use tracing::info;

use crate::layout::markup::{self, SLOT_SELECTOR};
use crate::layout::options::{Chrome, RenderOptions};
use crate::renderer::{LayoutRenderer, RenderError};

/// Content budgets in CSS pixels, safety margin already subtracted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageBudgets {
    pub first: f64,
    pub rest: f64,
}

impl PageBudgets {
    pub fn for_page(&self, is_first: bool) -> f64 {
        if is_first {
            self.first
        } else {
            self.rest
        }
    }
}

/// Measures the raw height available for content under the given chrome.
pub async fn available_height(
    renderer: &dyn LayoutRenderer,
    options: &RenderOptions,
    chrome: Chrome<'_>,
) -> Result<f64, RenderError> {
    let html = markup::skeleton(options, chrome);
    renderer
        .measure(&html, options.dimensions(), SLOT_SELECTOR)
        .await
}

/// Measures first-page and later-page budgets once per job. When the first page
/// has no chrome the two are identical and only one render is made.
pub async fn measure_budgets(
    renderer: &dyn LayoutRenderer,
    options: &RenderOptions,
    safety_margin: f64,
) -> Result<PageBudgets, RenderError> {
    let rest = checked_budget(
        "later",
        available_height(renderer, options, Chrome::None).await? - safety_margin,
    )?;
    let first_chrome = options.chrome(true);
    let first = if first_chrome.is_none() {
        rest
    } else {
        checked_budget(
            "first",
            available_height(renderer, options, first_chrome).await? - safety_margin,
        )?
    };

    info!(
        first_budget = first,
        rest_budget = rest,
        ratio = options.ratio.as_str(),
        "Measured page budgets"
    );
    Ok(PageBudgets { first, rest })
}

/// A non-positive or non-finite budget would make every probe overflow and
/// silently degrade to one sentence per page.
fn checked_budget(page: &'static str, budget: f64) -> Result<f64, RenderError> {
    if budget.is_finite() && budget > 0.0 {
        Ok(budget)
    } else {
        Err(RenderError::InvalidBudget { page, budget })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::options::CoverImage;
    use crate::layout::presets::{FontScale, Ratio};
    use crate::layout::theme::{Theme, ThemeId};
    use crate::renderer::fake::{FakeRenderer, COVER_COST, FOOTER_COST, TITLE_COST};

    fn options(title: Option<&str>, cover: bool) -> RenderOptions {
        RenderOptions::new(
            Theme::get(ThemeId::Minimal),
            Ratio::Portrait,
            FontScale::Medium,
            title.map(str::to_string),
            true,
            cover.then(|| CoverImage {
                data: "AA==".to_string(),
                mime_type: "image/png".to_string(),
            }),
        )
    }

    #[tokio::test]
    async fn test_budgets_without_chrome_use_one_render() {
        let fake = FakeRenderer::new();
        let budgets = measure_budgets(&fake, &options(None, false), 20.0).await.unwrap();
        assert_eq!(budgets.first, budgets.rest);
        assert_eq!(budgets.rest, 1440.0 - FOOTER_COST - 20.0);
        assert_eq!(fake.measure_count(), 1);
    }

    #[tokio::test]
    async fn test_title_chrome_shrinks_first_budget() {
        let fake = FakeRenderer::new();
        let budgets = measure_budgets(&fake, &options(Some("T"), false), 0.0).await.unwrap();
        assert_eq!(budgets.rest - budgets.first, TITLE_COST);
        assert_eq!(fake.measure_count(), 2);
    }

    #[tokio::test]
    async fn test_cover_chrome_shrinks_first_budget_more() {
        let fake = FakeRenderer::new();
        let budgets = measure_budgets(&fake, &options(Some("T"), true), 0.0).await.unwrap();
        assert_eq!(budgets.rest - budgets.first, COVER_COST);
        assert_eq!(budgets.for_page(true), budgets.first);
        assert_eq!(budgets.for_page(false), budgets.rest);
    }

    struct MissingSlot;

    #[async_trait::async_trait]
    impl LayoutRenderer for MissingSlot {
        async fn measure(
            &self,
            _html: &str,
            _viewport: crate::layout::presets::Dimensions,
            selector: &str,
        ) -> Result<f64, RenderError> {
            Err(RenderError::ElementNotFound {
                selector: selector.to_string(),
            })
        }

        async fn rasterize(
            &self,
            _html: &str,
            _viewport: crate::layout::presets::Dimensions,
        ) -> Result<Vec<u8>, RenderError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_missing_slot_fails_loudly() {
        let err = measure_budgets(&MissingSlot, &options(None, false), 20.0)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::ElementNotFound { .. }));
    }

    #[tokio::test]
    async fn test_margin_larger_than_page_is_rejected() {
        let err = measure_budgets(&FakeRenderer::new(), &options(None, false), 5000.0)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidBudget { page: "later", .. }));
    }

    #[tokio::test]
    async fn test_nan_margin_is_rejected() {
        let err = measure_budgets(&FakeRenderer::new(), &options(None, false), f64::NAN)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidBudget { .. }));
    }

    #[tokio::test]
    async fn test_chrome_filling_first_page_is_rejected() {
        // Later pages fit; the cover eats everything on page one.
        let margin = 1440.0 - FOOTER_COST - COVER_COST;
        let err = measure_budgets(&FakeRenderer::new(), &options(Some("T"), true), margin)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidBudget { page: "first", .. }));
    }
}
