//! Page-Break Search — the largest prefix of the remaining blocks that fits.
//!
//! Binary search over the block count, each probe a real layout of the page
//! markup the compositor will later render. Probes run one after another; each
//! one depends on the previous verdict.

use tracing::debug;

use crate::layout::markup::{self, Footer, CONTENT_SELECTOR};
use crate::layout::options::{Chrome, RenderOptions};
use crate::layout::text::Block;
use crate::renderer::{LayoutRenderer, RenderError};

/// Outcome of a break search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fit {
    /// Number of blocks from `start` placed on the page. Always ≥ 1 when any remain.
    pub count: usize,
    /// True when even the first block alone exceeds the budget; it is placed anyway.
    pub overflows: bool,
    pub probes: u32,
}

/// Finds how many blocks starting at `start` fit within `budget` pixels.
///
/// Callers must not search past the end of `blocks`.
pub async fn find_break(
    renderer: &dyn LayoutRenderer,
    options: &RenderOptions,
    chrome: Chrome<'_>,
    blocks: &[Block],
    start: usize,
    budget: f64,
) -> Result<Fit, RenderError> {
    debug_assert!(start < blocks.len(), "break search past end of blocks");
    let remaining = blocks.len().saturating_sub(start);
    let viewport = options.dimensions();

    // Invariant: `lo` blocks are known to fit (0 trivially), more than `hi` are not.
    let mut lo = 0usize;
    let mut hi = remaining;
    let mut probes = 0u32;

    while lo < hi {
        let mid = lo + (hi - lo).div_ceil(2);
        let html = markup::page(
            options,
            chrome,
            &blocks[start..start + mid],
            Footer::placeholder(),
        );
        let height = renderer.measure(&html, viewport, CONTENT_SELECTOR).await?;
        probes += 1;

        let fits = height <= budget;
        debug!(start, count = mid, height, budget, fits, "break probe");
        if fits {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    if lo == 0 && remaining > 0 {
        return Ok(Fit {
            count: 1,
            overflows: true,
            probes,
        });
    }
    Ok(Fit {
        count: lo,
        overflows: false,
        probes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::presets::{FontScale, Ratio};
    use crate::layout::text::split_paragraphs;
    use crate::layout::theme::{Theme, ThemeId};
    use crate::renderer::fake::{FakeRenderer, LINE_HEIGHT, PARAGRAPH_GAP};

    fn options() -> RenderOptions {
        RenderOptions::new(
            Theme::get(ThemeId::Minimal),
            Ratio::Portrait,
            FontScale::Medium,
            None,
            true,
            None,
        )
    }

    /// `n` one-line paragraphs.
    fn short_blocks(n: usize) -> Vec<Block> {
        let text = (0..n)
            .map(|i| format!("para {i}"))
            .collect::<Vec<_>>()
            .join("\n\n");
        split_paragraphs(&text)
    }

    /// Height of `k` one-line paragraphs in the fake renderer.
    fn height_of(k: usize) -> f64 {
        k as f64 * LINE_HEIGHT + (k.saturating_sub(1)) as f64 * PARAGRAPH_GAP
    }

    #[tokio::test]
    async fn test_finds_largest_fitting_prefix() {
        let fake = FakeRenderer::new();
        let blocks = short_blocks(20);
        let fit = find_break(&fake, &options(), Chrome::None, &blocks, 0, height_of(7))
            .await
            .unwrap();
        assert_eq!(fit.count, 7);
        assert!(!fit.overflows);
    }

    #[tokio::test]
    async fn test_respects_start_offset() {
        let fake = FakeRenderer::new();
        let blocks = short_blocks(10);
        let fit = find_break(&fake, &options(), Chrome::None, &blocks, 8, 10_000.0)
            .await
            .unwrap();
        assert_eq!(fit.count, 2);
    }

    #[tokio::test]
    async fn test_always_makes_progress() {
        let fake = FakeRenderer::new();
        let blocks = short_blocks(5);
        for budget in [-100.0, 0.0, LINE_HEIGHT - 1.0] {
            let fit = find_break(&fake, &options(), Chrome::None, &blocks, 0, budget)
                .await
                .unwrap();
            assert_eq!(fit.count, 1, "budget {budget}");
            assert!(fit.overflows);
        }
    }

    #[tokio::test]
    async fn test_monotonic_in_budget() {
        let fake = FakeRenderer::new();
        let blocks = split_paragraphs(
            "short\n\n---\n\nthis one is a little bit longer than thirty characters\n\nx\n\n\
             yet another paragraph that wraps over two lines at least\n\nend",
        );
        let mut previous = 0;
        for budget in (0..1200).step_by(25) {
            let fit = find_break(&fake, &options(), Chrome::None, &blocks, 0, budget as f64)
                .await
                .unwrap();
            assert!(fit.count >= previous, "count dropped at budget {budget}");
            previous = fit.count;
        }
        assert_eq!(previous, blocks.len());
    }

    #[tokio::test]
    async fn test_logarithmic_probe_count() {
        let fake = FakeRenderer::new();
        let blocks = short_blocks(64);
        let fit = find_break(&fake, &options(), Chrome::None, &blocks, 0, height_of(33))
            .await
            .unwrap();
        assert_eq!(fit.count, 33);
        assert!(fit.probes <= 7, "{} probes", fit.probes);
        assert_eq!(fake.measure_count(), fit.probes);
    }
}
