//! Character-count pagination — the fallback when no layout engine is available.
//!
//! Estimates line counts from character widths instead of measuring. CJK glyphs
//! are a full em wide; everything else is counted at `LATIN_WIDTH_EM`. The
//! geometry mirrors the stylesheet constants so estimates land near the real
//! layout, but only the measured paginator guarantees no overflow.

use crate::layout::options::{Chrome, RenderOptions};
use crate::layout::paginator::{assemble_pages, prepare_blocks, Page};
use crate::layout::text::{self, Block};
use crate::layout::theme::{
    cover_height, BODY_LINE_HEIGHT, COVER_GAP, FOOTER_HEIGHT, PAGE_PADDING_TOP, PAGE_PADDING_X,
    PARAGRAPH_GAP, TITLE_GAP, TITLE_LINE_HEIGHT,
};

const LATIN_WIDTH_EM: f64 = 0.55;
const DIVIDER_LINES: f64 = 1.5;

/// Per-page capacity in body lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineBudget {
    pub first: f64,
    pub rest: f64,
    /// Body text width in ems.
    pub line_width_em: f64,
}

pub fn line_budget(options: &RenderOptions) -> LineBudget {
    let dims = options.dimensions();
    let sizes = options.font_scale.sizes();
    let body_px = sizes.body_px as f64;
    let line_px = body_px * BODY_LINE_HEIGHT;

    let content_px = dims.height as f64 - PAGE_PADDING_TOP as f64 - FOOTER_HEIGHT as f64;
    let line_width_em = (dims.width - 2 * PAGE_PADDING_X) as f64 / body_px;

    let chrome_px = match options.chrome(true) {
        Chrome::None => 0.0,
        Chrome::Title(title) => {
            let title_em = (dims.width - 2 * PAGE_PADDING_X) as f64 / sizes.title_px as f64;
            let lines = (weighted_len(title) / title_em).ceil().max(1.0);
            lines * sizes.title_px as f64 * TITLE_LINE_HEIGHT + TITLE_GAP as f64
        }
        Chrome::Cover { .. } => {
            (cover_height(dims) + COVER_GAP) as f64 - PAGE_PADDING_TOP as f64
        }
    };

    LineBudget {
        first: ((content_px - chrome_px) / line_px).max(0.0),
        rest: content_px / line_px,
        line_width_em,
    }
}

/// Width of `text` in ems, CJK-aware.
pub fn weighted_len(text: &str) -> f64 {
    text.chars()
        .filter(|c| !c.is_control())
        .map(|c| if is_wide(c) { 1.0 } else { LATIN_WIDTH_EM })
        .sum()
}

fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6)
}

/// Lines a block occupies, including the gap that precedes it on a page.
fn block_lines(block: &Block, line_width_em: f64, leading: bool) -> f64 {
    let gap = if leading { 0.0 } else { PARAGRAPH_GAP / BODY_LINE_HEIGHT };
    if block.is_divider() {
        return DIVIDER_LINES + gap;
    }
    let body: f64 = block
        .text
        .split('\n')
        .map(|line| (weighted_len(line) / line_width_em).ceil().max(1.0))
        .sum();
    body + gap
}

/// Paginates by estimated line counts. Same page contract as the measured paginator.
pub fn paginate_by_estimate(raw: &str, options: &RenderOptions) -> Vec<Page> {
    let mut blocks = prepare_blocks(raw);
    if blocks.is_empty() {
        return Vec::new();
    }

    let budget = line_budget(options);
    let mut groups: Vec<Vec<Block>> = Vec::new();
    let mut cursor = 0usize;

    while cursor < blocks.len() {
        let capacity = if groups.is_empty() { budget.first } else { budget.rest };

        let mut used = 0.0;
        let mut count = 0usize;
        for (i, block) in blocks[cursor..].iter().enumerate() {
            let joins = i > 0 && block.continues;
            let cost = if joins {
                // Continuation shares the open paragraph; charge only its extra width.
                weighted_len(&block.text) / budget.line_width_em
            } else {
                block_lines(block, budget.line_width_em, i == 0)
            };
            if used + cost > capacity {
                break;
            }
            used += cost;
            count += 1;
        }

        if count == 0 {
            let sentences = text::sentence_blocks(&blocks[cursor]);
            if sentences.len() > 1 {
                blocks.splice(cursor..=cursor, sentences);
                continue;
            }
            count = 1;
        }

        groups.push(blocks[cursor..cursor + count].to_vec());
        cursor += count;
    }

    assemble_pages(groups)
}
