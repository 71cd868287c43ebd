//! Paginator — turns cleaned text into an ordered sequence of pages.
//!
//! # Flow
//! 1. normalize → split into paragraph blocks (empty input → no pages, no renders)
//! 2. measure first-page and later-page budgets once
//! 3. break search from the cursor, emit a page, advance, repeat
//!
//! A paragraph that overflows an empty page on its own is re-cut into sentences
//! in place and the same page is searched again. A single sentence that still
//! overflows is placed alone (soft-fail).

use serde::Serialize;
use tracing::{info, warn};

use crate::layout::measurer::{measure_budgets, PageBudgets};
use crate::layout::options::RenderOptions;
use crate::layout::page_break::find_break;
use crate::layout::text::{self, Block};
use crate::renderer::{LayoutRenderer, RenderError};

/// One card's worth of content. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub page_number: usize,
    pub is_first: bool,
    pub is_last: bool,
    pub blocks: Vec<Block>,
    pub content: String,
}

impl Page {
    fn new(page_number: usize, blocks: Vec<Block>) -> Self {
        let content = text::join_blocks(&blocks);
        Self {
            page_number,
            is_first: page_number == 1,
            is_last: false,
            blocks,
            content,
        }
    }
}

/// Numbers groups of blocks into pages and flags the final one.
pub(crate) fn assemble_pages(groups: Vec<Vec<Block>>) -> Vec<Page> {
    let mut pages: Vec<Page> = groups
        .into_iter()
        .enumerate()
        .map(|(i, blocks)| Page::new(i + 1, blocks))
        .collect();
    if let Some(last) = pages.last_mut() {
        last.is_last = true;
    }
    pages
}

/// Prepares the block list for a text: normalization plus paragraph split.
pub fn prepare_blocks(raw: &str) -> Vec<Block> {
    text::split_paragraphs(&text::normalize(raw))
}

/// Measurement-driven pagination.
pub async fn paginate(
    renderer: &dyn LayoutRenderer,
    raw: &str,
    options: &RenderOptions,
    safety_margin: f64,
) -> Result<Vec<Page>, RenderError> {
    let mut blocks = prepare_blocks(raw);
    if blocks.is_empty() {
        return Ok(Vec::new());
    }

    let budgets = measure_budgets(renderer, options, safety_margin).await?;
    let groups = break_into_groups(renderer, options, &mut blocks, budgets).await?;
    let pages = assemble_pages(groups);

    info!(
        pages = pages.len(),
        blocks = blocks.len(),
        theme = options.theme.id.as_str(),
        "Pagination complete"
    );
    Ok(pages)
}

async fn break_into_groups(
    renderer: &dyn LayoutRenderer,
    options: &RenderOptions,
    blocks: &mut Vec<Block>,
    budgets: PageBudgets,
) -> Result<Vec<Vec<Block>>, RenderError> {
    let mut groups: Vec<Vec<Block>> = Vec::new();
    let mut cursor = 0usize;

    while cursor < blocks.len() {
        let is_first = groups.is_empty();
        let chrome = options.chrome(is_first);
        let budget = budgets.for_page(is_first);
        let fit = find_break(renderer, options, chrome, blocks, cursor, budget).await?;

        if fit.overflows {
            let sentences = text::sentence_blocks(&blocks[cursor]);
            if sentences.len() > 1 {
                info!(
                    page = groups.len() + 1,
                    sentences = sentences.len(),
                    "Paragraph taller than a page; splitting into sentences"
                );
                blocks.splice(cursor..=cursor, sentences);
                continue;
            }
            warn!(
                page = groups.len() + 1,
                budget, "Block taller than a page; placing it alone"
            );
        }

        groups.push(blocks[cursor..cursor + fit.count].to_vec());
        cursor += fit.count;
    }
    Ok(groups)
}
