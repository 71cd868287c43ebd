//! Page HTML — the one place page markup is produced.
//!
//! The measurer, the break search, and the compositor all build their documents
//! here. A probe and the final render of the same page differ only in the footer
//! numbers, which live in a fixed-height strip and never move the content block.

use std::fmt::Write as _;

use crate::layout::options::{Chrome, RenderOptions};
use crate::layout::text::Block;

/// Element whose height is the space left for body content.
pub const SLOT_SELECTOR: &str = "#content-slot";
/// Element wrapping the body content actually placed on a page.
pub const CONTENT_SELECTOR: &str = "#content-body";

/// Page-number strip shown at the bottom of every card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    pub page_number: usize,
    pub total: usize,
}

impl Footer {
    /// Footer used while probing, before the page count is known.
    pub fn placeholder() -> Self {
        Self {
            page_number: 1,
            total: 1,
        }
    }
}

/// Skeleton with chrome and footer around an empty content block that grows to
/// fill whatever height remains.
pub fn skeleton(options: &RenderOptions, chrome: Chrome<'_>) -> String {
    document(
        options,
        chrome,
        r#"<main class="content" id="content-slot"></main>"#,
        Footer::placeholder(),
    )
}

/// Full page with `blocks` as body content.
pub fn page(options: &RenderOptions, chrome: Chrome<'_>, blocks: &[Block], footer: Footer) -> String {
    let main = format!(
        r#"<main class="content"><div id="content-body" class="content-body">{}</div></main>"#,
        blocks_html(blocks)
    );
    document(options, chrome, &main, footer)
}

fn document(options: &RenderOptions, chrome: Chrome<'_>, main: &str, footer: Footer) -> String {
    let mut html = String::with_capacity(4096 + main.len());
    let _ = write!(
        html,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><style>{}</style></head>\
         <body><div class=\"page\">",
        options.stylesheet()
    );

    match chrome {
        Chrome::None => {}
        Chrome::Title(title) => {
            let _ = write!(html, "<h1 class=\"title\">{}</h1>", escape(title));
        }
        Chrome::Cover { title, image } => {
            let _ = write!(
                html,
                "<header class=\"cover\" style=\"background-image:url('{}')\">",
                escape(&image.data_uri())
            );
            if let Some(title) = title {
                let _ = write!(html, "<h1 class=\"title\">{}</h1>", escape(title));
            }
            html.push_str("</header>");
        }
    }

    html.push_str(main);
    let _ = write!(
        html,
        "<footer class=\"footer\">{} / {}</footer></div></body></html>",
        footer.page_number, footer.total
    );
    html
}

/// Renders blocks as paragraphs and rules. Sentence continuations are merged
/// into the paragraph they belong to.
pub fn blocks_html(blocks: &[Block]) -> String {
    let mut html = String::new();
    let mut open = false;

    for block in blocks {
        if block.is_divider() {
            if open {
                html.push_str("</p>");
                open = false;
            }
            html.push_str("<hr class=\"divider\">");
            continue;
        }
        if open && block.continues {
            html.push_str(&escape(&block.text));
            continue;
        }
        if open {
            html.push_str("</p>");
        }
        html.push_str("<p>");
        html.push_str(&escape(&block.text));
        open = true;
    }
    if open {
        html.push_str("</p>");
    }
    html
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
