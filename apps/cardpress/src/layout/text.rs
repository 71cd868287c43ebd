//! Text segmentation — paragraphs, dividers, and the sentence fallback.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static DIVIDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:-{3,}|\*{3,}|_{3,})\s*$").expect("divider pattern is valid")
});

/// Characters that end a sentence. CJK terminators always break; Latin ones
/// only break before whitespace or end of text, so `3.14` stays whole.
const CJK_TERMINATORS: [char; 4] = ['。', '！', '？', '；'];
const LATIN_TERMINATORS: [char; 3] = ['.', '!', '?'];
/// Closing quotes and brackets that belong to the sentence they follow.
const CLOSERS: [char; 9] = ['”', '’', '」', '』', '）', '】', ')', '"', '\''];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Divider,
}

/// One unit of pagination: a whole paragraph, a sentence run cut from one, or a divider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
    /// Index of the source paragraph in the cleaned input.
    pub paragraph: usize,
    /// True when this block is a later sentence of `paragraph` and joins the
    /// previous block without a paragraph break.
    pub continues: bool,
}

impl Block {
    pub fn is_divider(&self) -> bool {
        self.kind == BlockKind::Divider
    }
}

/// Normalizes line endings, strips trailing whitespace on every line, and collapses
/// runs of blank lines to a single blank line.
pub fn normalize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(unified.len());
    let mut newlines = 0usize;

    for line in unified.split('\n') {
        let line = line.trim_end();
        if line.is_empty() {
            newlines += 1;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if newlines > 1 { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        newlines = 1;
    }
    out
}

pub fn is_divider_line(text: &str) -> bool {
    DIVIDER_RE.is_match(text)
}

/// Splits normalized text into paragraph blocks on blank lines. Empty fragments
/// are discarded; horizontal-rule paragraphs become dividers.
pub fn split_paragraphs(text: &str) -> Vec<Block> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .enumerate()
        .map(|(paragraph, fragment)| Block {
            kind: if is_divider_line(fragment) {
                BlockKind::Divider
            } else {
                BlockKind::Text
            },
            text: fragment.to_string(),
            paragraph,
            continues: false,
        })
        .collect()
}

/// Splits a paragraph into sentences. Consecutive terminators, and any closing
/// quotes or brackets after them, stay with the sentence they end, and trailing whitespace is attached to the preceding
/// sentence so the pieces concatenate back to the input exactly.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        if !is_terminator(chars[i].1) {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < chars.len() && (is_terminator(chars[j].1) || CLOSERS.contains(&chars[j].1)) {
            j += 1;
        }
        let followed_by_space = j == chars.len() || chars[j].1.is_whitespace();
        let run_has_cjk = chars[i..j].iter().any(|(_, c)| CJK_TERMINATORS.contains(c));
        if !run_has_cjk && !followed_by_space {
            i = j;
            continue;
        }
        while j < chars.len() && chars[j].1.is_whitespace() {
            j += 1;
        }

        let end = chars.get(j).map(|(offset, _)| *offset).unwrap_or(text.len());
        sentences.push(text[start..end].to_string());
        start = end;
        i = j;
    }

    if start < text.len() {
        sentences.push(text[start..].to_string());
    }
    sentences
}

fn is_terminator(c: char) -> bool {
    CJK_TERMINATORS.contains(&c) || LATIN_TERMINATORS.contains(&c)
}

/// Breaks a text block into one block per sentence. Dividers and single-sentence
/// blocks come back unchanged.
pub fn sentence_blocks(block: &Block) -> Vec<Block> {
    if block.is_divider() {
        return vec![block.clone()];
    }
    split_sentences(&block.text)
        .into_iter()
        .enumerate()
        .map(|(i, sentence)| Block {
            kind: BlockKind::Text,
            text: sentence,
            paragraph: block.paragraph,
            continues: block.continues || i > 0,
        })
        .collect()
}

/// Joins blocks back into text: paragraphs separated by a blank line, sentence
/// continuations appended directly.
pub fn join_blocks<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> String {
    let mut out = String::new();
    for block in blocks {
        if !out.is_empty() && !block.continues {
            out.push_str("\n\n");
        }
        out.push_str(&block.text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_line_endings_and_blank_runs() {
        let input = "first line  \r\nsecond\r\n\r\n\r\n\r\nthird\r\rfourth\n\n\n";
        assert_eq!(normalize(input), "first line\nsecond\n\nthird\n\nfourth");
    }

    #[test]
    fn test_normalize_whitespace_only_lines_are_blank() {
        assert_eq!(normalize("a\n   \n\t\nb"), "a\n\nb");
        assert_eq!(normalize("   \n\n"), "");
    }

    #[test]
    fn test_split_paragraphs_discards_empty_and_marks_dividers() {
        let blocks = split_paragraphs("Alpha one.\n\n---\n\nBeta two.\n\n***\n\n__\n\n___");
        let kinds: Vec<BlockKind> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Text,
                BlockKind::Divider,
                BlockKind::Text,
                BlockKind::Divider,
                BlockKind::Text,
                BlockKind::Divider,
            ]
        );
        assert_eq!(blocks[4].text, "__");
        assert_eq!(blocks.iter().map(|b| b.paragraph).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_mixed_rule_characters_are_not_dividers() {
        assert!(!is_divider_line("-*-"));
        assert!(is_divider_line("  -----  "));
        assert!(!is_divider_line("--- text"));
    }

    #[test]
    fn test_split_sentences_cjk() {
        let parts = split_sentences("今天天气很好。我们去公园吧！真的吗？？好；");
        assert_eq!(parts, vec!["今天天气很好。", "我们去公园吧！", "真的吗？？", "好；"]);
    }

    #[test]
    fn test_split_sentences_latin_keeps_whitespace_and_decimals() {
        let text = "Pi is 3.14 roughly. Really?! Yes.  Tail without stop";
        let parts = split_sentences(text);
        assert_eq!(
            parts,
            vec!["Pi is 3.14 roughly. ", "Really?! ", "Yes.  ", "Tail without stop"]
        );
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_split_sentences_keeps_closing_quotes() {
        let parts = split_sentences("他说：“好。”然后走了。「真的？」嗯。");
        assert_eq!(parts, vec!["他说：“好。”", "然后走了。", "「真的？」", "嗯。"]);

        let text = "She said \"Stop.\" Then (quietly.) it ended. 'Fine!' Done";
        let parts = split_sentences(text);
        assert_eq!(
            parts,
            vec!["She said \"Stop.\" ", "Then (quietly.) ", "it ended. ", "'Fine!' ", "Done"]
        );
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_sentence_blocks_mark_continuations() {
        let block = Block {
            kind: BlockKind::Text,
            text: "One. Two. Three.".to_string(),
            paragraph: 7,
            continues: false,
        };
        let pieces = sentence_blocks(&block);
        assert_eq!(pieces.len(), 3);
        assert!(!pieces[0].continues);
        assert!(pieces[1].continues && pieces[2].continues);
        assert!(pieces.iter().all(|p| p.paragraph == 7));
        assert_eq!(join_blocks(&pieces), block.text);
    }

    #[test]
    fn test_join_blocks_restores_paragraph_breaks() {
        let text = "A first.\n\n---\n\nB second.";
        let blocks = split_paragraphs(text);
        assert_eq!(join_blocks(&blocks), text);
    }
}
