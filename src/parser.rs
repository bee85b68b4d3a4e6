use std::sync::LazyLock;

use regex::Regex;

use crate::block::{Block, Span};
use crate::inline;

/// Deepest heading level the rule set styles; deeper headings are clamped.
const MAX_HEADING_LEVEL: u8 = 3;

/// Columns of leading whitespace per list nesting level.
const INDENT_UNIT: usize = 2;

/// Columns a tab counts for when measuring indentation.
const TAB_WIDTH: usize = 4;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*$").expect("valid heading regex"));

static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*)(?:[-*+]|\d+[.)])\s+(?P<text>.+?)\s*$")
        .expect("valid list item regex")
});

static SEPARATOR_CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:?-{3,}:?$").expect("valid separator regex"));

/// Parse markdown text into a list of blocks, in document order.
///
/// Never fails: anything not recognized as a heading, table or list item
/// becomes a paragraph.
pub fn parse(markdown: &str) -> Vec<Block> {
    let normalized = markdown.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();
    let mut blocks = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        if let Some(caps) = HEADING_RE.captures(line) {
            let level = u8::try_from(caps[1].len())
                .unwrap_or(MAX_HEADING_LEVEL)
                .min(MAX_HEADING_LEVEL);
            let content = inline::resolve(caps[2].trim());
            if !content.is_empty() {
                blocks.push(Block::Heading { level, content });
            }
            i += 1;
            continue;
        }

        if is_table_start(&lines, i) {
            let (table, next) = parse_table(&lines, i);
            blocks.push(table);
            i = next;
            continue;
        }

        if let Some(caps) = LIST_ITEM_RE.captures(line) {
            let depth = 1 + indent_width(&caps["indent"]) / INDENT_UNIT;
            let content = inline::resolve(caps["text"].trim());
            blocks.push(Block::ListItem { depth, content });
            i += 1;
            continue;
        }

        let content = inline::resolve(line.trim());
        if !content.is_empty() {
            blocks.push(Block::Paragraph { content });
        }
        i += 1;
    }

    tracing::debug!(blocks = blocks.len(), lines = lines.len(), "parsed markdown");
    blocks
}

fn indent_width(indent: &str) -> usize {
    indent
        .chars()
        .map(|ch| if ch == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

fn is_table_start(lines: &[&str], i: usize) -> bool {
    match lines.get(i + 1) {
        Some(next) => looks_like_table_row(lines[i]) && is_table_separator(next),
        None => false,
    }
}

fn looks_like_table_row(line: &str) -> bool {
    line.contains('|') && split_table_row(line).iter().any(|cell| !cell.is_empty())
}

fn is_table_separator(line: &str) -> bool {
    if !line.contains('-') {
        return false;
    }
    split_table_row(line)
        .iter()
        .filter(|cell| !cell.is_empty())
        .all(|cell| SEPARATOR_CELL_RE.is_match(cell))
}

/// Split a pipe-delimited row into trimmed cells, ignoring outer pipes.
fn split_table_row(line: &str) -> Vec<&str> {
    let s = line.trim();
    let s = s.strip_prefix('|').unwrap_or(s);
    let s = s.strip_suffix('|').unwrap_or(s);
    s.split('|').map(str::trim).collect()
}

/// Parse a table starting at the header row; returns the block and the index
/// of the first line after it.
fn parse_table(lines: &[&str], start: usize) -> (Block, usize) {
    let header: Vec<Vec<Span>> = split_table_row(lines[start])
        .into_iter()
        .map(inline::resolve)
        .collect();
    let col_count = header.len();
    let mut rows = vec![header];

    // Skip the separator row
    let mut i = start + 2;
    while i < lines.len() {
        let line = lines[i];
        if line.trim().is_empty()
            || !looks_like_table_row(line)
            || LIST_ITEM_RE.is_match(line)
            || HEADING_RE.is_match(line)
        {
            break;
        }

        let mut cells: Vec<Vec<Span>> = split_table_row(line)
            .into_iter()
            .map(inline::resolve)
            .collect();
        cells.resize_with(col_count, Vec::new);
        rows.push(cells);
        i += 1;
    }

    (Block::Table { rows }, i)
}
