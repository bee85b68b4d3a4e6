//! Style lookup: every numbered block maps to one rendered node with fully
//! resolved attributes taken from the [`RuleSet`].

use crate::block::Span;
use crate::config::{RuleSet, pt_to_twips};
use crate::numbering::{NumberedBlock, NumberedListItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSpacing {
    /// Exact line height in twips.
    Exact(u32),
    /// Whatever the consuming application uses by default.
    Auto,
}

/// Paragraph-level attributes. Lengths are in twips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphStyle {
    pub alignment: Alignment,
    pub left_indent: u32,
    pub first_line_indent: u32,
    pub space_before: u32,
    pub space_after: u32,
    pub line_spacing: LineSpacing,
    /// Outline level for headings, used for the built-in heading styles.
    pub heading_level: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStyle {
    pub east_asia_font: String,
    pub latin_font: String,
    /// Size in points.
    pub size: u32,
    pub bold: bool,
    /// Hex RGB without the leading `#`.
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRun {
    pub text: String,
    pub style: RunStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedParagraph {
    pub style: ParagraphStyle,
    pub runs: Vec<RenderedRun>,
}

impl RenderedParagraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// Table as a row/cell matrix; each cell holds one paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub rows: Vec<Vec<RenderedParagraph>>,
}

impl RenderedTable {
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedNode {
    Paragraph(RenderedParagraph),
    Table(RenderedTable),
}

/// Render numbered blocks in order, one node per block.
pub fn render(blocks: &[NumberedBlock], rules: &RuleSet) -> Vec<RenderedNode> {
    let nodes: Vec<RenderedNode> = blocks.iter().map(|block| render_block(block, rules)).collect();
    tracing::debug!(nodes = nodes.len(), "rendered blocks");
    nodes
}

pub fn render_block(block: &NumberedBlock, rules: &RuleSet) -> RenderedNode {
    match block {
        NumberedBlock::Heading { level, content } => {
            RenderedNode::Paragraph(render_heading(*level, content, rules))
        }
        NumberedBlock::Paragraph { content } => RenderedNode::Paragraph(RenderedParagraph {
            style: first_line_style(rules),
            runs: body_runs(content, rules),
        }),
        NumberedBlock::ListItem(item) => RenderedNode::Paragraph(render_list_item(item, rules)),
        NumberedBlock::Table { rows } => RenderedNode::Table(render_table(rows, rules)),
    }
}

fn render_heading(level: u8, content: &[Span], rules: &RuleSet) -> RenderedParagraph {
    let alignment = if level == 1 {
        Alignment::Center
    } else {
        Alignment::Left
    };
    let run_style = RunStyle {
        east_asia_font: rules.fonts.heading.clone(),
        latin_font: rules.fonts.heading.clone(),
        size: rules.sizes.for_heading(level),
        bold: true,
        color: rules.color.text.clone(),
    };

    RenderedParagraph {
        style: ParagraphStyle {
            heading_level: Some(level),
            ..fixed_style(alignment, 0, 0, rules)
        },
        runs: content
            .iter()
            .map(|span| RenderedRun {
                text: span.text.clone(),
                style: run_style.clone(),
            })
            .collect(),
    }
}

fn render_list_item(item: &NumberedListItem, rules: &RuleSet) -> RenderedParagraph {
    if item.is_flat() {
        return RenderedParagraph {
            style: first_line_style(rules),
            runs: body_runs(&item.content, rules),
        };
    }

    let style = fixed_style(Alignment::Left, rules.indent.level_twips(item.depth), 0, rules);
    let mut runs = Vec::with_capacity(item.content.len() + 1);
    if let Some(label) = item.label() {
        runs.push(RenderedRun {
            text: format!("{label} "),
            style: body_run_style(false, rules),
        });
    }
    runs.extend(body_runs(&item.content, rules));

    RenderedParagraph { style, runs }
}

fn render_table(rows: &[Vec<Vec<Span>>], rules: &RuleSet) -> RenderedTable {
    let cell_style = ParagraphStyle {
        alignment: Alignment::Left,
        left_indent: 0,
        first_line_indent: 0,
        space_before: 0,
        space_after: 0,
        line_spacing: LineSpacing::Auto,
        heading_level: None,
    };

    RenderedTable {
        rows: rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| RenderedParagraph {
                        style: cell_style.clone(),
                        runs: body_runs(cell, rules),
                    })
                    .collect()
            })
            .collect(),
    }
}

/// Body paragraph: left aligned, first line indented by two characters.
fn first_line_style(rules: &RuleSet) -> ParagraphStyle {
    fixed_style(Alignment::Left, 0, rules.indent.first_line_twips(), rules)
}

fn fixed_style(
    alignment: Alignment,
    left_indent: u32,
    first_line_indent: u32,
    rules: &RuleSet,
) -> ParagraphStyle {
    ParagraphStyle {
        alignment,
        left_indent,
        first_line_indent,
        space_before: pt_to_twips(rules.spacing.before),
        space_after: pt_to_twips(rules.spacing.after),
        line_spacing: LineSpacing::Exact(pt_to_twips(rules.spacing.line_exact)),
        heading_level: None,
    }
}

fn body_run_style(bold: bool, rules: &RuleSet) -> RunStyle {
    RunStyle {
        east_asia_font: rules.fonts.body_east_asia.clone(),
        latin_font: rules.fonts.body_latin.clone(),
        size: rules.sizes.body,
        bold,
        color: rules.color.text.clone(),
    }
}

fn body_runs(spans: &[Span], rules: &RuleSet) -> Vec<RenderedRun> {
    spans
        .iter()
        .map(|span| RenderedRun {
            text: span.text.clone(),
            style: body_run_style(span.is_bold(), rules),
        })
        .collect()
}
