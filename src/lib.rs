mod block;
mod config;
mod docx;
mod error;
mod inline;
mod numbering;
mod parser;
mod style;

pub use block::{Block, Span, SpanKind, visible_text};
pub use config::RuleSet;
pub use error::{Error, Result};
pub use numbering::{ListNumbering, NumberedBlock, NumberedListItem};
pub use style::{
    Alignment, LineSpacing, ParagraphStyle, RenderedNode, RenderedParagraph, RenderedRun,
    RenderedTable, RunStyle,
};

use std::fs;
use std::path::{Path, PathBuf};

/// Parse markdown text into a vector of blocks.
pub fn parse(markdown: &str) -> Vec<Block> {
    parser::parse(markdown)
}

/// Split a line of text into plain and bold spans.
pub fn resolve_spans(text: &str) -> Vec<Span> {
    inline::resolve(text)
}

/// Assign list paths, restarting at every non-list block.
pub fn number(blocks: Vec<Block>) -> Vec<NumberedBlock> {
    numbering::number(blocks)
}

/// Apply the compiled rule set to numbered blocks.
pub fn render(blocks: &[NumberedBlock]) -> Vec<RenderedNode> {
    style::render(blocks, RuleSet::compiled())
}

/// Convert markdown to styled nodes.
pub fn markdown_to_nodes(markdown: &str) -> Vec<RenderedNode> {
    render(&number(parse(markdown)))
}

/// Convert markdown to `.docx` bytes.
pub fn markdown_to_docx(markdown: &str) -> Result<Vec<u8>> {
    docx::to_bytes(&markdown_to_nodes(markdown), RuleSet::compiled())
}

/// Convert markdown and write the document atomically to `output`.
pub fn write_docx(markdown: &str, output: &Path) -> Result<PathBuf> {
    docx::write_file(&markdown_to_nodes(markdown), RuleSet::compiled(), output)
}

/// Read a markdown file.
pub fn read_markdown(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::ReadInput {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert the markdown file at `input` into a document at `output`.
pub fn convert_file(input: &Path, output: &Path) -> Result<PathBuf> {
    let markdown = read_markdown(input)?;
    tracing::info!(input = %input.display(), "converting");
    write_docx(&markdown, output)
}
