/// Inline formatting of a span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Plain,
    Bold,
}

/// Inline text span with formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub text: String,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: SpanKind::Plain,
            text: text.into(),
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            kind: SpanKind::Bold,
            text: text.into(),
        }
    }

    pub fn is_bold(&self) -> bool {
        self.kind == SpanKind::Bold
    }
}

/// Block-level elements parsed from Markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        /// Always within 1..=3.
        level: u8,
        content: Vec<Span>,
    },
    Paragraph {
        content: Vec<Span>,
    },
    ListItem {
        /// Nesting depth from source indentation, starting at 1.
        depth: usize,
        content: Vec<Span>,
    },
    /// Header row first; the separator row is not kept.
    Table {
        rows: Vec<Vec<Vec<Span>>>,
    },
}

/// Concatenated text of a span list, with formatting markers removed.
pub fn visible_text(spans: &[Span]) -> String {
    spans.iter().map(|span| span.text.as_str()).collect()
}
