//! Packaging of rendered nodes into a WordprocessingML (`.docx`) archive.

use std::borrow::Cow;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::config::RuleSet;
use crate::error::{Error, Result};
use crate::style::{
    Alignment, LineSpacing, ParagraphStyle, RenderedNode, RenderedParagraph, RenderedRun,
    RenderedTable,
};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const APP_PROPERTIES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>mddocx</Application></Properties>"#;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Serialize rendered nodes into `.docx` bytes.
pub fn to_bytes(nodes: &[RenderedNode], rules: &RuleSet) -> Result<Vec<u8>> {
    let parts: [(&str, Vec<u8>); 7] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec()),
        ("_rels/.rels", ROOT_RELS.as_bytes().to_vec()),
        ("docProps/core.xml", core_properties(document_title(nodes).as_deref())?),
        ("docProps/app.xml", APP_PROPERTIES.as_bytes().to_vec()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes().to_vec()),
        ("word/styles.xml", styles(rules)?),
        ("word/document.xml", document(nodes, rules)?),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    // Fixed timestamps keep output deterministic
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    for (name, bytes) in parts {
        zip.start_file(name, options)?;
        zip.write_all(&bytes)?;
    }

    let bytes = zip.finish()?.into_inner();
    tracing::debug!(bytes = bytes.len(), nodes = nodes.len(), "packaged document");
    Ok(bytes)
}

/// Serialize and write atomically to `path`.
///
/// The archive goes to a temporary file next to `path` which is then renamed
/// into place, so a failure never leaves a partial document behind.
pub fn write_file(nodes: &[RenderedNode], rules: &RuleSet, path: &Path) -> Result<PathBuf> {
    let bytes = to_bytes(nodes, rules)?;
    let write_err = |source| Error::WriteOutput {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_err)?;

    let mut builder = tempfile::Builder::new();
    // Same mode a plain create would get, still masked by the umask
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir).map_err(write_err)?;
    tmp.write_all(&bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    tracing::info!(path = %path.display(), "wrote document");
    Ok(path.to_path_buf())
}

fn document_title(nodes: &[RenderedNode]) -> Option<String> {
    nodes.iter().find_map(|node| match node {
        RenderedNode::Paragraph(p) if p.style.heading_level == Some(1) => Some(p.text()),
        _ => None,
    })
}

/// Thin wrapper over the quick-xml writer for attribute-heavy markup.
struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    fn new() -> Result<Self> {
        let mut inner = Writer::new(Vec::new());
        inner.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(Self { inner })
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let tag = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.inner.write_event(Event::Start(tag))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let tag = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.inner.write_event(Event::Empty(tag))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.inner.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        let text = xml_safe(text);
        self.inner.write_event(Event::Text(BytesText::new(&text)))?;
        Ok(())
    }

    fn element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()> {
        self.start(name, attrs)?;
        self.text(text)?;
        self.end(name)
    }

    fn finish(self) -> Vec<u8> {
        self.inner.into_inner()
    }
}

/// Drop characters XML 1.0 cannot represent, even escaped.
fn xml_safe(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&ch| is_xml_char(ch)).collect())
    }
}

fn is_xml_char(ch: char) -> bool {
    matches!(ch,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

fn document(nodes: &[RenderedNode], rules: &RuleSet) -> Result<Vec<u8>> {
    let mut w = XmlWriter::new()?;
    w.start("w:document", &[("xmlns:w", W_NS)])?;
    w.start("w:body", &[])?;

    for node in nodes {
        match node {
            RenderedNode::Paragraph(p) => write_paragraph(&mut w, p)?,
            RenderedNode::Table(table) => write_table(&mut w, table, rules)?,
        }
    }

    // A body must not end on a table
    if matches!(nodes.last(), Some(RenderedNode::Table(_))) {
        w.empty("w:p", &[])?;
    }

    write_section(&mut w, rules)?;
    w.end("w:body")?;
    w.end("w:document")?;
    Ok(w.finish())
}

fn write_paragraph(w: &mut XmlWriter, p: &RenderedParagraph) -> Result<()> {
    w.start("w:p", &[])?;
    write_paragraph_properties(w, &p.style)?;
    for run in &p.runs {
        write_run(w, run)?;
    }
    w.end("w:p")
}

fn write_paragraph_properties(w: &mut XmlWriter, style: &ParagraphStyle) -> Result<()> {
    w.start("w:pPr", &[])?;

    if let Some(level) = style.heading_level {
        w.empty("w:pStyle", &[("w:val", &format!("Heading{level}"))])?;
    }

    let before = style.space_before.to_string();
    let after = style.space_after.to_string();
    match style.line_spacing {
        LineSpacing::Exact(line) => w.empty(
            "w:spacing",
            &[
                ("w:before", &before),
                ("w:after", &after),
                ("w:line", &line.to_string()),
                ("w:lineRule", "exact"),
            ],
        )?,
        LineSpacing::Auto => w.empty("w:spacing", &[("w:before", &before), ("w:after", &after)])?,
    }

    w.empty(
        "w:ind",
        &[
            ("w:left", &style.left_indent.to_string()),
            ("w:firstLine", &style.first_line_indent.to_string()),
        ],
    )?;

    let jc = match style.alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
    };
    w.empty("w:jc", &[("w:val", jc)])?;

    w.end("w:pPr")
}

fn write_run(w: &mut XmlWriter, run: &RenderedRun) -> Result<()> {
    let style = &run.style;
    let half_points = (style.size * 2).to_string();

    w.start("w:r", &[])?;
    w.start("w:rPr", &[])?;
    w.empty(
        "w:rFonts",
        &[
            ("w:ascii", &style.latin_font),
            ("w:hAnsi", &style.latin_font),
            ("w:eastAsia", &style.east_asia_font),
            ("w:cs", &style.latin_font),
        ],
    )?;
    if style.bold {
        w.empty("w:b", &[])?;
        w.empty("w:bCs", &[])?;
    } else {
        w.empty("w:b", &[("w:val", "0")])?;
    }
    w.empty("w:color", &[("w:val", &style.color)])?;
    w.empty("w:sz", &[("w:val", &half_points)])?;
    w.empty("w:szCs", &[("w:val", &half_points)])?;
    w.end("w:rPr")?;
    w.element("w:t", &[("xml:space", "preserve")], &run.text)?;
    w.end("w:r")
}

fn write_table(w: &mut XmlWriter, table: &RenderedTable, rules: &RuleSet) -> Result<()> {
    if table.rows.is_empty() {
        return Err(Error::InvalidTable("table has no rows".to_string()));
    }
    if let Some(idx) = table.rows.iter().position(Vec::is_empty) {
        return Err(Error::InvalidTable(format!("row {} has no cells", idx + 1)));
    }

    let columns = table.column_count();
    let col_width = (rules.page.text_width() / columns as u32).to_string();

    w.start("w:tbl", &[])?;
    w.start("w:tblPr", &[])?;
    w.empty("w:tblW", &[("w:w", "0"), ("w:type", "auto")])?;
    w.start("w:tblBorders", &[])?;
    for edge in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
        w.empty(
            edge,
            &[
                ("w:val", "single"),
                ("w:sz", "4"),
                ("w:space", "0"),
                ("w:color", "auto"),
            ],
        )?;
    }
    w.end("w:tblBorders")?;
    w.end("w:tblPr")?;

    w.start("w:tblGrid", &[])?;
    for _ in 0..columns {
        w.empty("w:gridCol", &[("w:w", &col_width)])?;
    }
    w.end("w:tblGrid")?;

    for row in &table.rows {
        w.start("w:tr", &[])?;
        for idx in 0..columns {
            w.start("w:tc", &[])?;
            w.start("w:tcPr", &[])?;
            w.empty("w:tcW", &[("w:w", &col_width), ("w:type", "dxa")])?;
            w.end("w:tcPr")?;
            // Every cell needs at least one paragraph
            match row.get(idx) {
                Some(cell) => write_paragraph(w, cell)?,
                None => w.empty("w:p", &[])?,
            }
            w.end("w:tc")?;
        }
        w.end("w:tr")?;
    }

    w.end("w:tbl")
}

fn write_section(w: &mut XmlWriter, rules: &RuleSet) -> Result<()> {
    let page = &rules.page;
    w.start("w:sectPr", &[])?;
    w.empty(
        "w:pgSz",
        &[
            ("w:w", &page.width.to_string()),
            ("w:h", &page.height.to_string()),
        ],
    )?;
    w.empty(
        "w:pgMar",
        &[
            ("w:top", &page.margin_top.to_string()),
            ("w:right", &page.margin_right.to_string()),
            ("w:bottom", &page.margin_bottom.to_string()),
            ("w:left", &page.margin_left.to_string()),
            ("w:header", "851"),
            ("w:footer", "992"),
            ("w:gutter", "0"),
        ],
    )?;
    w.end("w:sectPr")
}

fn styles(rules: &RuleSet) -> Result<Vec<u8>> {
    let body_size = (rules.sizes.body * 2).to_string();
    let fonts = &rules.fonts;

    let mut w = XmlWriter::new()?;
    w.start("w:styles", &[("xmlns:w", W_NS)])?;

    w.start("w:docDefaults", &[])?;
    w.start("w:rPrDefault", &[])?;
    w.start("w:rPr", &[])?;
    w.empty(
        "w:rFonts",
        &[
            ("w:ascii", &fonts.body_latin),
            ("w:hAnsi", &fonts.body_latin),
            ("w:eastAsia", &fonts.body_east_asia),
            ("w:cs", &fonts.body_latin),
        ],
    )?;
    w.empty("w:sz", &[("w:val", &body_size)])?;
    w.empty("w:szCs", &[("w:val", &body_size)])?;
    w.empty("w:lang", &[("w:val", "en-US"), ("w:eastAsia", "zh-CN")])?;
    w.end("w:rPr")?;
    w.end("w:rPrDefault")?;
    w.empty("w:pPrDefault", &[])?;
    w.end("w:docDefaults")?;

    w.start(
        "w:style",
        &[("w:type", "paragraph"), ("w:default", "1"), ("w:styleId", "Normal")],
    )?;
    w.empty("w:name", &[("w:val", "Normal")])?;
    w.empty("w:qFormat", &[])?;
    w.end("w:style")?;

    for level in 1..=3u8 {
        let size = (rules.sizes.for_heading(level) * 2).to_string();
        w.start(
            "w:style",
            &[("w:type", "paragraph"), ("w:styleId", &format!("Heading{level}"))],
        )?;
        w.empty("w:name", &[("w:val", &format!("heading {level}"))])?;
        w.empty("w:basedOn", &[("w:val", "Normal")])?;
        w.empty("w:next", &[("w:val", "Normal")])?;
        w.empty("w:qFormat", &[])?;
        w.start("w:pPr", &[])?;
        w.empty("w:keepNext", &[])?;
        w.empty("w:outlineLvl", &[("w:val", &(level - 1).to_string())])?;
        w.end("w:pPr")?;
        w.start("w:rPr", &[])?;
        w.empty(
            "w:rFonts",
            &[
                ("w:ascii", &fonts.heading),
                ("w:hAnsi", &fonts.heading),
                ("w:eastAsia", &fonts.heading),
            ],
        )?;
        w.empty("w:b", &[])?;
        w.empty("w:sz", &[("w:val", &size)])?;
        w.end("w:rPr")?;
        w.end("w:style")?;
    }

    w.end("w:styles")?;
    Ok(w.finish())
}

fn core_properties(title: Option<&str>) -> Result<Vec<u8>> {
    let mut w = XmlWriter::new()?;
    w.start(
        "cp:coreProperties",
        &[
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    if let Some(title) = title {
        w.element("dc:title", &[], title)?;
    }
    w.element("dc:creator", &[], "mddocx")?;
    w.end("cp:coreProperties")?;
    Ok(w.finish())
}
