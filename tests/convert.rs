use std::fs;
use std::io::{Cursor, Read};

use mddocx::{Error, NumberedBlock, RenderedNode};
use pretty_assertions::assert_eq;

const SAMPLE: &str = "\
# 研究报告

## 1 背景

本文介绍**核心方法**与实验结果。

- 数据来源
  - 公开数据集
  - 自采数据
- 分析方法
  - 统计检验

一般说明：

- 第一点
- 第二点

| 指标 | 数值 |
|------|-----:|
| 准确率 | **95%** |
| 召回率 | 90% |
";

fn part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut content = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    content
}

fn texts(nodes: &[RenderedNode]) -> Vec<String> {
    nodes
        .iter()
        .map(|node| match node {
            RenderedNode::Paragraph(p) => p.text(),
            RenderedNode::Table(_) => "<table>".to_string(),
        })
        .collect()
}

#[test]
fn sample_document_renders_in_order() {
    let nodes = mddocx::markdown_to_nodes(SAMPLE);
    assert_eq!(
        texts(&nodes),
        vec![
            "研究报告",
            "1 背景",
            "本文介绍核心方法与实验结果。",
            "1. 数据来源",
            "公开数据集",
            "自采数据",
            "2. 分析方法",
            "统计检验",
            "一般说明：",
            "第一点",
            "第二点",
            "<table>",
        ]
    );
}

#[test]
fn flat_list_after_paragraph_is_unnumbered() {
    let numbered = mddocx::number(mddocx::parse(SAMPLE));
    let flat: Vec<bool> = numbered
        .iter()
        .filter_map(|block| match block {
            NumberedBlock::ListItem(item) => Some(item.is_flat()),
            _ => None,
        })
        .collect();
    assert_eq!(flat, vec![false, false, false, false, false, true, true]);
}

#[test]
fn malformed_indentation_is_normalized() {
    let numbered = mddocx::number(mddocx::parse("- a\n        - b"));
    let depths: Vec<usize> = numbered
        .iter()
        .filter_map(|block| match block {
            NumberedBlock::ListItem(item) => Some(item.depth),
            _ => None,
        })
        .collect();
    assert_eq!(depths, vec![1, 2]);
}

#[test]
fn docx_bytes_contain_document_body() {
    let bytes = mddocx::markdown_to_docx(SAMPLE).unwrap();
    let document = part(&bytes, "word/document.xml");
    assert!(document.contains("研究报告"));
    assert!(document.contains("<w:tbl>"));
    assert!(document.contains(r#"<w:t xml:space="preserve">1. </w:t>"#));
    assert!(part(&bytes, "docProps/core.xml").contains("<dc:title>研究报告</dc:title>"));
    assert!(part(&bytes, "word/styles.xml").contains(r#"w:styleId="Heading1""#));
}

#[test]
fn convert_file_writes_docx() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.md");
    let output = dir.path().join("out/report.docx");
    fs::write(&input, SAMPLE).unwrap();

    let written = mddocx::convert_file(&input, &output).unwrap();
    assert_eq!(written, output);

    let bytes = fs::read(&output).unwrap();
    assert!(part(&bytes, "word/document.xml").contains("统计检验"));
}

#[test]
fn missing_input_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.docx");
    let err = mddocx::convert_file(&dir.path().join("missing.md"), &output).unwrap_err();
    assert!(matches!(err, Error::ReadInput { .. }));
    assert!(err.to_string().starts_with("failed to read"));
    assert!(!output.exists());
}

#[test]
fn unwritable_output_is_a_write_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, "not a directory").unwrap();

    let err = mddocx::write_docx("text", &blocker.join("out.docx")).unwrap_err();
    assert!(matches!(err, Error::WriteOutput { .. }));
}

#[test]
fn empty_input_still_produces_a_document() {
    let bytes = mddocx::markdown_to_docx("").unwrap();
    assert!(part(&bytes, "word/document.xml").contains("<w:sectPr>"));
}
