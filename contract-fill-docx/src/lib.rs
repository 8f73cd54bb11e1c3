//! Fills `{{field}}` placeholders inside `.docx` templates.
//!
//! A `.docx` file is a zip archive of XML parts. [`DocxFiller`] rewrites the main
//! document part plus every header and footer part, and copies all other entries
//! byte for byte.
//!
//! Word is free to split the text of a paragraph over several runs (`<w:r>`), so
//! `{{甲方名称}}` may arrive as `{{甲方` and `名称}}`. Placeholders are therefore
//! matched against the joined text of each paragraph. A paragraph holding a
//! placeholder is written back as a single text node in its first run, which
//! keeps that run's formatting; the remaining text nodes of the paragraph are
//! emptied. Paragraphs without placeholders are left byte for byte.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use contract_fill::{DocumentFiller, FillError, FillResult, RenderedFields};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tempfile::NamedTempFile;
use tracing::debug;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("Invalid placeholder regex"));

/// Paragraph boundaries and text nodes, the only markup the filler looks at.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<w:p(?:\s[^>]*)?>|</w:p>|<w:t(?:\s[^>/]*)?>([^<]*)</w:t>")
        .expect("Invalid document token regex")
});

/// Outcome of filling one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilledDocument {
    /// Where the document was written.
    pub path: PathBuf,
    /// Number of placeholder occurrences replaced with a value.
    pub replaced: usize,
    /// Placeholders found in the template with no value in the field map.
    /// They are cleared in the output.
    pub unmatched: Vec<String>,
}

/// [`DocumentFiller`] writing a filled `.docx` to a fixed output path.
#[derive(Debug, Clone)]
pub struct DocxFiller {
    templates_dir: PathBuf,
    output: PathBuf,
    template_override: Option<PathBuf>,
}

impl DocxFiller {
    /// Templates named by a definition are looked up under `templates_dir`.
    pub fn new(templates_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            output: output.into(),
            template_override: None,
        }
    }

    /// Use `path` instead of the template named by the definition.
    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_override = Some(path.into());
        self
    }

    pub fn template_path(&self, template: &str) -> PathBuf {
        match &self.template_override {
            Some(path) => path.clone(),
            None => self.templates_dir.join(template),
        }
    }
}

impl DocumentFiller for DocxFiller {
    type Output = FilledDocument;

    fn placeholders(&self, template: &str) -> FillResult<BTreeSet<String>> {
        let source = self.template_path(template);
        let bytes = fs::read(&source).map_err(|e| io_error(&source, e))?;
        placeholders_in_archive(&bytes).map_err(|e| template_error(&source, e))
    }

    fn fill(&self, template: &str, fields: &RenderedFields) -> FillResult<FilledDocument> {
        let source = self.template_path(template);
        let bytes = fs::read(&source).map_err(|e| io_error(&source, e))?;

        let (filled, substitution) =
            fill_archive(&bytes, fields).map_err(|e| template_error(&source, e))?;
        write_atomically(&self.output, &filled)?;

        let unmatched: Vec<String> = substitution.unmatched.into_iter().collect();
        debug!(
            template = %source.display(),
            replaced = substitution.replaced,
            ?unmatched,
            "filled template"
        );
        Ok(FilledDocument {
            path: self.output.clone(),
            replaced: substitution.replaced,
            unmatched,
        })
    }
}

/// Placeholder bookkeeping across all rewritten parts.
#[derive(Debug, Default)]
pub struct Substitution {
    pub replaced: usize,
    pub unmatched: BTreeSet<String>,
}

/// Rewrite an in-memory `.docx`, returning the new archive bytes.
pub fn fill_archive(
    template: &[u8],
    fields: &RenderedFields,
) -> Result<(Vec<u8>, Substitution), ZipError> {
    let mut archive = ZipArchive::new(Cursor::new(template))?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut substitution = Substitution::default();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        if !is_text_part(&name) {
            writer.raw_copy_file(entry)?;
            continue;
        }

        let mut xml = String::new();
        entry.read_to_string(&mut xml)?;
        let rewritten = replace_placeholders(&xml, fields, &mut substitution);
        debug!(part = %name, "rewrote document part");

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        writer.start_file(name, options)?;
        writer.write_all(rewritten.as_bytes())?;
    }

    let bytes = writer.finish()?.into_inner();
    Ok((bytes, substitution))
}

/// Every placeholder name in the text parts of an in-memory `.docx`.
pub fn placeholders_in_archive(template: &[u8]) -> Result<BTreeSet<String>, ZipError> {
    let mut archive = ZipArchive::new(Cursor::new(template))?;
    let mut names = BTreeSet::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !is_text_part(entry.name()) {
            continue;
        }
        let mut xml = String::new();
        entry.read_to_string(&mut xml)?;
        names.extend(collect_placeholders(&xml));
    }
    Ok(names)
}

fn is_text_part(name: &str) -> bool {
    name == "word/document.xml"
        || ((name.starts_with("word/header") || name.starts_with("word/footer"))
            && name.ends_with(".xml"))
}

/// One `<w:t>` element: its byte span in the part and its unescaped text.
#[derive(Debug)]
struct TextNode {
    span: Range<usize>,
    text: String,
}

/// Text nodes grouped by the innermost paragraph holding them, in document
/// order. A text node outside any paragraph forms a group of its own.
fn paragraphs(xml: &str) -> Vec<Vec<TextNode>> {
    let mut closed = Vec::new();
    let mut open: Vec<Vec<TextNode>> = Vec::new();

    for caps in TOKEN.captures_iter(xml) {
        let token = match caps.get(0) {
            Some(token) => token,
            None => continue,
        };
        match caps.get(1) {
            Some(text) => {
                let node = TextNode {
                    span: token.range(),
                    text: unescape_xml(text.as_str()),
                };
                match open.last_mut() {
                    Some(paragraph) => paragraph.push(node),
                    None => closed.push(vec![node]),
                }
            }
            None if token.as_str() == "</w:p>" => {
                if let Some(paragraph) = open.pop() {
                    closed.push(paragraph);
                }
            }
            None if token.as_str().ends_with("/>") => {}
            None => open.push(Vec::new()),
        }
    }

    closed.extend(open);
    closed.retain(|nodes| !nodes.is_empty());
    closed.sort_by_key(|nodes| nodes[0].span.start);
    closed
}

fn joined_text(nodes: &[TextNode]) -> String {
    nodes.iter().map(|node| node.text.as_str()).collect()
}

fn placeholder_name<'a>(caps: &'a Captures<'_>) -> Option<&'a str> {
    caps.get(1)
        .map(|m| m.as_str().trim())
        .filter(|name| !name.is_empty())
}

/// Placeholder names in one XML part, runs of a paragraph joined.
pub fn collect_placeholders(xml: &str) -> BTreeSet<String> {
    paragraphs(xml)
        .iter()
        .flat_map(|nodes| {
            let text = joined_text(nodes);
            PLACEHOLDER
                .captures_iter(&text)
                .filter_map(|caps| placeholder_name(&caps).map(str::to_string))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Replace every `{{name}}` in `xml` with the value of `name`.
///
/// Placeholders without a value are cleared and recorded in `substitution`.
pub fn replace_placeholders(
    xml: &str,
    fields: &RenderedFields,
    substitution: &mut Substitution,
) -> String {
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();

    for nodes in paragraphs(xml) {
        let text = joined_text(&nodes);
        if !PLACEHOLDER.is_match(&text) {
            continue;
        }

        let filled = PLACEHOLDER.replace_all(&text, |caps: &Captures<'_>| {
            let name = match placeholder_name(caps) {
                Some(name) => name,
                None => return caps[0].to_string(),
            };
            match fields.get(name) {
                Some(value) => {
                    substitution.replaced += 1;
                    value.clone()
                }
                None => {
                    substitution.unmatched.insert(name.to_string());
                    String::new()
                }
            }
        });
        if filled == text {
            continue;
        }

        for (i, node) in nodes.iter().enumerate() {
            let replacement = if i == 0 {
                format!(r#"<w:t xml:space="preserve">{}</w:t>"#, escape_xml(&filled))
            } else {
                "<w:t/>".to_string()
            };
            edits.push((node.span.clone(), replacement));
        }
    }

    edits.sort_by_key(|(span, _)| span.start);
    let mut out = String::with_capacity(xml.len());
    let mut cursor = 0;
    for (span, replacement) in edits {
        out.push_str(&xml[cursor..span.start]);
        out.push_str(&replacement);
        cursor = span.end;
    }
    out.push_str(&xml[cursor..]);
    out
}

fn unescape_xml(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        let decoded = rest.find(';').and_then(|end| {
            let c = match &rest[1..end] {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                entity => entity
                    .strip_prefix("#x")
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                    .and_then(Result::ok)
                    .and_then(char::from_u32),
            };
            c.map(|c| (c, end + 1))
        });
        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn write_atomically(path: &Path, bytes: &[u8]) -> FillResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| io_error(path, e))?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| io_error(path, e))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| io_error(path, e))?;
    tmp.persist(path).map_err(|e| io_error(path, e.error))?;
    Ok(())
}

fn template_error(path: &Path, e: ZipError) -> FillError {
    FillError::Template {
        template: path.display().to_string(),
        message: e.to_string(),
    }
}

fn io_error(path: &Path, source: io::Error) -> FillError {
    FillError::Io {
        path: path.to_path_buf(),
        source,
    }
}
