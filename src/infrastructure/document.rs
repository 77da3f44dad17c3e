//! # Config Document
//!
//! A lossless view of a YAML config file: the top-level mapping as an ordered list of
//! nodes (entries, comments, blank lines, markers), each holding its exact source text.
//! Rendering an unedited document reproduces the input byte for byte, and editing one
//! entry's value leaves every other node untouched.
//!
//! Only the top level is structured. Nested blocks stay opaque inside the entry that owns them.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("line {line}: {reason}")]
pub struct DocumentError {
    pub line: usize,
    pub reason: String,
}

impl DocumentError {
    fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

/// The value half of a top-level entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueNode {
    /// Text after the `:` on the key line, up to any trailing comment.
    text: String,
    /// Trailing whitespace and comment on the key line.
    comment: String,
    eol: String,
    /// Following lines owned by this value (nested blocks, continuations).
    body: Vec<String>,
}

impl ValueNode {
    /// Replaces the whole value with a double-quoted scalar, keeping the trailing
    /// comment of the key line.
    fn replace(&mut self, value: &str) {
        self.text = format!(" {}", double_quote(value));
        self.body.clear();
    }

    fn write_to(&self, out: &mut String) {
        out.push_str(&self.text);
        out.push_str(&self.comment);
        out.push_str(&self.eol);
        for line in &self.body {
            out.push_str(line);
        }
    }
}

/// A `key: value` pair of the top-level mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Decoded key.
    key: String,
    /// Key text exactly as written, up to and including the `:`.
    key_raw: String,
    value: ValueNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Blank line, comment, directive or document marker, kept verbatim.
    Trivia(String),
    Entry(Entry),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigDocument {
    bom: bool,
    nodes: Vec<Node>,
}

impl ConfigDocument {
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let (bom, text) = match text.strip_prefix('\u{feff}') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let mut nodes: Vec<Node> = Vec::new();
        // Blank and comment lines whose owner is not known until the next content line.
        let mut pending: Vec<String> = Vec::new();

        for (idx, line) in text.split_inclusive('\n').enumerate() {
            let line_no = idx + 1;
            let content = strip_eol(line).0;

            if content.trim().is_empty() || content.trim_start().starts_with('#') {
                pending.push(line.to_string());
                continue;
            }

            if is_marker(content) {
                flush_trivia(&mut nodes, &mut pending);
                nodes.push(Node::Trivia(line.to_string()));
                continue;
            }

            if starts_nested(content) {
                let Some(Node::Entry(entry)) = nodes.last_mut() else {
                    return Err(DocumentError::new(line_no, "top-level node is not a block mapping"));
                };
                entry.value.body.append(&mut pending);
                entry.value.body.push(line.to_string());
                continue;
            }

            flush_trivia(&mut nodes, &mut pending);
            nodes.push(Node::Entry(parse_entry(line, line_no)?));
        }
        flush_trivia(&mut nodes, &mut pending);

        Ok(Self { bom, nodes })
    }

    /// Replaces the value of the first top-level `key` with `value` as a double-quoted scalar.
    /// Returns false when the key is absent; nothing else in the document changes.
    pub fn set_scalar(&mut self, key: &str, value: &str) -> bool {
        for node in &mut self.nodes {
            if let Node::Entry(entry) = node
                && entry.key == key
            {
                entry.value.replace(value);
                return true;
            }
        }
        false
    }
}

impl fmt::Display for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        if self.bom {
            out.push('\u{feff}');
        }
        for node in &self.nodes {
            match node {
                Node::Trivia(text) => out.push_str(text),
                Node::Entry(entry) => {
                    out.push_str(&entry.key_raw);
                    entry.value.write_to(&mut out);
                }
            }
        }
        f.write_str(&out)
    }
}

fn flush_trivia(nodes: &mut Vec<Node>, pending: &mut Vec<String>) {
    nodes.extend(pending.drain(..).map(Node::Trivia));
}

fn strip_eol(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}

fn is_marker(content: &str) -> bool {
    content.starts_with('%') || ["---", "..."].iter().any(|m| {
        content
            .strip_prefix(m)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with([' ', '\t']))
    })
}

/// Indented lines and column-zero sequence items belong to the previous entry.
fn starts_nested(content: &str) -> bool {
    content.starts_with([' ', '\t']) || content == "-" || content.starts_with("- ")
}

fn parse_entry(line: &str, line_no: usize) -> Result<Entry, DocumentError> {
    let (content, eol) = strip_eol(line);

    if content.starts_with(['?', '[', '{', '&', '*', '!', '|', '>']) {
        return Err(DocumentError::new(line_no, "unsupported top-level construct"));
    }

    let (key, key_end) = match content.chars().next() {
        Some(q @ ('"' | '\'')) => {
            let (value, close) = read_quoted(content, q)
                .ok_or_else(|| DocumentError::new(line_no, "unterminated quoted key"))?;
            let after = &content[close..];
            let colon = close + after.len() - after.trim_start().len();
            if !content[colon..].starts_with(':') {
                return Err(DocumentError::new(line_no, "expected ':' after key"));
            }
            (value, colon + 1)
        }
        _ => {
            let colon = find_mapping_colon(content)
                .ok_or_else(|| DocumentError::new(line_no, "expected 'key: value'"))?;
            (content[..colon].trim_end().to_string(), colon + 1)
        }
    };

    let inline = &content[key_end..];
    let split = split_value(inline);

    Ok(Entry {
        key,
        key_raw: content[..key_end].to_string(),
        value: ValueNode {
            text: inline[..split].to_string(),
            comment: inline[split..].to_string(),
            eol: eol.to_string(),
            body: Vec::new(),
        },
    })
}

/// Position of the `:` that ends a plain key: followed by whitespace or end of line.
fn find_mapping_colon(content: &str) -> Option<usize> {
    let bytes = content.as_bytes();
    (0..bytes.len()).find(|&i| {
        bytes[i] == b':' && (i + 1 == bytes.len() || bytes[i + 1] == b' ' || bytes[i + 1] == b'\t')
    })
}

/// Byte offset where the value text after `key:` ends and its trailing comment begins.
fn split_value(inline: &str) -> usize {
    let lead = inline.len() - inline.trim_start().len();
    let rest = &inline[lead..];

    match rest.chars().next() {
        None | Some('#') => 0,
        Some(q @ ('"' | '\'')) => match read_quoted(rest, q) {
            Some((_, close)) => lead + close,
            // Continues on following lines.
            None => inline.len(),
        },
        Some(_) => {
            let end = comment_start(rest).unwrap_or(rest.len());
            lead + rest[..end].trim_end().len()
        }
    }
}

/// A `#` preceded by whitespace starts a comment in plain context.
fn comment_start(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    (1..bytes.len()).find(|&i| bytes[i] == b'#' && (bytes[i - 1] == b' ' || bytes[i - 1] == b'\t'))
}

/// Reads a quoted scalar starting at byte 0. Returns the decoded value and the byte
/// offset just past the closing quote, or `None` if the quote does not close on this line.
fn read_quoted(text: &str, quote: char) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut chars = text.char_indices().skip(1).peekable();

    while let Some((i, c)) = chars.next() {
        match (quote, c) {
            ('\'', '\'') => {
                if chars.peek().is_some_and(|&(_, n)| n == '\'') {
                    chars.next();
                    value.push('\'');
                } else {
                    return Some((value, i + 1));
                }
            }
            ('"', '"') => return Some((value, i + 1)),
            ('"', '\\') => {
                let (_, esc) = chars.next()?;
                match esc {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '0' => value.push('\0'),
                    'x' | 'u' | 'U' => {
                        let width = match esc {
                            'x' => 2,
                            'u' => 4,
                            _ => 8,
                        };
                        let mut hex = String::new();
                        for _ in 0..width {
                            hex.push(chars.next()?.1);
                        }
                        let decoded = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)?;
                        value.push(decoded);
                    }
                    other => value.push(other),
                }
            }
            _ => value.push(c),
        }
    }
    None
}

/// Renders `value` as a YAML double-quoted scalar.
fn double_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\x{:02X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
