/// View modes and the text-level rendering behind them
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::conversation::Conversation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Markdown with highlighted code blocks
    #[default]
    Pretty,
    /// Verbatim preformatted text
    Raw,
    /// The whole record as pretty-printed JSON
    Json,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Pretty, ViewMode::Raw, ViewMode::Json];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Pretty => "pretty",
            ViewMode::Raw => "raw",
            ViewMode::Json => "json",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Pretty => "Pretty",
            ViewMode::Raw => "Raw",
            ViewMode::Json => "JSON",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(ViewMode::Pretty),
            "raw" => Ok(ViewMode::Raw),
            "json" => Ok(ViewMode::Json),
            other => Err(format!("Unknown view mode: {}", other)),
        }
    }
}

/// Speaker of the turn at `index`: even turns are the user's
pub fn speaker(index: usize) -> &'static str {
    if index % 2 == 0 { "You" } else { "Grok" }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, text: String },
    Code { language: Option<String>, code: String },
    ListItem(String),
    Paragraph(String),
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = line[hashes..].strip_prefix(' ')?;
    Some((hashes as u8, rest.trim()))
}

/// Split markdown into block-level pieces.
///
/// Handles ATX headings, fenced code blocks, `-`/`*` list items and
/// paragraphs. Lines inside a paragraph keep their newlines. An unterminated
/// fence runs to the end of the text.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut code: Option<(Option<String>, Vec<&str>)> = None;

    fn flush(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>) {
        if !paragraph.is_empty() {
            blocks.push(Block::Paragraph(paragraph.join("\n")));
            paragraph.clear();
        }
    }

    for line in text.lines() {
        let trimmed = line.trim_start();

        if let Some((language, lines)) = code.as_mut() {
            if trimmed.starts_with("```") {
                blocks.push(Block::Code {
                    language: language.take(),
                    code: lines.join("\n"),
                });
                code = None;
            } else {
                lines.push(line);
            }
            continue;
        }

        if let Some(info) = trimmed.strip_prefix("```") {
            flush(&mut paragraph, &mut blocks);
            let language = info.trim();
            code = Some(((!language.is_empty()).then(|| language.to_string()), Vec::new()));
        } else if let Some((level, text)) = heading(trimmed) {
            flush(&mut paragraph, &mut blocks);
            blocks.push(Block::Heading {
                level,
                text: text.to_string(),
            });
        } else if let Some(item) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
            flush(&mut paragraph, &mut blocks);
            blocks.push(Block::ListItem(item.to_string()));
        } else if trimmed.is_empty() {
            flush(&mut paragraph, &mut blocks);
        } else {
            paragraph.push(line);
        }
    }

    if let Some((language, lines)) = code {
        blocks.push(Block::Code {
            language,
            code: lines.join("\n"),
        });
    }
    flush(&mut paragraph, &mut blocks);

    blocks
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Bold(String),
    Code(String),
}

/// Split a line into plain text, `**bold**` and `` `code` `` spans.
///
/// Unclosed markers are kept as literal text.
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut spans = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        let bold = c == '*' && chars.peek() == Some(&'*');
        if c != '`' && !bold {
            current.push(c);
            continue;
        }
        if bold {
            chars.next();
        }

        let mut inner = String::new();
        let mut closed = false;
        while let Some(next) = chars.next() {
            if bold && next == '*' && chars.peek() == Some(&'*') {
                chars.next();
                closed = true;
                break;
            }
            if !bold && next == '`' {
                closed = true;
                break;
            }
            inner.push(next);
        }

        if closed && !inner.is_empty() {
            if !current.is_empty() {
                spans.push(Inline::Text(std::mem::take(&mut current)));
            }
            spans.push(if bold { Inline::Bold(inner) } else { Inline::Code(inner) });
        } else {
            current.push_str(if bold { "**" } else { "`" });
            current.push_str(&inner);
            if closed {
                current.push_str(if bold { "**" } else { "`" });
            }
        }
    }

    if !current.is_empty() {
        spans.push(Inline::Text(current));
    }
    spans
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Plain,
    Keyword,
    String,
    Number,
    Comment,
}

impl TokenKind {
    /// CSS class for a highlighted span
    pub fn class(self) -> &'static str {
        match self {
            TokenKind::Plain => "tok-plain",
            TokenKind::Keyword => "tok-keyword",
            TokenKind::String => "tok-string",
            TokenKind::Number => "tok-number",
            TokenKind::Comment => "tok-comment",
        }
    }
}

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "case", "catch", "class", "const", "continue", "def", "default", "do", "elif",
    "else", "enum", "except", "export", "extends", "false", "False", "fi", "finally", "fn", "for", "from", "func",
    "function", "if", "impl", "import", "in", "interface", "let", "match", "mod", "mut", "new", "None", "null",
    "package", "pub", "raise", "return", "self", "Self", "static", "struct", "switch", "then", "this", "throw",
    "trait", "true", "True", "try", "type", "undefined", "use", "var", "while", "with", "yield",
];

fn line_comment_marker(language: Option<&str>) -> &'static str {
    match language.map(str::to_ascii_lowercase).as_deref() {
        Some("python" | "py" | "bash" | "sh" | "shell" | "zsh" | "ruby" | "rb" | "yaml" | "yml" | "toml") => "#",
        Some("sql" | "lua" | "haskell") => "--",
        _ => "//",
    }
}

/// Byte length of the quoted literal at the start of `rest`.
///
/// Stops at the closing quote, at a newline for `'` and `"`, or at the end.
fn quoted_len(rest: &str, quote: char) -> usize {
    let mut escaped = false;
    for (index, c) in rest.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return index + c.len_utf8();
        } else if c == '\n' && quote != '`' {
            return index;
        }
    }
    rest.len()
}

fn push_token(tokens: &mut Vec<(TokenKind, String)>, kind: TokenKind, text: &str) {
    match tokens.last_mut() {
        Some((TokenKind::Plain, last)) if kind == TokenKind::Plain => last.push_str(text),
        _ => tokens.push((kind, text.to_string())),
    }
}

/// Split a code block into coloured tokens.
///
/// A lexical pass only: comments, string literals, numbers and a shared
/// keyword list. Concatenating the token texts gives back `code`.
pub fn highlight_code(language: Option<&str>, code: &str) -> Vec<(TokenKind, String)> {
    let comment = line_comment_marker(language);
    let mut tokens = Vec::new();
    let mut offset = 0;

    while offset < code.len() {
        let rest = &code[offset..];
        let Some(first) = rest.chars().next() else { break };

        let (kind, len) = if rest.starts_with(comment) {
            (TokenKind::Comment, rest.find('\n').unwrap_or(rest.len()))
        } else if comment == "//" && rest.starts_with("/*") {
            (TokenKind::Comment, rest[2..].find("*/").map_or(rest.len(), |end| end + 4))
        } else {
            match first {
                '"' | '\'' | '`' => (TokenKind::String, quoted_len(rest, first)),
                c if c.is_ascii_digit() => {
                    let len = rest
                        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '.' || c == '_'))
                        .unwrap_or(rest.len());
                    (TokenKind::Number, len)
                }
                c if c.is_alphabetic() || c == '_' => {
                    let len = rest.find(|c: char| !(c.is_alphanumeric() || c == '_')).unwrap_or(rest.len());
                    let kind = if KEYWORDS.contains(&&rest[..len]) { TokenKind::Keyword } else { TokenKind::Plain };
                    (kind, len)
                }
                c => (TokenKind::Plain, c.len_utf8()),
            }
        };

        push_token(&mut tokens, kind, &rest[..len]);
        offset += len;
    }

    tokens
}

/// The whole record, pretty-printed
pub fn record_json(conversation: &Conversation) -> String {
    match serde_json::to_string_pretty(conversation) {
        Ok(json) => json,
        Err(e) => {
            log::error!("Failed to serialize conversation {}: {}", conversation.id, e);
            String::new()
        }
    }
}

/// Clipboard text for one response in the given mode
pub fn response_copy_text(mode: ViewMode, response: &str) -> String {
    match mode {
        ViewMode::Pretty | ViewMode::Raw => response.to_string(),
        ViewMode::Json => serde_json::Value::String(response.to_string()).to_string(),
    }
}

/// Clipboard text for a whole conversation in the given mode
pub fn transcript_copy_text(mode: ViewMode, conversation: &Conversation) -> String {
    match mode {
        ViewMode::Pretty => {
            let mut parts = vec![format!("# {}", conversation.title)];
            parts.extend(
                conversation
                    .responses
                    .iter()
                    .enumerate()
                    .map(|(i, response)| format!("**{}:**\n\n{}", speaker(i), response)),
            );
            parts.join("\n\n")
        }
        ViewMode::Raw => std::iter::once(conversation.title.as_str())
            .chain(conversation.responses.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n\n"),
        ViewMode::Json => record_json(conversation),
    }
}
