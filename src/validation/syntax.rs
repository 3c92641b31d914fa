//! Structural HTML syntax checking for WEB_STATIC content.
//!
//! The checker makes a single pass over the markup with a small tokenizer and
//! keeps an owned stack of open tags. It is tolerant in the same places HTML5
//! authors expect tolerance:
//!
//! - **Void elements** (`<br>`, `<img>`, ...) never open a frame
//! - **Optional-close elements** (`<li>`, `<p>`, `<td>`, ...) may be closed
//!   implicitly when an enclosing element closes
//! - **Raw-text elements** (`<script>`, `<style>`) are not tokenized inside
//!
//! Everything else that does not balance is reported as a flat list of issues.
//! Nothing in here panics or returns `Err`: malformed markup becomes an issue.

use serde::Serialize;
use std::fmt;

/// Elements that never carry a closing tag or children.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose closing tag may be omitted.
pub const OPTIONAL_CLOSE_ELEMENTS: &[&str] = &[
    "p", "li", "dt", "dd", "option", "tbody", "thead", "tfoot", "tr", "td", "th",
];

/// Elements whose body is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub fn is_optional_close(tag: &str) -> bool {
    OPTIONAL_CLOSE_ELEMENTS.contains(&tag)
}

// ============================================================================
// Issues
// ============================================================================

/// An open tag on the validator stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFrame {
    /// Lowercased tag name
    pub name: String,
    /// Byte offset of the `<` that opened the tag
    pub position: usize,
}

/// What went wrong structurally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyntaxIssueKind {
    /// Input is empty or whitespace-only
    EmptyContent,
    /// End tag seen while no tag was open
    StrayClosingTag { tag: String },
    /// End tag matches an open frame, but a non-optional frame sits above it
    MismatchedClosingTag { expected: String, found: String },
    /// End tag matches nothing on the stack
    UnmatchedClosingTag { tag: String },
    /// Non-optional frames left open at end of input
    UnclosedTags { tags: Vec<String> },
    /// Tokenizer-level problem (unterminated comment, tag, declaration)
    Malformed { detail: String },
}

impl fmt::Display for SyntaxIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxIssueKind::EmptyContent => write!(f, "HTML content is empty"),
            SyntaxIssueKind::StrayClosingTag { tag } => {
                write!(f, "Closing tag without opening: </{tag}>")
            }
            SyntaxIssueKind::MismatchedClosingTag { expected, found } => {
                write!(f, "Mismatched closing tag: expected </{expected}>, found </{found}>")
            }
            SyntaxIssueKind::UnmatchedClosingTag { tag } => {
                write!(f, "Closing tag without matching opening tag: </{tag}>")
            }
            SyntaxIssueKind::UnclosedTags { tags } => {
                write!(f, "Unclosed critical tags: {}", tags.join(", "))
            }
            SyntaxIssueKind::Malformed { detail } => write!(f, "Syntax error: {detail}"),
        }
    }
}

/// 1-based source location of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// Forward-only line/column tracker. Issues are reported in input order, so
/// each byte is counted at most once over a whole pass.
#[derive(Debug, Clone, Copy)]
struct LineCursor {
    offset: usize,
    line: usize,
    column: usize,
}

impl LineCursor {
    fn new() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn locate(&mut self, input: &str, offset: usize) -> Location {
        if offset < self.offset {
            *self = Self::new();
        }
        for ch in input[self.offset..offset].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset = offset;
        Location {
            line: self.line,
            column: self.column,
        }
    }
}

/// A single syntax problem, optionally anchored to a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxIssue {
    #[serde(flatten)]
    pub kind: SyntaxIssueKind,
    pub location: Option<Location>,
}

impl fmt::Display for SyntaxIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(Location { line, column }) => {
                write!(f, "{} (line {line}, column {column})", self.kind)
            }
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Outcome of one syntax pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyntaxReport {
    pub issues: Vec<SyntaxIssue>,
}

impl SyntaxReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Flat, ordered error messages.
    pub fn errors(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }

    pub fn is_empty_content(&self) -> bool {
        matches!(
            self.issues.as_slice(),
            [SyntaxIssue {
                kind: SyntaxIssueKind::EmptyContent,
                ..
            }]
        )
    }
}

// ============================================================================
// Validator state machine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Between tags, looking for the next `<`
    Data,
    /// At a `<`, deciding what kind of markup follows
    MarkupOpen,
    /// Inside a raw-text element body, looking for its end tag
    RawText(&'static str),
    /// Input exhausted
    Done,
}

/// Single-use tag matcher over one input string.
pub struct SyntaxValidator<'a> {
    input: &'a str,
    /// ASCII-lowercased copy; byte offsets line up with `input`
    lower: String,
    pos: usize,
    state: ScanState,
    stack: Vec<TagFrame>,
    issues: Vec<SyntaxIssue>,
    cursor: LineCursor,
}

impl<'a> SyntaxValidator<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            lower: input.to_ascii_lowercase(),
            pos: 0,
            state: ScanState::Data,
            stack: Vec::new(),
            issues: Vec::new(),
            cursor: LineCursor::new(),
        }
    }

    /// Run the machine to completion and produce the report.
    pub fn run(mut self) -> SyntaxReport {
        if self.input.trim().is_empty() {
            return SyntaxReport {
                issues: vec![SyntaxIssue {
                    kind: SyntaxIssueKind::EmptyContent,
                    location: None,
                }],
            };
        }

        while self.state != ScanState::Done {
            self.state = match self.state {
                ScanState::Data => self.scan_data(),
                ScanState::MarkupOpen => self.scan_markup(),
                ScanState::RawText(tag) => self.scan_raw_text(tag),
                ScanState::Done => ScanState::Done,
            };
        }

        let unclosed: Vec<String> = self
            .stack
            .iter()
            .filter(|frame| !is_optional_close(&frame.name))
            .map(|frame| frame.name.clone())
            .collect();
        if !unclosed.is_empty() {
            self.issues.push(SyntaxIssue {
                kind: SyntaxIssueKind::UnclosedTags { tags: unclosed },
                location: None,
            });
        }

        SyntaxReport {
            issues: self.issues,
        }
    }

    fn bytes(&self) -> &[u8] {
        self.input.as_bytes()
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes().get(offset).copied()
    }

    fn find_from(&self, offset: usize, needle: &str) -> Option<usize> {
        self.input
            .get(offset..)
            .and_then(|rest| rest.find(needle))
            .map(|idx| offset + idx)
    }

    fn report(&mut self, kind: SyntaxIssueKind, offset: usize) {
        let location = self.cursor.locate(self.input, offset);
        self.issues.push(SyntaxIssue {
            kind,
            location: Some(location),
        });
    }

    fn malformed(&mut self, detail: impl Into<String>, offset: usize) -> ScanState {
        self.report(
            SyntaxIssueKind::Malformed {
                detail: detail.into(),
            },
            offset,
        );
        ScanState::Done
    }

    fn scan_data(&mut self) -> ScanState {
        match self.find_from(self.pos, "<") {
            Some(idx) => {
                self.pos = idx;
                ScanState::MarkupOpen
            }
            None => ScanState::Done,
        }
    }

    fn scan_markup(&mut self) -> ScanState {
        let start = self.pos;
        let rest = &self.lower[start..];

        if rest.starts_with("<!--") {
            return match self.find_from(start + 4, "-->") {
                Some(end) => self.resume_at(end + 3),
                None => self.malformed("unterminated comment", start),
            };
        }
        if rest.starts_with("<![") {
            return match self.find_from(start + 3, "]]>") {
                Some(end) => self.resume_at(end + 3),
                None => self.malformed("unterminated CDATA section", start),
            };
        }
        if rest.starts_with("<!doctype") {
            return match self.find_from(start, ">") {
                Some(end) => self.resume_at(end + 1),
                None => self.malformed("unterminated doctype declaration", start),
            };
        }
        if rest.starts_with("<!") {
            // Unknown declarations are ignored, terminated or not.
            return match self.find_from(start, ">") {
                Some(end) => self.resume_at(end + 1),
                None => ScanState::Done,
            };
        }
        if rest.starts_with("<?") {
            return match self.find_from(start, ">") {
                Some(end) => self.resume_at(end + 1),
                None => self.malformed("unterminated processing instruction", start),
            };
        }
        if rest.starts_with("</") {
            return self.scan_end_tag(start);
        }
        if self
            .byte_at(start + 1)
            .is_some_and(|b| b.is_ascii_alphabetic())
        {
            return self.scan_start_tag(start);
        }

        // A bare `<` in text.
        self.resume_at(start + 1)
    }

    fn resume_at(&mut self, offset: usize) -> ScanState {
        self.pos = offset;
        ScanState::Data
    }

    /// Length of the tag name starting at `offset`.
    fn name_end(&self, offset: usize) -> usize {
        let mut end = offset;
        while let Some(b) = self.byte_at(end) {
            if b.is_ascii_whitespace() || b == b'/' || b == b'>' || b == 0 {
                break;
            }
            end += 1;
        }
        end
    }

    fn scan_end_tag(&mut self, start: usize) -> ScanState {
        let name_start = start + 2;
        if !self
            .byte_at(name_start)
            .is_some_and(|b| b.is_ascii_alphabetic())
        {
            // `</>` and `</ ...>` carry no tag; skip them like bogus comments.
            return match self.find_from(name_start, ">") {
                Some(end) => self.resume_at(end + 1),
                None => ScanState::Done,
            };
        }

        let name_end = self.name_end(name_start);
        let name = self.lower[name_start..name_end].to_string();
        match self.find_from(name_end, ">") {
            Some(end) => {
                self.close_tag(name, start);
                self.resume_at(end + 1)
            }
            None => self.malformed(format!("unterminated end tag </{name}>"), start),
        }
    }

    fn scan_start_tag(&mut self, start: usize) -> ScanState {
        let name_start = start + 1;
        let name_end = self.name_end(name_start);
        let name = self.lower[name_start..name_end].to_string();

        let Some((tag_end, self_closing)) = self.attributes_end(name_end) else {
            return self.malformed(format!("unterminated start tag <{name}>"), start);
        };
        self.pos = tag_end + 1;

        if self_closing || is_void_element(&name) {
            return ScanState::Data;
        }

        let raw_text = RAW_TEXT_ELEMENTS
            .iter()
            .copied()
            .find(|raw| *raw == name.as_str());
        self.stack.push(TagFrame {
            name,
            position: start,
        });

        match raw_text {
            Some(tag) => ScanState::RawText(tag),
            None => ScanState::Data,
        }
    }

    /// Walk the attribute list honoring quoted values. Returns the offset of
    /// the closing `>` and whether the tag was written self-closing.
    fn attributes_end(&self, mut offset: usize) -> Option<(usize, bool)> {
        let mut last_significant = None;
        let mut after_equals = false;

        while let Some(b) = self.byte_at(offset) {
            match b {
                b'>' => return Some((offset, last_significant == Some(b'/'))),
                b'"' | b'\'' if after_equals => {
                    let close = self
                        .bytes()
                        .get(offset + 1..)?
                        .iter()
                        .position(|&c| c == b)?;
                    offset += close + 2;
                    last_significant = Some(b);
                    after_equals = false;
                    continue;
                }
                b'=' => {
                    after_equals = true;
                    last_significant = Some(b);
                }
                b if b.is_ascii_whitespace() => {}
                other => {
                    after_equals = false;
                    last_significant = Some(other);
                }
            }
            offset += 1;
        }
        None
    }

    fn scan_raw_text(&mut self, tag: &'static str) -> ScanState {
        let needle = format!("</{tag}");
        let mut search = self.pos;
        while let Some(rel) = self.lower.get(search..).and_then(|rest| rest.find(&needle)) {
            let candidate = search + rel;
            let after = candidate + needle.len();
            match self.byte_at(after) {
                Some(b) if b.is_ascii_whitespace() || b == b'>' || b == b'/' => {
                    self.pos = candidate;
                    return ScanState::MarkupOpen;
                }
                // `</scripts` and friends are body text.
                Some(_) => search = after,
                None => break,
            }
        }
        ScanState::Done
    }

    /// Tolerant end-tag matching against the open-tag stack.
    fn close_tag(&mut self, name: String, position: usize) {
        if is_void_element(&name) {
            return;
        }

        if self.stack.is_empty() {
            if !is_optional_close(&name) {
                self.report(SyntaxIssueKind::StrayClosingTag { tag: name }, position);
            }
            return;
        }

        match self.stack.iter().rposition(|frame| frame.name == name) {
            Some(index) => {
                let blocking = self.stack[index + 1..]
                    .iter()
                    .rev()
                    .find(|frame| !is_optional_close(&frame.name))
                    .map(|frame| frame.name.clone());
                match blocking {
                    Some(expected) => self.report(
                        SyntaxIssueKind::MismatchedClosingTag {
                            expected,
                            found: name,
                        },
                        position,
                    ),
                    None => self.stack.truncate(index),
                }
            }
            None => {
                if !is_optional_close(&name) {
                    self.report(SyntaxIssueKind::UnmatchedClosingTag { tag: name }, position);
                }
            }
        }
    }
}

/// Check markup structure. Empty or whitespace-only input yields exactly one
/// empty-content issue.
pub fn check_syntax(content: &str) -> SyntaxReport {
    SyntaxValidator::new(content).run()
}
