//! ADIF tag tokenizer.
//!
//! Splits raw ADIF text into records of `(name, declared length, value)`
//! triples without copying or lowercasing the input. All slices borrow
//! from the original text.
//!
//! # Layout handled
//!
//! ```text
//! Generated by SomeLogger v1.0        ← header (free text, skipped)
//! <ADIF_VER:5>3.1.0
//! <EOH>                               ← end of header
//! <CALL:4>W1AW <QSO_DATE:8>20250920 <EOR>
//! <call:5>K1ABC <freq:6:N>14.205 <eor>
//! ```
//!
//! `<EOH>` only ends the header when it appears before the first `<EOR>`
//! and outside any field value. Without one, leading `#` comment lines are
//! skipped instead.

use crate::error::RecordError;

use super::scan::find_ci;

const EOH: &str = "<EOH>";
const EOR: &str = "<EOR>";

/// One field as it appears in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken<'a> {
    pub name: &'a str,
    pub declared_len: usize,
    pub value: &'a str,
    /// The optional third header component (`<NAME:LEN:TYPE>`).
    pub type_hint: Option<&'a str>,
}

impl RawToken<'_> {
    /// True when the record ended before `declared_len` characters were read.
    pub fn is_truncated(&self) -> bool {
        self.value.chars().count() < self.declared_len
    }
}

/// The fields of one `<EOR>`-terminated record, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord<'a> {
    /// 1-based position of the record in the stream.
    pub ordinal: usize,
    pub tokens: Vec<RawToken<'a>>,
}

impl<'a> RawRecord<'a> {
    /// Last token whose name matches `name`, ignoring ASCII case.
    pub fn field(&self, name: &str) -> Option<&RawToken<'a>> {
        self.tokens
            .iter()
            .rev()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

/// Tokenize `input` into a lazy stream of records.
///
/// Each item is either a [`RawRecord`] or a
/// [`RecordError::Structural`] for a record that could not be read;
/// errors do not stop the stream. Calling `tokenize` again on the same
/// input restarts from the beginning.
pub fn tokenize(input: &str) -> Records<'_> {
    Records {
        body: skip_header(input),
        pos: 0,
        ordinal: 0,
        done: false,
    }
}

/// Iterator returned by [`tokenize`].
#[derive(Debug, Clone)]
pub struct Records<'a> {
    body: &'a str,
    pos: usize,
    ordinal: usize,
    done: bool,
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<RawRecord<'a>, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            let rest = &self.body[self.pos..];
            let (segment, terminated) = match find_ci(rest, EOR) {
                Some(at) => {
                    self.pos += at + EOR.len();
                    (&rest[..at], true)
                }
                None => {
                    self.done = true;
                    (rest, false)
                }
            };

            if segment.trim().is_empty() {
                continue;
            }

            let tokens = read_fields(segment);
            if !terminated {
                // Trailing free text after the last record is not an error.
                if tokens.is_empty() {
                    return None;
                }
                self.ordinal += 1;
                return Some(Err(RecordError::Structural {
                    ordinal: self.ordinal,
                    reason: "unterminated record: missing <EOR>".to_string(),
                }));
            }

            self.ordinal += 1;
            if tokens.is_empty() {
                return Some(Err(RecordError::Structural {
                    ordinal: self.ordinal,
                    reason: "no fields found".to_string(),
                }));
            }
            return Some(Ok(RawRecord {
                ordinal: self.ordinal,
                tokens,
            }));
        }
    }
}

fn skip_header(input: &str) -> &str {
    if let Some(at) = header_end(input) {
        return &input[at..];
    }

    let mut rest = input;
    loop {
        let line_end = rest.find('\n').map(|i| i + 1).unwrap_or(rest.len());
        let line = rest[..line_end].trim();
        if line.is_empty() && line_end > 0 && line_end < rest.len() {
            rest = &rest[line_end..];
        } else if line.starts_with('#') {
            rest = &rest[line_end..];
        } else {
            return rest;
        }
    }
}

/// Byte offset just past the `<EOH>` tag, if one appears before the first
/// `<EOR>` and outside every field value.
fn header_end(input: &str) -> Option<usize> {
    let mut pos = 0;
    while let Some(i) = input[pos..].find('<') {
        let tag_start = pos + i;
        let tag = &input[tag_start..];
        if starts_with_ci(tag, EOH) {
            return Some(tag_start + EOH.len());
        }
        if starts_with_ci(tag, EOR) {
            return None;
        }
        let close = tag_start + 1 + input[tag_start + 1..].find('>')?;
        pos = match parse_header(&input[tag_start + 1..close]) {
            Some(header) => advance_chars(input, close + 1, header.declared_len),
            None => tag_start + 1,
        };
    }
    None
}

fn starts_with_ci(text: &str, marker: &str) -> bool {
    text.as_bytes()
        .get(..marker.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(marker.as_bytes()))
}

#[derive(Debug, Clone, Copy)]
struct FieldHeader<'a> {
    name: &'a str,
    declared_len: usize,
    type_hint: Option<&'a str>,
}

/// Parse `NAME:LEN[:TYPE]`. Anything else is free text.
///
/// Everything after the second `:` is the type hint, which may be empty.
fn parse_header(header: &str) -> Option<FieldHeader<'_>> {
    let mut parts = header.splitn(3, ':');
    let name = parts.next()?;
    let len = parts.next()?;
    let type_hint = parts.next().filter(|t| !t.is_empty());

    let name_ok = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    let len_ok = !len.is_empty() && len.bytes().all(|b| b.is_ascii_digit());
    if !name_ok || !len_ok {
        return None;
    }

    Some(FieldHeader {
        name,
        declared_len: len.parse().ok()?,
        type_hint,
    })
}

/// Byte offset reached after taking up to `count` chars from `start`.
fn advance_chars(text: &str, start: usize, count: usize) -> usize {
    text[start..]
        .char_indices()
        .nth(count)
        .map(|(i, _)| start + i)
        .unwrap_or(text.len())
}

enum FieldState<'a> {
    /// Looking for the next `<`.
    Seek,
    /// Inside `<...>`; `start` is the byte after `<`.
    Header { start: usize },
    /// Header parsed; value begins at `start`.
    Value {
        header: FieldHeader<'a>,
        start: usize,
    },
}

fn read_fields(segment: &str) -> Vec<RawToken<'_>> {
    let mut tokens = Vec::new();
    let mut state = FieldState::Seek;
    let mut pos = 0;

    loop {
        state = match state {
            FieldState::Seek => match segment[pos..].find('<') {
                Some(i) => FieldState::Header { start: pos + i + 1 },
                None => break,
            },
            FieldState::Header { start } => match segment[start..].find('>') {
                Some(i) => match parse_header(&segment[start..start + i]) {
                    Some(header) => FieldState::Value {
                        header,
                        start: start + i + 1,
                    },
                    None => {
                        pos = start;
                        FieldState::Seek
                    }
                },
                None => break,
            },
            FieldState::Value { header, start } => {
                let end = advance_chars(segment, start, header.declared_len);
                tokens.push(RawToken {
                    name: header.name,
                    declared_len: header.declared_len,
                    value: &segment[start..end],
                    type_hint: header.type_hint,
                });
                pos = end;
                FieldState::Seek
            }
        };
    }

    tokens
}
