//! Numscript parsing
//!
//! Two independent modes:
//! - `parse_numscript`: strict structural parse. Statements are located by a
//!   segmenter, each one is parsed with the pest grammar, and statements that
//!   fail are skipped and reported in `ParsedScript::failures`.
//! - `scan`: permissive regular-expression extraction for visualization,
//!   which never needs a successful parse.

use crate::ast::Span;
use crate::error::NumscriptError;
use crate::semantic::*;
use crate::NumscriptResult;
use pest::Parser;
use pest_derive::Parser;
use std::ops::Range;
use tracing::warn;

pub mod literals;
pub mod scan;
pub mod statements;

pub use literals::{parse_asset, parse_monetary};
pub use scan::{
    parse_metadata_from_numscript, parse_postings_from_numscript, MetadataKeys, ScannedPosting,
};

#[derive(Parser)]
#[grammar = "src/parser/numscript.pest"]
pub struct NumscriptParser;

/// Source id used in errors raised outside a named file
pub(crate) const SOURCE_ID: &str = "<script>";

pub(crate) fn grammar_error(message: &str) -> NumscriptError {
    NumscriptError::Engine(format!("Grammar error: {}", message))
}

/// Parse a whole script, keeping every statement that parses
///
/// Never fails: a broken statement is logged, recorded in
/// `ParsedScript::failures` and skipped.
pub fn parse_numscript(script: &str) -> ParsedScript {
    let mut parsed = ParsedScript::default();

    for segment in segment_statements(script) {
        let span = Span::new(script, segment.start, segment.end);
        let result = match segment.end_state {
            EndState::Closed => parse_segment(script, &segment, span.clone(), &mut parsed),
            EndState::Interrupted | EndState::EndOfInput => Err(StatementError {
                location: Span::new(script, segment.end, segment.end),
                message: format!("unterminated {}", segment.kind),
            }),
        };

        if let Err(error) = result {
            let failure = ParseFailure {
                kind: segment.kind,
                span,
                location: error.location,
                message: error.message,
            };
            warn!(
                kind = %failure.kind,
                line = failure.location.line,
                col = failure.location.col,
                "skipping statement: {}",
                failure.message
            );
            parsed.failures.push(failure);
        }
    }

    parsed
}

struct StatementError {
    location: Span,
    message: String,
}

impl StatementError {
    fn from_engine(error: NumscriptError, span: &Span) -> Self {
        Self {
            location: span.clone(),
            message: error.to_string(),
        }
    }
}

fn parse_segment(
    script: &str,
    segment: &Segment,
    span: Span,
    parsed: &mut ParsedScript,
) -> Result<(), StatementError> {
    let text = &script[segment.start..segment.end];
    let rule = match segment.kind {
        StatementKind::Vars => Rule::vars_block,
        StatementKind::Send => Rule::send_statement,
        StatementKind::TxMeta => Rule::tx_meta_statement,
        StatementKind::AccountMeta => Rule::account_meta_statement,
    };

    let pair = NumscriptParser::parse(rule, text)
        .map_err(|e| pest_statement_error(e, segment.start, script))?
        .next()
        .ok_or_else(|| StatementError {
            location: span.clone(),
            message: format!("empty {}", segment.kind),
        })?;

    match segment.kind {
        StatementKind::Vars => {
            let variables = statements::parse_vars_block(pair, segment.start, script)
                .map_err(|e| StatementError::from_engine(e, &span))?;
            parsed.variables.extend(variables);
        }
        StatementKind::Send => {
            let send = statements::parse_send_statement(pair, span.clone())
                .map_err(|e| StatementError::from_engine(e, &span))?;
            parsed.sends.push(send);
        }
        StatementKind::TxMeta => {
            let meta = statements::parse_tx_meta_statement(pair, span.clone())
                .map_err(|e| StatementError::from_engine(e, &span))?;
            parsed.metadata.push(meta);
        }
        StatementKind::AccountMeta => {
            let meta = statements::parse_account_meta_statement(pair, span.clone())
                .map_err(|e| StatementError::from_engine(e, &span))?;
            parsed.metadata.push(meta);
        }
    }
    Ok(())
}

fn pest_statement_error(
    error: pest::error::Error<Rule>,
    offset: usize,
    script: &str,
) -> StatementError {
    let error = error.renamed_rules(describe_rule);
    let (start, end) = match error.location {
        pest::error::InputLocation::Pos(pos) => (pos, pos),
        pest::error::InputLocation::Span((start, end)) => (start, end),
    };
    StatementError {
        location: Span::new(script, offset + start, offset + end),
        message: error.variant.message().to_string(),
    }
}

fn describe_rule(rule: &Rule) -> String {
    match rule {
        Rule::monetary => "a monetary literal like [USD/2 100]".to_string(),
        Rule::account_ref | Rule::address => "an account like @users:alice".to_string(),
        Rule::source_clause => "`source = ...`".to_string(),
        Rule::destination_clause => "`destination = ...`".to_string(),
        Rule::source | Rule::source_list | Rule::source_item => "a source".to_string(),
        Rule::destination | Rule::destination_list | Rule::destination_item => {
            "a destination".to_string()
        }
        Rule::portion => "a portion like 10%, 1/3 or remaining".to_string(),
        Rule::overdraft => "`allowing overdraft`".to_string(),
        Rule::string_literal => "a quoted string".to_string(),
        Rule::metadata_value => "a metadata value".to_string(),
        Rule::var_decl | Rule::var_type => {
            "a variable declaration like `monetary $amount`".to_string()
        }
        Rule::variable => "a variable like $amount".to_string(),
        Rule::EOI => "end of statement".to_string(),
        other => format!("{:?}", other),
    }
}

/// How the segmenter found the end of a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EndState {
    /// Closing delimiter found
    Closed,
    /// Another statement keyword started before the closing delimiter
    Interrupted,
    EndOfInput,
}

/// Byte range of one located statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Segment {
    pub kind: StatementKind,
    pub start: usize,
    pub end: usize,
    pub end_state: EndState,
}

/// Locate statements in `script`, skipping string literals and comments
pub(crate) fn segment_statements(script: &str) -> Vec<Segment> {
    let bytes = script.as_bytes();
    let mut segments = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'"' {
            i = skip_string(bytes, i);
            continue;
        }
        if is_comment_start(bytes, i) {
            i = skip_comment(bytes, i);
            continue;
        }
        if let Some(kind) = keyword_at(script, i) {
            let segment = locate_statement(script, i, kind);
            i = segment.end.max(i + 1);
            segments.push(segment);
            continue;
        }
        i += 1;
    }

    segments
}

const KEYWORDS: [(&str, StatementKind); 4] = [
    ("set_account_meta", StatementKind::AccountMeta),
    ("set_tx_meta", StatementKind::TxMeta),
    ("send", StatementKind::Send),
    ("vars", StatementKind::Vars),
];

fn keyword_at(script: &str, i: usize) -> Option<StatementKind> {
    let bytes = script.as_bytes();
    if i > 0 && is_word_byte(bytes[i - 1]) {
        return None;
    }
    let rest = &bytes[i..];
    KEYWORDS.iter().find_map(|(keyword, kind)| {
        let after = rest.get(keyword.len()).copied();
        let boundary = after.map_or(true, |b| !is_word_byte(b));
        (rest.starts_with(keyword.as_bytes()) && boundary).then_some(*kind)
    })
}

fn locate_statement(script: &str, start: usize, kind: StatementKind) -> Segment {
    let bytes = script.as_bytes();
    let (open, close) = match kind {
        StatementKind::Vars => (b'{', b'}'),
        _ => (b'(', b')'),
    };

    let keyword_len = KEYWORDS
        .iter()
        .find(|(_, k)| *k == kind)
        .map(|(keyword, _)| keyword.len())
        .unwrap_or(0);

    // Walk the header (`send [USD/2 100]`, `vars`) up to the opening delimiter
    let mut i = start + keyword_len;
    while i < bytes.len() && bytes[i] != open {
        if is_comment_start(bytes, i) {
            i = skip_comment(bytes, i);
            continue;
        }
        let header_byte = bytes[i].is_ascii_whitespace()
            || matches!(bytes[i], b'[' | b']' | b'/' | b'*' | b'$' | b'_' | b'-' | b'.')
            || bytes[i].is_ascii_alphanumeric();
        if !header_byte || keyword_at(script, i).is_some() {
            return Segment {
                kind,
                start,
                end: i,
                end_state: EndState::Interrupted,
            };
        }
        i += 1;
    }
    if i >= bytes.len() {
        return Segment {
            kind,
            start,
            end: bytes.len(),
            end_state: EndState::EndOfInput,
        };
    }

    let mut depth = 0usize;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'"' {
            i = skip_string(bytes, i);
            continue;
        }
        if is_comment_start(bytes, i) {
            i = skip_comment(bytes, i);
            continue;
        }
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Segment {
                    kind,
                    start,
                    end: i + 1,
                    end_state: EndState::Closed,
                };
            }
        } else if keyword_at(script, i).is_some() {
            return Segment {
                kind,
                start,
                end: i,
                end_state: EndState::Interrupted,
            };
        }
        i += 1;
    }

    Segment {
        kind,
        start,
        end: bytes.len(),
        end_state: EndState::EndOfInput,
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'@' | b':')
}

fn is_comment_start(bytes: &[u8], i: usize) -> bool {
    bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'/')
}

/// Index just past the closing quote, or the end of input
fn skip_string(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Index of the newline ending the comment, or the end of input
fn skip_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |offset| start + offset)
}

/// `vars { }` declarations with the byte range of each block
///
/// Parses nothing else, so it can run on text whose other statements still
/// hold unsubstituted variables.
pub(crate) fn variable_blocks(script: &str) -> (Vec<VariableDecl>, Vec<Range<usize>>) {
    let mut declarations = Vec::new();
    let mut ranges = Vec::new();

    for segment in segment_statements(script) {
        if segment.kind != StatementKind::Vars {
            continue;
        }
        ranges.push(segment.start..segment.end);
        if segment.end_state != EndState::Closed {
            continue;
        }
        let text = &script[segment.start..segment.end];
        if let Some(pair) = NumscriptParser::parse(Rule::vars_block, text)
            .ok()
            .and_then(|mut pairs| pairs.next())
        {
            if let Ok(decls) = statements::parse_vars_block(pair, segment.start, script) {
                declarations.extend(decls);
            }
        }
    }

    (declarations, ranges)
}

/// Byte ranges of string literals, quotes included; comments are skipped
pub(crate) fn string_literal_ranges(script: &str) -> Vec<Range<usize>> {
    let bytes = script.as_bytes();
    let mut ranges = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            let end = skip_string(bytes, i);
            ranges.push(i..end);
            i = end;
        } else if is_comment_start(bytes, i) {
            i = skip_comment(bytes, i);
        } else {
            i += 1;
        }
    }
    ranges
}

/// Parse a script, failing on the first skipped statement
///
/// For callers that must not run a partially understood script.
pub fn parse_numscript_strict(script: &str) -> NumscriptResult<ParsedScript> {
    let parsed = parse_numscript(script);
    match parsed.failures.first() {
        Some(failure) => Err(NumscriptError::parse(
            format!("{} {}", failure.kind, failure.message),
            failure.location.clone(),
            SOURCE_ID,
            std::sync::Arc::from(script),
        )),
        None => Ok(parsed),
    }
}
