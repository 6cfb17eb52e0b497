//! TPM block grammar parser.
//!
//! The grammar is line-oriented:
//!
//! ```text
//! type "identifier"
//! {
//!     key = value
//! }
//! ```
//!
//! Blank lines, whitespace-only lines and `//` comment lines are skipped
//! anywhere. Every significant line is trimmed and must match its expected
//! shape completely; a partial match is an error.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::block::{Block, Property};

/// `type` optionally followed by a quoted identifier.
static TYPE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(\w+)\s*("[^"]+")?$"#).expect("valid type-identifier pattern"));

/// `key = value`, where the value is the rest of the line.
static PROPERTY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)\s*=\s*(.+)$").expect("valid property pattern"));

/// Errors that can occur while parsing the block grammar.
///
/// Line numbers are 1-based; `line` is the offending line after trimming.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("Error on line {line_number} '{line}': expected block type or type-identifier")]
    ExpectedTypeIdentifier { line_number: usize, line: String },

    #[error("Error on line {line_number} '{line}': expected opening brace after type-identifier {block}")]
    ExpectedOpeningBrace {
        line_number: usize,
        line: String,
        block: String,
    },

    #[error("Error on line {line_number} '{line}': expected property")]
    ExpectedProperty { line_number: usize, line: String },

    #[error("Unexpected end of input while parsing block {block}")]
    UnexpectedEof { block: String },
}

/// Result type for grammar operations.
pub type GrammarResult<T> = Result<T, GrammarError>;

/// Lines split on `\n`, `\r\n` or a lone `\r`.
///
/// Files written on classic Mac OS end lines with `\r` only, which
/// [`str::lines`] does not treat as a line break.
struct SourceLines<'a> {
    rest: &'a str,
}

impl<'a> Iterator for SourceLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }

        let (line, rest) = match self.rest.find(['\r', '\n']) {
            Some(end) => {
                let width = if self.rest[end..].starts_with("\r\n") { 2 } else { 1 };
                (&self.rest[..end], &self.rest[end + width..])
            }
            None => (self.rest, ""),
        };
        self.rest = rest;
        Some(line)
    }
}

/// Line cursor over a TPM document.
pub struct BlockParser<'a> {
    lines: std::iter::Enumerate<SourceLines<'a>>,
}

impl<'a> BlockParser<'a> {
    /// Create a new parser over the whole document text.
    pub fn new(content: &'a str) -> Self {
        Self {
            lines: SourceLines { rest: content }.enumerate(),
        }
    }

    /// Parse every block until the input runs out.
    pub fn parse(&mut self) -> GrammarResult<Vec<Block>> {
        let mut blocks = Vec::new();
        while let Some(block) = self.parse_block()? {
            blocks.push(block);
        }
        Ok(blocks)
    }

    /// Next line that is not blank and not a comment, trimmed, with its
    /// 1-based line number.
    fn next_significant_line(&mut self) -> Option<(usize, &'a str)> {
        self.lines.by_ref().find_map(|(index, line)| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with("//") {
                None
            } else {
                Some((index + 1, trimmed))
            }
        })
    }

    /// Parse one block. Running out of input before a block starts is the
    /// normal end of the document and yields `Ok(None)`.
    fn parse_block(&mut self) -> GrammarResult<Option<Block>> {
        let (line_number, line) = match self.next_significant_line() {
            Some(x) => x,
            None => return Ok(None),
        };

        let captures = TYPE_IDENTIFIER
            .captures(line)
            .ok_or_else(|| GrammarError::ExpectedTypeIdentifier {
                line_number,
                line: line.to_string(),
            })?;
        let mut block = Block::new(&captures[1], captures.get(2).map(|m| m.as_str().to_string()));

        // Expect an opening brace
        match self.next_significant_line() {
            Some((_, "{")) => {}
            Some((line_number, line)) => {
                return Err(GrammarError::ExpectedOpeningBrace {
                    line_number,
                    line: line.to_string(),
                    block: block.label(),
                })
            }
            None => return Err(GrammarError::UnexpectedEof { block: block.label() }),
        }

        loop {
            let (line_number, line) = self
                .next_significant_line()
                .ok_or_else(|| GrammarError::UnexpectedEof { block: block.label() })?;

            if line == "}" {
                break;
            }

            block.properties.push(parse_property(line_number, line)?);
        }

        log::trace!("Parsed block {} with {} properties", block.label(), block.properties.len());

        Ok(Some(block))
    }
}

fn parse_property(line_number: usize, line: &str) -> GrammarResult<Property> {
    let captures = PROPERTY
        .captures(line)
        .ok_or_else(|| GrammarError::ExpectedProperty {
            line_number,
            line: line.to_string(),
        })?;
    Ok(Property::new(&captures[1], &captures[2]))
}

/// Parse a TPM document into its blocks.
pub fn parse_document(content: &str) -> GrammarResult<Vec<Block>> {
    let mut parser = BlockParser::new(content);
    parser.parse()
}
