//! Textual encodings of TPM scalars, vectors and strings.
//!
//! Vectors are written as `(x,y,z)`; strings may be wrapped in one pair of
//! double quotes. These helpers are pure and shared by decode and encode.

use thiserror::Error;
use tpm_math::{Vec2, Vec3};

/// Errors that can occur while converting a property value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("'{0}' cannot be converted to a vector")]
    NotAVector(String),

    #[error("Invalid number format: '{0}'")]
    InvalidFloat(String),

    #[error("Invalid integer format: '{0}'")]
    InvalidInteger(String),

    #[error("Vector '{text}' has {found} components, expected {expected}")]
    WrongDimension {
        text: String,
        expected: usize,
        found: usize,
    },
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Strip `start` and `end` from the ends of `s` if both are present.
///
/// Returns the (possibly unchanged) string and whether anything was removed.
fn chop_ends(s: &str, start: char, end: char) -> (&str, bool) {
    if s.len() >= 2 && s.starts_with(start) && s.ends_with(end) {
        (&s[start.len_utf8()..s.len() - end.len_utf8()], true)
    } else {
        (s, false)
    }
}

/// Remove one pair of enclosing double quotes.
///
/// Only the very first and last characters are considered. If they are not
/// both `"`, the input is returned unchanged and the flag is `false`.
pub fn unquote(s: &str) -> (&str, bool) {
    chop_ends(s, '"', '"')
}

/// Enclose a string in double quotes.
pub fn quote(s: &str) -> String {
    format!("\"{}\"", s)
}

/// Parse a parenthesised, comma-separated vector of any dimension.
pub fn parse_vector(text: &str) -> CodecResult<Vec<f32>> {
    let (inner, bracketed) = chop_ends(text.trim(), '(', ')');
    if !bracketed {
        return Err(CodecError::NotAVector(text.to_string()));
    }
    inner.split(',').map(parse_float).collect()
}

fn parse_vector_of(text: &str, expected: usize) -> CodecResult<Vec<f32>> {
    let components = parse_vector(text)?;
    if components.len() != expected {
        return Err(CodecError::WrongDimension {
            text: text.to_string(),
            expected,
            found: components.len(),
        });
    }
    Ok(components)
}

/// Parse a 3-component vector such as a position, normal or rotation.
pub fn parse_vec3(text: &str) -> CodecResult<Vec3> {
    parse_vector_of(text, 3).map(|c| Vec3::from_slice(&c))
}

/// Parse a 2-component vector such as a texture coordinate.
pub fn parse_vec2(text: &str) -> CodecResult<Vec2> {
    parse_vector_of(text, 2).map(|c| Vec2::from_slice(&c))
}

/// Parse a float, ignoring surrounding whitespace.
pub fn parse_float(text: &str) -> CodecResult<f32> {
    let trimmed = text.trim();
    trimmed
        .parse::<f32>()
        .map_err(|_| CodecError::InvalidFloat(trimmed.to_string()))
}

/// Parse a non-negative integer index.
pub fn parse_index(text: &str) -> CodecResult<u32> {
    let trimmed = text.trim();
    trimmed
        .parse::<u32>()
        .map_err(|_| CodecError::InvalidInteger(trimmed.to_string()))
}

/// Format components as `(a,b,c)`.
///
/// Uses the shortest representation that parses back to the same `f32`,
/// never scientific notation.
pub fn format_vector(components: &[f32]) -> String {
    let parts: Vec<String> = components.iter().map(|c| c.to_string()).collect();
    format!("({})", parts.join(","))
}

pub fn format_vec3(v: Vec3) -> String {
    format_vector(&v.to_array())
}

pub fn format_vec2(v: Vec2) -> String {
    format_vector(&v.to_array())
}
