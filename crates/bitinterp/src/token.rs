//! Textual dtype tokens such as `"uintle32"`, `"f16"`, `"hex:12"` or `"se"`.
//!
//! Grammar: `family [be|le|ne] [':'] [digits]`, case-insensitive, surrounding
//! whitespace ignored.

use crate::{
    dtype::{Dtype, Endianness, Family},
    errors::{Error, Result},
    registry::{LookupError, Registry},
};

/// A parsed but not yet validated token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub family: Family,
    pub endianness: Endianness,
    /// Explicit bit length, if the token carried digits.
    pub length: Option<usize>,
}

impl Token {
    pub fn parse(token: &str) -> Result<Token> {
        let tidied = token.trim().to_ascii_lowercase();
        if tidied.is_empty() {
            return Err(Error::token(token, "empty token"));
        }

        let stem = tidied.trim_end_matches(|c: char| c.is_ascii_digit());
        let digits = &tidied[stem.len()..];

        let (stem, colon) = match stem.strip_suffix(':') {
            Some(stem) => (stem, true),
            None => (stem, false),
        };

        if stem.is_empty() {
            return Err(Error::token(token, "missing family name"));
        }
        if colon && digits.is_empty() {
            return Err(Error::token(token, "expected a length after ':'"));
        }

        let length = match digits {
            "" => None,
            digits => Some(
                digits
                    .parse::<usize>()
                    .map_err(|_| Error::token(token, format!("length '{digits}' is too large")))?,
            ),
        };

        let (family, endianness) = Registry::global().lookup(stem).map_err(|e| match e {
            LookupError::Unknown => Error::token(token, format!("unknown family '{stem}'")),
            LookupError::EndiannessNotAllowed(family) => Error::token(
                token,
                format!("'{family}' does not take an endianness suffix"),
            ),
            LookupError::ConflictingSuffixes => {
                Error::token(token, "more than one endianness suffix")
            }
        })?;

        Ok(Token {
            family,
            endianness,
            length,
        })
    }
}

impl TryFrom<&Token> for Dtype {
    type Error = Error;

    fn try_from(token: &Token) -> Result<Self> {
        Dtype::new(token.family, token.length, token.endianness)
    }
}

/// Parses and validates a token in one step.
pub fn resolve_token(token: &str) -> Result<Dtype> {
    let dtype = Dtype::try_from(&Token::parse(token)?)?;
    tracing::trace!(token, %dtype, "resolved token");
    Ok(dtype)
}
