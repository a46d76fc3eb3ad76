//! Error type shared by token parsing, dtype resolution and the codecs.

/// Errors produced when resolving a [crate::dtype::Dtype] or converting bits to and
/// from a [crate::value::Value].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The textual type token is malformed (bad suffix, trailing characters, unknown family token).
    #[error("malformed dtype token '{token}': {reason}")]
    TokenSyntax { token: String, reason: String },
    /// No family is registered under this name.
    #[error("unknown dtype family '{0}'")]
    UnknownFamily(String),
    /// An explicit length violates the family's constraint, or a required length is missing.
    #[error("invalid length for '{family}': {reason}")]
    InvalidLength { family: &'static str, reason: String },
    /// The bits cannot be interpreted as requested (wrong length, leftover or missing bits).
    #[error("cannot interpret {len} bits as '{dtype}': {reason}")]
    Interpret {
        dtype: String,
        len: usize,
        reason: String,
    },
    /// A value is out of range or malformed for the requested encoding.
    #[error("invalid value for '{dtype}': {reason}")]
    Value { dtype: String, reason: String },
}

impl Error {
    pub(crate) fn token(token: &str, reason: impl Into<String>) -> Self {
        Error::TokenSyntax {
            token: token.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn length(family: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidLength {
            family,
            reason: reason.into(),
        }
    }

    pub(crate) fn interpret(dtype: impl ToString, len: usize, reason: impl Into<String>) -> Self {
        Error::Interpret {
            dtype: dtype.to_string(),
            len,
            reason: reason.into(),
        }
    }

    pub(crate) fn value(dtype: impl ToString, reason: impl Into<String>) -> Self {
        Error::Value {
            dtype: dtype.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::interpret("hex", 3, "length is not a multiple of 4");
        assert_eq!(
            err.to_string(),
            "cannot interpret 3 bits as 'hex': length is not a multiple of 4"
        );

        let err = Error::UnknownFamily("penguin".to_string());
        assert_eq!(err.to_string(), "unknown dtype family 'penguin'");
    }
}
