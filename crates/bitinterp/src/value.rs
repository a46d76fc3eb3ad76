//! Values produced by decoding and consumed by encoding.

use std::fmt;

use num_bigint::{BigInt, BigUint};

/// A decoded value. Owns its data; nothing borrows from the source bits.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// String of `'0'`/`'1'` characters.
    Bin(String),
    /// Lowercase hexadecimal digits, one per 4 bits.
    Hex(String),
    /// Octal digits, one per 3 bits.
    Oct(String),
    /// Signed or unsigned integer of any width, including exp-Golomb values.
    Int(BigInt),
    /// Native IEEE-754 float or exotic float widened to `f64`.
    Float(f64),
    /// Whole bytes, MSB of each byte first.
    Bytes(Vec<u8>),
    Bool(bool),
}

impl Value {
    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// The digits of a [Value::Bin], [Value::Hex] or [Value::Oct].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Bin(s) | Value::Hex(s) | Value::Oct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn into_int(self) -> Option<BigInt> {
        match self {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Takes the digits out of a [Value::Bin], [Value::Hex] or [Value::Oct].
    pub fn into_string(self) -> Option<String> {
        match self {
            Value::Bin(s) | Value::Hex(s) | Value::Oct(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bin(_) => "binary string",
            Value::Hex(_) => "hex string",
            Value::Oct(_) => "octal string",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Bytes(_) => "bytes",
            Value::Bool(_) => "bool",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bin(s) | Value::Hex(s) | Value::Oct(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bytes(b) => write!(f, "{b:02x?}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Int(BigInt::from(value))
                }
            }
        )*
    };
}

from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, usize, isize);

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::Int(value)
    }
}

impl From<BigUint> for Value {
    fn from(value: BigUint) -> Self {
        Value::Int(BigInt::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(Value::from(-3).as_int(), Some(&BigInt::from(-3)));
        assert_eq!(Value::from(0.5f32).as_float(), Some(0.5));
        assert_eq!(Value::Hex("ff".to_string()).as_str(), Some("ff"));
        assert_eq!(Value::from(vec![1u8, 2]).as_bytes(), Some(&[1u8, 2][..]));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(true).as_int(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(283u32).to_string(), "283");
        assert_eq!(Value::Oct("7".to_string()).to_string(), "7");
        assert_eq!(Value::from(vec![0x0au8, 0xff]).to_string(), "[0a, ff]");
    }
}
