//! Resolved type descriptors: a family, an optional bit length and an endianness.

use std::{fmt, str::FromStr};

use crate::{
    bits::BitBuf,
    codec::Codec,
    errors::{Error, Result},
    interpret,
    registry::FamilyDef,
    value::Value,
};

/// The closed set of interpretation families.
///
/// The discriminant indexes the static family table in [crate::registry].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    Bin,
    Hex,
    Oct,
    Uint,
    Int,
    Float,
    Bfloat,
    E4m3Float,
    E5m2Float,
    Bytes,
    Bool,
    Ue,
    Se,
    Uie,
    Sie,
}

impl Family {
    /// Static definition of this family: names, length rule and codec.
    pub fn def(self) -> &'static FamilyDef {
        crate::registry::definition(self)
    }

    /// Canonical long name, e.g. `"uint"`.
    pub fn name(self) -> &'static str {
        self.def().name
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bit and byte ordering applied before interpreting a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endianness {
    /// The whole bit sequence is one big-endian magnitude.
    #[default]
    Bitwise,
    /// Whole bytes, most significant byte first. Same result as [Endianness::Bitwise].
    Big,
    /// Whole bytes, least significant byte first.
    Little,
    /// [Endianness::Big] or [Endianness::Little], whichever the host uses.
    Native,
}

impl Endianness {
    /// Host byte order, fixed at compile time.
    pub const HOST: Endianness = if cfg!(target_endian = "little") {
        Endianness::Little
    } else {
        Endianness::Big
    };

    /// Token suffix: `""`, `"be"`, `"le"` or `"ne"`.
    pub fn suffix(self) -> &'static str {
        match self {
            Endianness::Bitwise => "",
            Endianness::Big => "be",
            Endianness::Little => "le",
            Endianness::Native => "ne",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "be" => Some(Endianness::Big),
            "le" => Some(Endianness::Little),
            "ne" => Some(Endianness::Native),
            _ => None,
        }
    }

    /// Byte-wise orderings require a whole number of bytes.
    pub fn is_bytewise(self) -> bool {
        self != Endianness::Bitwise
    }

    /// Replaces [Endianness::Native] with the host order.
    pub fn resolve(self) -> Self {
        match self {
            Endianness::Native => Self::HOST,
            other => other,
        }
    }
}

/// Constraint a family imposes on an explicit bit length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthRule {
    /// Any length, including zero.
    Any,
    /// Any length greater than zero.
    Positive,
    MultipleOf(usize),
    OneOf(&'static [usize]),
    /// Exactly this many bits; also the default when no length is given.
    Exactly(usize),
    /// Self-delimiting codes; an explicit length is forbidden.
    Variable,
}

impl LengthRule {
    /// Checks an explicit length, returning the reason it is rejected.
    pub fn check(self, len: usize) -> std::result::Result<(), String> {
        match self {
            LengthRule::Any => Ok(()),
            LengthRule::Positive if len > 0 => Ok(()),
            LengthRule::Positive => Err("length must be greater than zero".to_string()),
            LengthRule::MultipleOf(m) if len % m == 0 => Ok(()),
            LengthRule::MultipleOf(m) => Err(format!("length {len} is not a multiple of {m}")),
            LengthRule::OneOf(allowed) if allowed.contains(&len) => Ok(()),
            LengthRule::OneOf(allowed) => Err(format!("length {len} is not one of {allowed:?}")),
            LengthRule::Exactly(n) if len == n => Ok(()),
            LengthRule::Exactly(n) => Err(format!("length is fixed at {n}, got {len}")),
            LengthRule::Variable => {
                Err("variable-length family does not take an explicit length".to_string())
            }
        }
    }

    /// The single allowed length, if the rule fixes one.
    pub fn fixed(self) -> Option<usize> {
        match self {
            LengthRule::Exactly(n) => Some(n),
            _ => None,
        }
    }
}

/// A resolved, immutable type descriptor.
///
/// A present `bit_length` always satisfies the family's [LengthRule]; `None` means
/// the length is inferred from the view at decode time (or the family is variable-length).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dtype {
    family: Family,
    bit_length: Option<usize>,
    endianness: Endianness,
}

impl Dtype {
    /// Validates and builds a descriptor.
    pub fn new(family: Family, bit_length: Option<usize>, endianness: Endianness) -> Result<Self> {
        let def = family.def();

        if endianness.is_bytewise() && !def.endianness {
            return Err(Error::UnknownFamily(format!(
                "{}{}",
                def.name,
                endianness.suffix()
            )));
        }

        let bit_length = match bit_length {
            Some(len) => {
                def.length
                    .check(len)
                    .map_err(|reason| Error::length(def.name, reason))?;
                if endianness.is_bytewise() && len % 8 != 0 {
                    return Err(Error::length(
                        def.name,
                        format!("byte-wise endianness needs whole bytes, got {len} bits"),
                    ));
                }
                Some(len)
            }
            None => def.length.fixed(),
        };

        Ok(Dtype {
            family,
            bit_length,
            endianness,
        })
    }

    /// The family with natural bit order and its default length (if it has one).
    pub fn of(family: Family) -> Self {
        Dtype {
            family,
            bit_length: family.def().length.fixed(),
            endianness: Endianness::Bitwise,
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn bit_length(&self) -> Option<usize> {
        self.bit_length
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn name(&self) -> &'static str {
        self.family.name()
    }

    pub fn is_signed(&self) -> bool {
        self.family.def().signed
    }

    /// True for self-delimiting exp-Golomb families.
    pub fn is_variable_length(&self) -> bool {
        matches!(self.codec(), Codec::Variable { .. })
    }

    pub(crate) fn codec(&self) -> &'static Codec {
        &self.family.def().codec
    }

    /// The explicit length, or [Error::InvalidLength] when the family needs one for this operation.
    pub(crate) fn required_length(&self) -> Result<usize> {
        self.bit_length.ok_or_else(|| {
            Error::length(
                self.name(),
                "a bit length is required to encode or read this type",
            )
        })
    }

    /// Encodes `value` into a fresh bit buffer.
    pub fn build(&self, value: &Value) -> Result<BitBuf> {
        interpret::encode(self, value)
    }

    /// Reads a `0x`/`0b`/`0o` bit literal and decodes it with this dtype.
    pub fn parse(&self, literal: &str) -> Result<Value> {
        let bits = interpret::from_literal(literal)?;
        interpret::decode(self, &bits)
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.endianness.suffix())?;
        match self.bit_length {
            Some(len) if self.family.def().length.fixed().is_none() => write!(f, "{len}"),
            _ => Ok(()),
        }
    }
}

impl FromStr for Dtype {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        crate::token::resolve_token(s)
    }
}
