//! Process-wide table of interpretation families.
//!
//! The table is static data; the name index is built once on first use and is
//! read-only afterwards, so lookups from any thread need no synchronization.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::{
    codec::{
        Codec,
        exotic::{decode_bfloat, decode_minifloat, encode_bfloat, encode_minifloat},
        fixed::*,
        golomb::*,
    },
    dtype::{Dtype, Endianness, Family, LengthRule},
    errors::{Error, Result},
};

/// Everything the engine knows about one family.
#[derive(Debug)]
pub struct FamilyDef {
    pub family: Family,
    /// Canonical long name used when displaying a [Dtype].
    pub name: &'static str,
    /// Every token spelling that resolves to this family, the canonical name first.
    pub aliases: &'static [&'static str],
    pub length: LengthRule,
    /// Whether `be`/`le`/`ne` suffixes are accepted.
    pub endianness: bool,
    pub signed: bool,
    pub codec: Codec,
    pub description: &'static str,
}

const fn fixed(decode: crate::codec::DecodeFn, encode: crate::codec::EncodeFn) -> Codec {
    Codec::Fixed { decode, encode }
}

const fn variable(read: crate::codec::ReadFn, encode: crate::codec::EncodeFn) -> Codec {
    Codec::Variable { read, encode }
}

// Indexed by `Family as usize`; the order must follow the enum.
static FAMILIES: [FamilyDef; 15] = [
    FamilyDef {
        family: Family::Bin,
        name: "bin",
        aliases: &["bin", "b"],
        length: LengthRule::Any,
        endianness: false,
        signed: false,
        codec: fixed(decode_bin, encode_bin),
        description: "binary string",
    },
    FamilyDef {
        family: Family::Hex,
        name: "hex",
        aliases: &["hex", "h"],
        length: LengthRule::MultipleOf(4),
        endianness: false,
        signed: false,
        codec: fixed(decode_hex, encode_hex),
        description: "hexadecimal string",
    },
    FamilyDef {
        family: Family::Oct,
        name: "oct",
        aliases: &["oct", "o"],
        length: LengthRule::MultipleOf(3),
        endianness: false,
        signed: false,
        codec: fixed(decode_oct, encode_oct),
        description: "octal string",
    },
    FamilyDef {
        family: Family::Uint,
        name: "uint",
        aliases: &["uint", "u"],
        length: LengthRule::Positive,
        endianness: true,
        signed: false,
        codec: fixed(decode_uint, encode_uint),
        description: "unsigned integer",
    },
    FamilyDef {
        family: Family::Int,
        name: "int",
        aliases: &["int", "i"],
        length: LengthRule::Positive,
        endianness: true,
        signed: true,
        codec: fixed(decode_int, encode_int),
        description: "two's complement signed integer",
    },
    FamilyDef {
        family: Family::Float,
        name: "float",
        aliases: &["float", "f"],
        length: LengthRule::OneOf(&[16, 32, 64]),
        endianness: true,
        signed: true,
        codec: fixed(decode_float, encode_float),
        description: "IEEE 754 floating point",
    },
    FamilyDef {
        family: Family::Bfloat,
        name: "bfloat",
        aliases: &["bfloat"],
        length: LengthRule::Exactly(16),
        endianness: true,
        signed: true,
        codec: fixed(decode_bfloat, encode_bfloat),
        description: "16-bit truncated single precision float",
    },
    FamilyDef {
        family: Family::E4m3Float,
        name: "e4m3float",
        aliases: &["e4m3float"],
        length: LengthRule::Exactly(8),
        endianness: false,
        signed: true,
        codec: fixed(decode_minifloat, encode_minifloat),
        description: "8-bit float with 4 exponent bits and 3 mantissa bits",
    },
    FamilyDef {
        family: Family::E5m2Float,
        name: "e5m2float",
        aliases: &["e5m2float"],
        length: LengthRule::Exactly(8),
        endianness: false,
        signed: true,
        codec: fixed(decode_minifloat, encode_minifloat),
        description: "8-bit float with 5 exponent bits and 2 mantissa bits",
    },
    FamilyDef {
        family: Family::Bytes,
        name: "bytes",
        aliases: &["bytes"],
        length: LengthRule::MultipleOf(8),
        endianness: false,
        signed: false,
        codec: fixed(decode_bytes, encode_bytes),
        description: "raw bytes",
    },
    FamilyDef {
        family: Family::Bool,
        name: "bool",
        aliases: &["bool"],
        length: LengthRule::Exactly(1),
        endianness: false,
        signed: false,
        codec: fixed(decode_bool, encode_bool),
        description: "single bit boolean",
    },
    FamilyDef {
        family: Family::Ue,
        name: "ue",
        aliases: &["ue"],
        length: LengthRule::Variable,
        endianness: false,
        signed: false,
        codec: variable(read_ue, encode_ue),
        description: "unsigned exponential-Golomb code",
    },
    FamilyDef {
        family: Family::Se,
        name: "se",
        aliases: &["se"],
        length: LengthRule::Variable,
        endianness: false,
        signed: true,
        codec: variable(read_se, encode_se),
        description: "signed exponential-Golomb code",
    },
    FamilyDef {
        family: Family::Uie,
        name: "uie",
        aliases: &["uie"],
        length: LengthRule::Variable,
        endianness: false,
        signed: false,
        codec: variable(read_uie, encode_uie),
        description: "unsigned interleaved exponential-Golomb code",
    },
    FamilyDef {
        family: Family::Sie,
        name: "sie",
        aliases: &["sie"],
        length: LengthRule::Variable,
        endianness: false,
        signed: true,
        codec: variable(read_sie, encode_sie),
        description: "signed interleaved exponential-Golomb code",
    },
];

pub(crate) fn definition(family: Family) -> &'static FamilyDef {
    &FAMILIES[family as usize]
}

/// Why a name did not resolve to a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    Unknown,
    /// The family exists but does not take a byte order.
    EndiannessNotAllowed(Family),
    /// More than one `be`/`le`/`ne` suffix.
    ConflictingSuffixes,
}

/// Name index over the family table.
pub struct Registry {
    by_name: HashMap<&'static str, Family>,
}

static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let by_name: HashMap<_, _> = FAMILIES
        .iter()
        .flat_map(|def| def.aliases.iter().map(move |alias| (*alias, def.family)))
        .collect();

    tracing::debug!(families = FAMILIES.len(), names = by_name.len(), "built dtype registry");

    Registry { by_name }
});

impl Registry {
    pub fn global() -> &'static Registry {
        &REGISTRY
    }

    /// Exact alias lookup, without endianness suffixes.
    pub fn get(&self, name: &str) -> Option<&'static FamilyDef> {
        self.by_name.get(name).map(|family| definition(*family))
    }

    /// Looks up a family name that may carry a trailing `be`/`le`/`ne`.
    pub fn lookup(&self, name: &str) -> std::result::Result<(Family, Endianness), LookupError> {
        if let Some(def) = self.get(name) {
            return Ok((def.family, Endianness::Bitwise));
        }

        let split = name
            .len()
            .checked_sub(2)
            .filter(|at| name.is_char_boundary(*at))
            .map(|at| name.split_at(at));

        let Some((stem, endianness)) =
            split.and_then(|(stem, suffix)| Some((stem, Endianness::from_suffix(suffix)?)))
        else {
            return Err(LookupError::Unknown);
        };

        match self.get(stem) {
            Some(def) if def.endianness => Ok((def.family, endianness)),
            Some(def) => Err(LookupError::EndiannessNotAllowed(def.family)),
            None if self.lookup(stem).is_ok() => Err(LookupError::ConflictingSuffixes),
            None => Err(LookupError::Unknown),
        }
    }

    /// Resolves a family name and optional explicit length into a [Dtype].
    pub fn resolve(&self, name: &str, bit_length: Option<usize>) -> Result<Dtype> {
        let (family, endianness) = self
            .lookup(name)
            .map_err(|_| Error::UnknownFamily(name.to_string()))?;

        let dtype = Dtype::new(family, bit_length, endianness)?;
        tracing::trace!(token = name, ?bit_length, %dtype, "resolved dtype");
        Ok(dtype)
    }

    /// All family definitions, in [Family] order.
    pub fn definitions(&self) -> impl Iterator<Item = &'static FamilyDef> {
        FAMILIES.iter()
    }

    /// Every accepted family spelling, without endianness suffixes.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_name.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_family() {
        for (i, def) in FAMILIES.iter().enumerate() {
            assert_eq!(def.family as usize, i, "{} is out of place", def.name);
            assert_eq!(def.aliases[0], def.name);
        }
    }

    #[test]
    fn test_short_names() {
        let registry = Registry::global();
        for (short, long) in [
            ("b", "bin"),
            ("h", "hex"),
            ("o", "oct"),
            ("u", "uint"),
            ("i", "int"),
            ("f", "float"),
        ] {
            assert_eq!(registry.get(short).map(|d| d.name), Some(long));
        }
        assert_eq!(registry.names().count(), 21);
    }

    #[test]
    fn test_lookup_suffixes() {
        let registry = Registry::global();
        assert_eq!(registry.lookup("uintle"), Ok((Family::Uint, Endianness::Little)));
        assert_eq!(registry.lookup("fbe"), Ok((Family::Float, Endianness::Big)));
        assert_eq!(registry.lookup("bfloatne"), Ok((Family::Bfloat, Endianness::Native)));
        assert_eq!(registry.lookup("se"), Ok((Family::Se, Endianness::Bitwise)));
        assert_eq!(
            registry.lookup("hexle"),
            Err(LookupError::EndiannessNotAllowed(Family::Hex))
        );
        assert_eq!(registry.lookup("uintlebe"), Err(LookupError::ConflictingSuffixes));
        assert_eq!(registry.lookup("penguin"), Err(LookupError::Unknown));
        assert_eq!(registry.lookup(""), Err(LookupError::Unknown));
    }

    #[test]
    fn test_resolve() {
        let registry = Registry::global();
        let d = registry.resolve("uint", Some(12)).unwrap();
        assert_eq!(d.to_string(), "uint12");

        assert_eq!(
            registry.resolve("penguin", None),
            Err(Error::UnknownFamily("penguin".to_string()))
        );
        assert!(matches!(
            registry.resolve("bfloat", Some(32)),
            Err(Error::InvalidLength { .. })
        ));
        assert!(matches!(
            registry.resolve("ue", Some(5)),
            Err(Error::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_definitions_are_complete() {
        let registry = Registry::global();
        assert_eq!(registry.definitions().count(), 15);
        assert!(registry.definitions().all(|def| !def.description.is_empty()));
        let variable: Vec<_> = registry
            .definitions()
            .filter(|def| matches!(def.codec, Codec::Variable { .. }))
            .map(|def| def.name)
            .collect();
        assert_eq!(variable, ["ue", "se", "uie", "sie"]);
    }
}
