//! # bitinterp
//!
//! Bit-level data interpretation: convert arbitrary-length, not necessarily
//! byte-aligned bit sequences to and from typed values.
//!
//! A textual token such as `"uintle32"`, `"hex"` or `"se"` resolves to a [Dtype].
//! The dtype's family selects a codec from a static table, and decoding either
//! succeeds with a fully formed [Value] or fails. Nothing is silently truncated
//! or padded.
//!
//! Supported families: binary, hex and octal strings; unsigned and two's complement
//! integers of any width in bit-wise, big, little or native byte order; IEEE 754
//! floats of 16, 32 and 64 bits; bfloat16; the 8-bit `e4m3float` and `e5m2float`
//! formats; raw bytes; single-bit bools; and plain or interleaved exponential-Golomb
//! codes.
//!
//! ## Example
//!
//! ```
//! use bitinterp::{BitReader, Dtype, Interpret, Value};
//! use bitinterp::bitvec::prelude::*;
//!
//! let data = [0x12u8, 0x30];
//! let view = &data.view_bits::<Msb0>()[..12];
//! assert_eq!(view.hex().unwrap(), "123");
//! assert!(view.bytes().is_err());
//!
//! let dtype: Dtype = "uint:12".parse().unwrap();
//! assert_eq!(dtype.parse("0x3ff").unwrap(), Value::from(1023));
//!
//! let ue: Dtype = "ue".parse().unwrap();
//! let bits = ue.build(&Value::from(12)).unwrap();
//! assert_eq!(bits.len(), 7);
//!
//! let mut reader = BitReader::from_bytes(&[0x16, 0x4b]);
//! let se: Dtype = "se".parse().unwrap();
//! assert_eq!(reader.read(&se).unwrap(), Value::from(-5));
//! ```

pub mod bit_reader;
pub mod bits;
pub mod codec;
pub mod dtype;
pub mod errors;
pub mod interpret;
pub mod registry;
#[cfg(feature = "serde")]
mod serde;
pub mod token;
pub mod value;

pub use bit_reader::BitReader;
pub use bits::{BitBuf, Bits};
pub use dtype::{Dtype, Endianness, Family, LengthRule};
pub use errors::{Error, Result};
pub use interpret::{CachedView, Interpret, decode, encode, encode_into, read};
pub use registry::{FamilyDef, Registry};
pub use token::{Token, resolve_token};
pub use value::Value;

pub use bitvec;

/// Resolves a family name (with optional `be`/`le`/`ne` suffix) and explicit length.
pub fn resolve(name: &str, bit_length: Option<usize>) -> Result<Dtype> {
    Registry::global().resolve(name, bit_length)
}
