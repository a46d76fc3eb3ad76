//! Codec function pairs bound to each family in the registry.
//!
//! Fixed-width codecs receive a view whose length the caller has already matched
//! against the dtype's `bit_length` (when it has one). Variable-length codecs
//! receive the rest of the input and report how many bits one code consumed.

pub mod exotic;
pub mod fixed;
pub mod golomb;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::{
    bits::{self, BitBuf, Bits},
    dtype::{Dtype, Endianness},
    errors::{Error, Result},
    value::Value,
};

/// Decodes a whole fixed-width view.
pub type DecodeFn = fn(&Dtype, &Bits) -> Result<Value>;
/// Decodes one self-delimiting code from the front of the view.
///
/// Returns the value and the number of bits consumed.
pub type ReadFn = fn(&Dtype, &Bits) -> Result<(Value, usize)>;
/// Appends the encoding of a value to the sink.
pub type EncodeFn = fn(&Dtype, &Value, &mut BitBuf) -> Result<()>;

/// The codec pair a family dispatches to.
#[derive(Debug, Clone, Copy)]
pub enum Codec {
    Fixed { decode: DecodeFn, encode: EncodeFn },
    Variable { read: ReadFn, encode: EncodeFn },
}

impl Codec {
    pub fn encoder(&self) -> EncodeFn {
        match *self {
            Codec::Fixed { encode, .. } | Codec::Variable { encode, .. } => encode,
        }
    }
}

pub(crate) fn expect_int<'v>(dtype: &Dtype, value: &'v Value) -> Result<&'v BigInt> {
    value
        .as_int()
        .ok_or_else(|| Error::value(dtype, format!("expected an integer, got {}", value.kind())))
}

pub(crate) fn expect_float(dtype: &Dtype, value: &Value) -> Result<f64> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Int(i) => i
            .to_f64()
            .ok_or_else(|| Error::value(dtype, format!("{i} has no float representation"))),
        other => Err(Error::value(
            dtype,
            format!("expected a float, got {}", other.kind()),
        )),
    }
}

/// Fails unless `len` is a whole number of bytes. Byte-wise operations share this check.
pub(crate) fn check_whole_bytes(dtype: &Dtype, len: usize) -> Result<()> {
    if len % 8 != 0 {
        return Err(Error::value(
            dtype,
            format!("{len} bits is not a whole number of bytes"),
        ));
    }

    Ok(())
}

/// Runs `f` over the view in big-endian order, reversing bytes first for little-endian dtypes.
pub(crate) fn with_byte_order<R>(
    dtype: &Dtype,
    view: &Bits,
    f: impl FnOnce(&Bits) -> Result<R>,
) -> Result<R> {
    let endianness = dtype.endianness().resolve();
    if endianness.is_bytewise() {
        check_whole_bytes(dtype, view.len())?;
    }

    if endianness == Endianness::Little {
        f(&bits::reverse_bytes(view))
    } else {
        f(view)
    }
}

/// Runs `f` to produce big-endian output, reversing its bytes before appending
/// for little-endian dtypes.
pub(crate) fn write_byte_order(
    dtype: &Dtype,
    sink: &mut BitBuf,
    f: impl FnOnce(&mut BitBuf) -> Result<()>,
) -> Result<()> {
    if dtype.endianness().resolve() != Endianness::Little {
        return f(sink);
    }

    let mut scratch = BitBuf::new();
    f(&mut scratch)?;
    check_whole_bytes(dtype, scratch.len())?;
    sink.extend_from_bitslice(bits::reverse_bytes(&scratch).as_bitslice());
    Ok(())
}
