//! Decode and encode entry points, dispatching through the family table.

use std::{cell::RefCell, collections::HashMap};

use num_bigint::BigInt;

use crate::{
    bits::{self, BitBuf, Bits},
    codec::Codec,
    dtype::{Dtype, Endianness, Family},
    errors::{Error, Result},
    value::Value,
};

/// Decodes the whole view. The view must hold exactly one value: its length must match
/// a fixed-width dtype's `bit_length`, and a variable-length code must use every bit.
pub fn decode(dtype: &Dtype, view: &Bits) -> Result<Value> {
    let value = match *dtype.codec() {
        Codec::Fixed { decode, .. } => {
            if let Some(len) = dtype.bit_length() {
                if view.len() != len {
                    return Err(Error::interpret(
                        dtype,
                        view.len(),
                        format!("expected exactly {len} bits"),
                    ));
                }
            }
            decode(dtype, view)?
        }
        Codec::Variable { read, .. } => {
            let (value, used) = read(dtype, view)?;
            if used != view.len() {
                return Err(Error::interpret(
                    dtype,
                    view.len(),
                    format!("{} bits left over after a {used} bit code", view.len() - used),
                ));
            }
            value
        }
    };

    tracing::trace!(%dtype, len = view.len(), %value, "decoded");
    Ok(value)
}

/// Decodes one value from the front of the view and returns it with the number of bits consumed.
///
/// Fixed-width dtypes need an explicit length here; variable-length codes delimit themselves.
pub fn read(dtype: &Dtype, view: &Bits) -> Result<(Value, usize)> {
    match *dtype.codec() {
        Codec::Fixed { decode, .. } => {
            let len = dtype.required_length()?;
            if len > view.len() {
                return Err(Error::interpret(
                    dtype,
                    view.len(),
                    format!("needs {len} bits"),
                ));
            }
            Ok((decode(dtype, &view[..len])?, len))
        }
        Codec::Variable { read, .. } => read(dtype, view),
    }
}

/// Encodes `value` into a fresh buffer.
pub fn encode(dtype: &Dtype, value: &Value) -> Result<BitBuf> {
    let mut sink = BitBuf::new();
    encode_into(dtype, value, &mut sink)?;
    Ok(sink)
}

/// Appends the encoding of `value` to `sink`. On failure the sink is left as it was.
pub fn encode_into(dtype: &Dtype, value: &Value, sink: &mut BitBuf) -> Result<()> {
    let start = sink.len();
    if let Err(e) = dtype.codec().encoder()(dtype, value, sink) {
        sink.truncate(start);
        return Err(e);
    }

    tracing::trace!(%dtype, %value, len = sink.len() - start, "encoded");
    Ok(())
}

/// Packs any view into bytes, padding the last byte with zero bits.
pub fn to_padded_bytes(view: &Bits) -> Vec<u8> {
    bits::pack_bytes(view)
}

/// Builds bits from a `0x`, `0b` or `0o` literal. Whitespace and underscores are ignored.
pub fn from_literal(literal: &str) -> Result<BitBuf> {
    let tidied: String = literal
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect::<String>()
        .to_lowercase();

    let (family, value) = if let Some(digits) = tidied.strip_prefix("0x") {
        (Family::Hex, Value::Hex(digits.to_string()))
    } else if let Some(digits) = tidied.strip_prefix("0b") {
        (Family::Bin, Value::Bin(digits.to_string()))
    } else if let Some(digits) = tidied.strip_prefix("0o") {
        (Family::Oct, Value::Oct(digits.to_string()))
    } else {
        return Err(Error::value(
            "literal",
            format!("'{literal}' needs a 0x, 0b or 0o prefix"),
        ));
    };

    encode(&Dtype::of(family), &value)
}

fn mismatch(dtype: &Dtype, expected: &str) -> Error {
    Error::interpret(dtype, 0, format!("decoder did not produce {expected}"))
}

/// Property-style access to a bit view: each method decodes the whole view as one value.
///
/// Only [Interpret::as_bits] is required.
pub trait Interpret {
    fn as_bits(&self) -> &Bits;

    fn interpret(&self, dtype: &Dtype) -> Result<Value> {
        decode(dtype, self.as_bits())
    }

    /// Resolves `token` and decodes the whole view with it.
    fn interpret_token(&self, token: &str) -> Result<Value> {
        self.interpret(&crate::token::resolve_token(token)?)
    }

    fn bin(&self) -> Result<String> {
        string(self, Family::Bin)
    }

    fn hex(&self) -> Result<String> {
        string(self, Family::Hex)
    }

    fn oct(&self) -> Result<String> {
        string(self, Family::Oct)
    }

    fn uint(&self) -> Result<BigInt> {
        int(self, Family::Uint, Endianness::Bitwise)
    }

    fn uintbe(&self) -> Result<BigInt> {
        int(self, Family::Uint, Endianness::Big)
    }

    fn uintle(&self) -> Result<BigInt> {
        int(self, Family::Uint, Endianness::Little)
    }

    fn uintne(&self) -> Result<BigInt> {
        int(self, Family::Uint, Endianness::Native)
    }

    fn int(&self) -> Result<BigInt> {
        int(self, Family::Int, Endianness::Bitwise)
    }

    fn intbe(&self) -> Result<BigInt> {
        int(self, Family::Int, Endianness::Big)
    }

    fn intle(&self) -> Result<BigInt> {
        int(self, Family::Int, Endianness::Little)
    }

    fn intne(&self) -> Result<BigInt> {
        int(self, Family::Int, Endianness::Native)
    }

    fn float(&self) -> Result<f64> {
        float(self, Family::Float, Endianness::Bitwise)
    }

    fn floatbe(&self) -> Result<f64> {
        float(self, Family::Float, Endianness::Big)
    }

    fn floatle(&self) -> Result<f64> {
        float(self, Family::Float, Endianness::Little)
    }

    fn floatne(&self) -> Result<f64> {
        float(self, Family::Float, Endianness::Native)
    }

    fn bfloat(&self) -> Result<f64> {
        float(self, Family::Bfloat, Endianness::Bitwise)
    }

    fn bfloatbe(&self) -> Result<f64> {
        float(self, Family::Bfloat, Endianness::Big)
    }

    fn bfloatle(&self) -> Result<f64> {
        float(self, Family::Bfloat, Endianness::Little)
    }

    fn bfloatne(&self) -> Result<f64> {
        float(self, Family::Bfloat, Endianness::Native)
    }

    fn e4m3float(&self) -> Result<f64> {
        float(self, Family::E4m3Float, Endianness::Bitwise)
    }

    fn e5m2float(&self) -> Result<f64> {
        float(self, Family::E5m2Float, Endianness::Bitwise)
    }

    /// Strict: fails unless the view is a whole number of bytes.
    fn bytes(&self) -> Result<Vec<u8>> {
        let dtype = Dtype::of(Family::Bytes);
        self.interpret(&dtype)?
            .into_bytes()
            .ok_or_else(|| mismatch(&dtype, "bytes"))
    }

    /// Never fails: the last byte is padded with zero bits.
    fn tobytes(&self) -> Vec<u8> {
        to_padded_bytes(self.as_bits())
    }

    fn bool(&self) -> Result<bool> {
        let dtype = Dtype::of(Family::Bool);
        self.interpret(&dtype)?
            .as_bool()
            .ok_or_else(|| mismatch(&dtype, "a bool"))
    }

    fn ue(&self) -> Result<BigInt> {
        int(self, Family::Ue, Endianness::Bitwise)
    }

    fn se(&self) -> Result<BigInt> {
        int(self, Family::Se, Endianness::Bitwise)
    }

    fn uie(&self) -> Result<BigInt> {
        int(self, Family::Uie, Endianness::Bitwise)
    }

    fn sie(&self) -> Result<BigInt> {
        int(self, Family::Sie, Endianness::Bitwise)
    }
}

fn string<I: Interpret + ?Sized>(view: &I, family: Family) -> Result<String> {
    let dtype = Dtype::of(family);
    view.interpret(&dtype)?
        .into_string()
        .ok_or_else(|| mismatch(&dtype, "a string"))
}

fn int<I: Interpret + ?Sized>(view: &I, family: Family, endianness: Endianness) -> Result<BigInt> {
    let dtype = Dtype::new(family, None, endianness)?;
    view.interpret(&dtype)?
        .into_int()
        .ok_or_else(|| mismatch(&dtype, "an integer"))
}

fn float<I: Interpret + ?Sized>(view: &I, family: Family, endianness: Endianness) -> Result<f64> {
    let dtype = Dtype::new(family, None, endianness)?;
    view.interpret(&dtype)?
        .as_float()
        .ok_or_else(|| mismatch(&dtype, "a float"))
}

impl Interpret for Bits {
    fn as_bits(&self) -> &Bits {
        self
    }
}

impl Interpret for BitBuf {
    fn as_bits(&self) -> &Bits {
        self.as_bitslice()
    }
}

/// A view that remembers each successful interpretation.
///
/// Decoding is deterministic in (dtype, bits), so repeated property access on the
/// same immutable view can return the cached value. Failures are not cached.
#[derive(Debug)]
pub struct CachedView<'a> {
    bits: &'a Bits,
    cache: RefCell<HashMap<Dtype, Value>>,
}

impl<'a> CachedView<'a> {
    pub fn new(bits: &'a Bits) -> Self {
        CachedView {
            bits,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Number of distinct interpretations held.
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl Interpret for CachedView<'_> {
    fn as_bits(&self) -> &Bits {
        self.bits
    }

    fn interpret(&self, dtype: &Dtype) -> Result<Value> {
        if let Some(value) = self.cache.borrow().get(dtype) {
            return Ok(value.clone());
        }

        let value = decode(dtype, self.bits)?;
        self.cache.borrow_mut().insert(*dtype, value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitvec::prelude::*;

    #[test]
    fn test_decode_checks_fixed_length() {
        let d: Dtype = "uint12".parse().unwrap();
        let data = [0xffu8, 0xf0];
        let view = data.view_bits::<Msb0>();
        assert_eq!(decode(&d, &view[..12]).unwrap(), Value::from(4095));
        assert!(matches!(decode(&d, view), Err(Error::Interpret { .. })));
    }

    #[test]
    fn test_decode_requires_exactly_one_code() {
        let d = Dtype::of(Family::Ue);
        let two_codes = bits![u8, Msb0; 0, 1, 0, 1];
        assert!(matches!(decode(&d, two_codes), Err(Error::Interpret { .. })));
        assert_eq!(read(&d, two_codes).unwrap(), (Value::from(1), 3));
        assert_eq!(decode(&d, &two_codes[3..]).unwrap(), Value::from(0));
    }

    #[test]
    fn test_read_fixed_width() {
        let data = [0xabu8, 0xcd];
        let view = data.view_bits::<Msb0>();
        let d: Dtype = "hex8".parse().unwrap();
        assert_eq!(read(&d, view).unwrap(), (Value::Hex("ab".to_string()), 8));
        assert!(matches!(read(&d, &view[12..]), Err(Error::Interpret { .. })));

        // No length: nothing says how far to read.
        assert!(matches!(
            read(&Dtype::of(Family::Uint), view),
            Err(Error::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_encode_into_restores_sink_on_error() {
        let mut sink = BitBuf::new();
        sink.push(true);
        let d: Dtype = "uint4".parse().unwrap();
        assert!(encode_into(&d, &Value::from(16), &mut sink).is_err());
        assert_eq!(sink.as_bitslice(), bits![u8, Msb0; 1]);

        encode_into(&d, &Value::from(5), &mut sink).unwrap();
        assert_eq!(sink.as_bitslice(), bits![u8, Msb0; 1, 0, 1, 0, 1]);
    }

    #[test]
    fn test_from_literal() {
        assert_eq!(from_literal("0x3ff").unwrap().len(), 12);
        assert_eq!(from_literal("0b1_01").unwrap().as_bitslice(), bits![u8, Msb0; 1, 0, 1]);
        assert_eq!(from_literal("0O7").unwrap().len(), 3);
        assert!(matches!(from_literal("3ff"), Err(Error::Value { .. })));
        assert!(matches!(from_literal("0xfg"), Err(Error::Value { .. })));
    }

    #[test]
    fn test_property_accessors() {
        let data = [0x12u8, 0x3f];
        let view = &data.view_bits::<Msb0>()[..12];
        assert_eq!(view.hex().unwrap(), "123");
        assert_eq!(view.uint().unwrap(), BigInt::from(291));
        assert_eq!(view.bin().unwrap(), "000100100011");
        assert_eq!(view.oct().unwrap(), "0443");
        assert!(view.bytes().is_err());
        assert_eq!(view.tobytes(), vec![0x12, 0x30]);
        assert!(view.uintle().is_err());

        let full = data.view_bits::<Msb0>();
        assert_eq!(full.uintle().unwrap(), BigInt::from(0x3f12));
        assert_eq!(full.intbe().unwrap(), BigInt::from(0x123f));
        assert_eq!(full.bytes().unwrap(), vec![0x12, 0x3f]);
    }

    #[test]
    fn test_interpret_token() {
        let data = [0xffu8];
        let view = data.view_bits::<Msb0>();
        assert_eq!(view.interpret_token("int8").unwrap(), Value::from(-1));
        assert_eq!(view.interpret_token("e4m3float").unwrap(), Value::Float(-240.0));
        assert!(view.interpret_token("int16").is_err());
    }

    #[test]
    fn test_cached_view() {
        let data = [0x80u8];
        let view = CachedView::new(data.view_bits::<Msb0>());
        assert_eq!(view.int().unwrap(), BigInt::from(-128));
        assert_eq!(view.int().unwrap(), BigInt::from(-128));
        assert_eq!(view.uint().unwrap(), BigInt::from(128));
        assert!(view.e4m3float().unwrap().is_nan());
        assert!(view.ue().is_err());
        assert_eq!(view.cached(), 3);
    }

    #[test]
    fn test_bitbuf_is_interpretable() {
        let buf = encode(&"se".parse().unwrap(), &Value::from(-5)).unwrap();
        assert_eq!(buf.se().unwrap(), BigInt::from(-5));
    }
}
