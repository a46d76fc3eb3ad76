//! Binary, hex and octal strings, integers, IEEE-754 floats, bytes and bools.

use bitvec::prelude::*;
use half::f16;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

use super::{check_whole_bytes, expect_float, expect_int, with_byte_order, write_byte_order};
use crate::{
    bits::{self, BitBuf, Bits},
    dtype::Dtype,
    errors::{Error, Result},
    value::Value,
};

/// Digit grouping for the string families.
struct Radix {
    bits_per_digit: usize,
    radix: u32,
    prefix: &'static str,
}

const BIN: Radix = Radix {
    bits_per_digit: 1,
    radix: 2,
    prefix: "0b",
};

const HEX: Radix = Radix {
    bits_per_digit: 4,
    radix: 16,
    prefix: "0x",
};

const OCT: Radix = Radix {
    bits_per_digit: 3,
    radix: 8,
    prefix: "0o",
};

/// Lowercases and strips whitespace, underscores and the radix prefix.
fn tidy(s: &str, prefix: &str) -> String {
    let tidied: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect::<String>()
        .to_lowercase();

    match tidied.strip_prefix(prefix) {
        Some(rest) => rest.to_string(),
        None => tidied,
    }
}

fn decode_digits(dtype: &Dtype, view: &Bits, radix: &Radix) -> Result<String> {
    if view.len() % radix.bits_per_digit != 0 {
        return Err(Error::interpret(
            dtype,
            view.len(),
            format!("length is not a multiple of {}", radix.bits_per_digit),
        ));
    }

    view.chunks_exact(radix.bits_per_digit)
        .map(|group| {
            char::from_digit(bits::read_u64(group) as u32, radix.radix)
                .ok_or_else(|| Error::interpret(dtype, view.len(), "digit out of range"))
        })
        .collect()
}

fn encode_digits(dtype: &Dtype, digits: &str, radix: &Radix, sink: &mut BitBuf) -> Result<()> {
    let digits = tidy(digits, radix.prefix);
    let produced = digits.len() * radix.bits_per_digit;

    if let Some(len) = dtype.bit_length() {
        if produced != len {
            return Err(Error::value(
                dtype,
                format!("'{digits}' is {produced} bits, expected {len}"),
            ));
        }
    }

    let mut out = BitBuf::with_capacity(produced);
    for c in digits.chars() {
        let digit = c
            .to_digit(radix.radix)
            .ok_or_else(|| Error::value(dtype, format!("invalid character '{c}' in '{digits}'")))?;
        bits::push_u64(&mut out, digit as u64, radix.bits_per_digit);
    }

    sink.extend_from_bitslice(out.as_bitslice());
    Ok(())
}

fn expect_digits<'v>(dtype: &Dtype, value: &'v Value) -> Result<&'v str> {
    let matches = matches!(
        (dtype.family(), value),
        (crate::Family::Bin, Value::Bin(_))
            | (crate::Family::Hex, Value::Hex(_))
            | (crate::Family::Oct, Value::Oct(_))
    );

    match value.as_str() {
        Some(s) if matches => Ok(s),
        _ => Err(Error::value(
            dtype,
            format!("expected a {} string, got {}", dtype.name(), value.kind()),
        )),
    }
}

pub fn decode_bin(dtype: &Dtype, view: &Bits) -> Result<Value> {
    decode_digits(dtype, view, &BIN).map(Value::Bin)
}

pub fn encode_bin(dtype: &Dtype, value: &Value, sink: &mut BitBuf) -> Result<()> {
    encode_digits(dtype, expect_digits(dtype, value)?, &BIN, sink)
}

pub fn decode_hex(dtype: &Dtype, view: &Bits) -> Result<Value> {
    decode_digits(dtype, view, &HEX).map(Value::Hex)
}

pub fn encode_hex(dtype: &Dtype, value: &Value, sink: &mut BitBuf) -> Result<()> {
    encode_digits(dtype, expect_digits(dtype, value)?, &HEX, sink)
}

pub fn decode_oct(dtype: &Dtype, view: &Bits) -> Result<Value> {
    decode_digits(dtype, view, &OCT).map(Value::Oct)
}

pub fn encode_oct(dtype: &Dtype, value: &Value, sink: &mut BitBuf) -> Result<()> {
    encode_digits(dtype, expect_digits(dtype, value)?, &OCT, sink)
}

pub fn decode_uint(dtype: &Dtype, view: &Bits) -> Result<Value> {
    if view.is_empty() {
        return Err(Error::interpret(dtype, 0, "cannot interpret an empty view"));
    }

    with_byte_order(dtype, view, |bits| {
        Ok(Value::Int(BigInt::from(bits::to_biguint(bits))))
    })
}

pub fn encode_uint(dtype: &Dtype, value: &Value, sink: &mut BitBuf) -> Result<()> {
    let n = dtype.required_length()?;
    let v = expect_int(dtype, value)?;

    let magnitude = match v.sign() {
        Sign::Minus => {
            return Err(Error::value(
                dtype,
                format!("{v} is negative; unsigned range is [0, 2^{n} - 1]"),
            ));
        }
        _ => v.magnitude(),
    };

    if magnitude.bits() as usize > n {
        return Err(Error::value(
            dtype,
            format!("{v} does not fit in {n} bits; allowed range is [0, {}]", max_unsigned(n)),
        ));
    }

    write_byte_order(dtype, sink, |out| {
        bits::push_biguint(out, magnitude, n);
        Ok(())
    })
}

pub fn decode_int(dtype: &Dtype, view: &Bits) -> Result<Value> {
    if view.is_empty() {
        return Err(Error::interpret(dtype, 0, "cannot interpret an empty view"));
    }

    with_byte_order(dtype, view, |bits| {
        Ok(Value::Int(bits::sign_extend(
            bits::to_biguint(bits),
            bits.len(),
        )))
    })
}

pub fn encode_int(dtype: &Dtype, value: &Value, sink: &mut BitBuf) -> Result<()> {
    let n = dtype.required_length()?;
    let v = expect_int(dtype, value)?;

    let half = BigInt::one() << (n - 1);
    let min = -half.clone();
    let max = half - 1;
    if *v < min || *v > max {
        return Err(Error::value(
            dtype,
            format!("{v} does not fit in {n} bits; allowed range is [{min}, {max}]"),
        ));
    }

    let raw: BigUint = if v.sign() == Sign::Minus {
        (v + (BigInt::one() << n)).magnitude().clone()
    } else {
        v.magnitude().clone()
    };

    write_byte_order(dtype, sink, |out| {
        bits::push_biguint(out, &raw, n);
        Ok(())
    })
}

fn max_unsigned(n: usize) -> BigUint {
    (BigUint::one() << n) - BigUint::one()
}

pub fn decode_float(dtype: &Dtype, view: &Bits) -> Result<Value> {
    let len = view.len();
    if !matches!(len, 16 | 32 | 64) {
        return Err(Error::interpret(
            dtype,
            len,
            "floats must be 16, 32 or 64 bits long",
        ));
    }

    with_byte_order(dtype, view, |bits| {
        let raw = bits::read_u64(bits);
        let f = match len {
            16 => f16::from_bits(raw as u16).to_f64(),
            32 => f32::from_bits(raw as u32) as f64,
            _ => f64::from_bits(raw),
        };
        Ok(Value::Float(f))
    })
}

pub fn encode_float(dtype: &Dtype, value: &Value, sink: &mut BitBuf) -> Result<()> {
    let n = dtype.required_length()?;
    let f = expect_float(dtype, value)?;

    // Out-of-range magnitudes become infinities, as the native conversions do.
    let raw = match n {
        16 => f16::from_f64(f).to_bits() as u64,
        32 => (f as f32).to_bits() as u64,
        _ => f.to_bits(),
    };

    write_byte_order(dtype, sink, |out| {
        bits::push_u64(out, raw, n);
        Ok(())
    })
}

pub fn decode_bytes(dtype: &Dtype, view: &Bits) -> Result<Value> {
    check_whole_bytes(dtype, view.len())?;
    Ok(Value::Bytes(bits::pack_bytes(view)))
}

pub fn encode_bytes(dtype: &Dtype, value: &Value, sink: &mut BitBuf) -> Result<()> {
    let bytes = value.as_bytes().ok_or_else(|| {
        Error::value(dtype, format!("expected bytes, got {}", value.kind()))
    })?;

    if let Some(len) = dtype.bit_length() {
        if bytes.len() * 8 != len {
            return Err(Error::value(
                dtype,
                format!("{} bytes is {} bits, expected {len}", bytes.len(), bytes.len() * 8),
            ));
        }
    }

    sink.extend_from_bitslice(bytes.view_bits::<Msb0>());
    Ok(())
}

pub fn decode_bool(dtype: &Dtype, view: &Bits) -> Result<Value> {
    match view.first() {
        Some(bit) if view.len() == 1 => Ok(Value::Bool(*bit)),
        _ => Err(Error::interpret(dtype, view.len(), "bool must be exactly 1 bit")),
    }
}

pub fn encode_bool(dtype: &Dtype, value: &Value, sink: &mut BitBuf) -> Result<()> {
    let bit = match value {
        Value::Bool(b) => *b,
        Value::Int(i) if i.is_zero() => false,
        Value::Int(i) if i.is_one() => true,
        other => {
            return Err(Error::value(
                dtype,
                format!("expected a bool or 0/1, got {other}"),
            ));
        }
    };

    sink.push(bit);
    Ok(())
}
