//! Non-IEEE-754-native floats: bfloat16 and the two 8-bit formats.
//!
//! The 8-bit formats have no infinities and no negative zero. Code `0x80` is the
//! single NaN, and encoding saturates to the largest finite magnitude.

use half::f16;
use once_cell::sync::Lazy;

use super::{expect_float, with_byte_order, write_byte_order};
use crate::{
    bits::{self, BitBuf, Bits},
    dtype::{Dtype, Family},
    errors::{Error, Result},
    value::Value,
};

pub fn decode_bfloat(dtype: &Dtype, view: &Bits) -> Result<Value> {
    if view.len() != 16 {
        return Err(Error::interpret(dtype, view.len(), "bfloat must be 16 bits"));
    }

    with_byte_order(dtype, view, |bits| {
        let raw = bits::read_u64(bits) as u32;
        Ok(Value::Float(f32::from_bits(raw << 16) as f64))
    })
}

pub fn encode_bfloat(dtype: &Dtype, value: &Value, sink: &mut BitBuf) -> Result<()> {
    let f = expect_float(dtype, value)?;
    // Truncates the low mantissa bits of the f32; out-of-range values are already infinite.
    let raw = (f as f32).to_bits() >> 16;

    write_byte_order(dtype, sink, |out| {
        bits::push_u64(out, raw as u64, 16);
        Ok(())
    })
}

/// An 8-bit float layout: 1 sign bit, `exp_bits` exponent bits, the rest mantissa.
#[derive(Debug)]
pub struct Minifloat {
    name: &'static str,
    exp_bits: u32,
    bias: i32,
    table: [f64; 256],
}

pub static E4M3: Lazy<Minifloat> = Lazy::new(|| Minifloat::new("e4m3float", 4, 8));
pub static E5M2: Lazy<Minifloat> = Lazy::new(|| Minifloat::new("e5m2float", 5, 16));

impl Minifloat {
    fn new(name: &'static str, exp_bits: u32, bias: i32) -> Self {
        let man_bits = 7 - exp_bits;
        let mut table = [0.0; 256];

        for (code, slot) in table.iter_mut().enumerate() {
            let code = code as u32;
            let exponent = ((code >> man_bits) & ((1 << exp_bits) - 1)) as i32;
            let mantissa = (code & ((1 << man_bits) - 1)) as f64 / (1u32 << man_bits) as f64;

            let magnitude = if exponent == 0 {
                mantissa * 2f64.powi(1 - bias)
            } else {
                (1.0 + mantissa) * 2f64.powi(exponent - bias)
            };

            *slot = if code & 0x80 != 0 { -magnitude } else { magnitude };
        }
        table[0x80] = f64::NAN;

        tracing::debug!(format = name, exp_bits, bias, max = table[0x7f], "built minifloat table");

        Minifloat {
            name,
            exp_bits,
            bias,
            table,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn exp_bits(&self) -> u32 {
        self.exp_bits
    }

    pub fn bias(&self) -> i32 {
        self.bias
    }

    /// Largest finite magnitude.
    pub fn max(&self) -> f64 {
        self.table[0x7f]
    }

    pub fn to_f64(&self, code: u8) -> f64 {
        self.table[code as usize]
    }

    /// Rounds to half precision, then truncates toward zero onto this format's grid.
    pub fn from_f64(&self, f: f64) -> u8 {
        let f = f16::from_f64(f).to_f64();
        if f.is_nan() {
            return 0x80;
        }

        // Positive codes are monotonic, so the largest one not above |f| is the truncation.
        let positives = &self.table[..0x80];
        let index = positives.partition_point(|&x| x <= f.abs()) - 1;

        if f.is_sign_negative() && index != 0 {
            0x80 | index as u8
        } else {
            index as u8
        }
    }
}

fn minifloat(family: Family) -> &'static Minifloat {
    match family {
        Family::E4m3Float => &E4M3,
        _ => &E5M2,
    }
}

pub fn decode_minifloat(dtype: &Dtype, view: &Bits) -> Result<Value> {
    if view.len() != 8 {
        return Err(Error::interpret(dtype, view.len(), "8-bit floats must be 8 bits"));
    }

    let code = bits::read_u64(view) as u8;
    Ok(Value::Float(minifloat(dtype.family()).to_f64(code)))
}

pub fn encode_minifloat(dtype: &Dtype, value: &Value, sink: &mut BitBuf) -> Result<()> {
    let f = expect_float(dtype, value)?;
    let code = minifloat(dtype.family()).from_f64(f);
    bits::push_u64(sink, code as u64, 8);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Endianness;
    use bitvec::prelude::*;
    use test_case::test_case;

    #[test]
    fn test_table_extremes() {
        assert_eq!(E4M3.max(), 240.0);
        assert_eq!(E5M2.max(), 57344.0);
        assert_eq!(E4M3.to_f64(0xff), -240.0);
        assert_eq!(E4M3.to_f64(0x00), 0.0);
        assert!(E4M3.to_f64(0x80).is_nan());
        assert!(E5M2.to_f64(0x80).is_nan());
    }

    #[test_case(0x08, 2f64.powi(-7); "e4m3 smallest normal")]
    #[test_case(0x01, 2f64.powi(-10); "e4m3 smallest subnormal")]
    #[test_case(0x38, 0.5; "e4m3 half")]
    fn test_e4m3_codes(code: u8, expected: f64) {
        assert_eq!(E4M3.to_f64(code), expected);
    }

    #[test]
    fn test_e5m2_codes() {
        assert_eq!(E5M2.to_f64(0x04), 2f64.powi(-15));
        assert_eq!(E5M2.to_f64(0x01), 2f64.powi(-17));
    }

    #[test_case(&E4M3, 1e9, 0x7f; "e4m3 saturates")]
    #[test_case(&E4M3, -9000.0, 0xff; "e4m3 saturates negative")]
    #[test_case(&E5M2, f64::INFINITY, 0x7f; "e5m2 inf saturates")]
    #[test_case(&E5M2, f64::NEG_INFINITY, 0xff; "e5m2 negative inf saturates")]
    #[test_case(&E5M2, f64::NAN, 0x80; "nan")]
    #[test_case(&E5M2, -1e-11, 0x00; "no negative zero")]
    #[test_case(&E4M3, -14.0, 0xde; "exact negative")]
    fn test_from_f64(format: &Lazy<Minifloat>, f: f64, expected: u8) {
        assert_eq!(format.from_f64(f), expected);
    }

    #[test]
    fn test_truncates_toward_zero() {
        // 17 sits between 16 and 18 on the e4m3 grid.
        assert_eq!(E4M3.to_f64(E4M3.from_f64(17.0)), 16.0);
        assert_eq!(E4M3.to_f64(E4M3.from_f64(-17.0)), -16.0);
    }

    #[test]
    fn test_every_code_round_trips() {
        for format in [&E4M3, &E5M2] {
            for code in (0..=255u8).filter(|&c| c != 0x80) {
                assert_eq!(format.from_f64(format.to_f64(code)), code, "{}", format.name());
            }
        }
    }

    #[test]
    fn test_bfloat_truncates() {
        let d = Dtype::of(Family::Bfloat);
        let mut sink = BitBuf::new();
        encode_bfloat(&d, &Value::from(1.0 + 2f64.powi(-10)), &mut sink).unwrap();
        assert_eq!(decode_bfloat(&d, &sink).unwrap(), Value::Float(1.0));
    }

    #[test]
    fn test_bfloat_little_endian() {
        let d = Dtype::new(Family::Bfloat, None, Endianness::Little).unwrap();
        let mut sink = BitBuf::new();
        encode_bfloat(&d, &Value::from(-2.0), &mut sink).unwrap();
        assert_eq!(bits::pack_bytes(&sink), vec![0x00, 0xc0]);
        assert_eq!(decode_bfloat(&d, &sink).unwrap(), Value::Float(-2.0));
    }

    #[test]
    fn test_bfloat_overflow_is_infinite() {
        let d = Dtype::of(Family::Bfloat);
        let mut sink = BitBuf::new();
        encode_bfloat(&d, &Value::from(1e300), &mut sink).unwrap();
        assert_eq!(decode_bfloat(&d, &sink).unwrap(), Value::Float(f64::INFINITY));
    }

    #[test]
    fn test_wrong_widths() {
        let view = bits![u8, Msb0; 0; 9];
        assert!(matches!(
            decode_minifloat(&Dtype::of(Family::E4m3Float), view),
            Err(Error::Interpret { .. })
        ));
        assert!(matches!(
            decode_bfloat(&Dtype::of(Family::Bfloat), view),
            Err(Error::Interpret { .. })
        ));
    }
}
