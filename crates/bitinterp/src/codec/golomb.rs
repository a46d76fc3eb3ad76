//! Exponential-Golomb codes, plain and interleaved.
//!
//! Every reader returns the decoded value together with the number of bits the
//! code occupied; the caller decides whether leftover bits are an error.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

use super::expect_int;
use crate::{
    bits::{self, BitBuf, Bits},
    dtype::Dtype,
    errors::{Error, Result},
    value::Value,
};

fn truncated(dtype: &Dtype, view: &Bits) -> Error {
    Error::interpret(
        dtype,
        view.len(),
        "ran out of bits before the end of the code",
    )
}

fn read_ue_raw(dtype: &Dtype, view: &Bits) -> Result<(BigUint, usize)> {
    let zeros = view.leading_zeros();
    if zeros == view.len() {
        return Err(truncated(dtype, view));
    }

    let end = 2 * zeros + 1;
    if end > view.len() {
        return Err(truncated(dtype, view));
    }

    // Prefix one bit plus payload is the binary form of n + 1.
    let n = bits::to_biguint(&view[zeros..end]) - BigUint::one();
    Ok((n, end))
}

fn write_ue_raw(n: &BigUint, sink: &mut BitBuf) {
    let m = n + BigUint::one();
    let width = m.bits() as usize;
    sink.resize(sink.len() + width - 1, false);
    bits::push_biguint(sink, &m, width);
}

fn fold_signed(u: BigUint) -> BigInt {
    if u.bit(0) {
        BigInt::from((u + BigUint::one()) >> 1)
    } else {
        -BigInt::from(u >> 1)
    }
}

fn unfold_signed(n: &BigInt) -> BigUint {
    match n.sign() {
        Sign::Plus => (n.magnitude() << 1) - BigUint::one(),
        _ => n.magnitude() << 1,
    }
}

fn expect_unsigned<'v>(dtype: &Dtype, value: &'v Value) -> Result<&'v BigUint> {
    let v = expect_int(dtype, value)?;
    if v.sign() == Sign::Minus {
        return Err(Error::value(
            dtype,
            format!("{v} is negative; {} codes only hold non-negative integers", dtype.name()),
        ));
    }

    Ok(v.magnitude())
}

pub fn read_ue(dtype: &Dtype, view: &Bits) -> Result<(Value, usize)> {
    let (n, used) = read_ue_raw(dtype, view)?;
    Ok((Value::from(n), used))
}

pub fn encode_ue(dtype: &Dtype, value: &Value, sink: &mut BitBuf) -> Result<()> {
    write_ue_raw(expect_unsigned(dtype, value)?, sink);
    Ok(())
}

pub fn read_se(dtype: &Dtype, view: &Bits) -> Result<(Value, usize)> {
    let (u, used) = read_ue_raw(dtype, view)?;
    Ok((Value::Int(fold_signed(u)), used))
}

pub fn encode_se(dtype: &Dtype, value: &Value, sink: &mut BitBuf) -> Result<()> {
    write_ue_raw(&unfold_signed(expect_int(dtype, value)?), sink);
    Ok(())
}

/// Reads `0 b1 0 b2 ... 0 bk 1`, where `1 b1 ... bk` is n + 1.
fn read_uie_raw(dtype: &Dtype, view: &Bits) -> Result<(BigUint, usize)> {
    let mut acc = BigUint::one();
    let mut pos = 0;

    loop {
        let stop = view.get(pos).ok_or_else(|| truncated(dtype, view))?;
        if *stop {
            return Ok((acc - BigUint::one(), pos + 1));
        }

        let bit = view.get(pos + 1).ok_or_else(|| truncated(dtype, view))?;
        acc = (acc << 1u8) | BigUint::from(*bit as u8);
        pos += 2;
    }
}

fn write_uie_raw(n: &BigUint, sink: &mut BitBuf) {
    let m = n + BigUint::one();
    for i in (0..m.bits() - 1).rev() {
        sink.push(false);
        sink.push(m.bit(i));
    }
    sink.push(true);
}

pub fn read_uie(dtype: &Dtype, view: &Bits) -> Result<(Value, usize)> {
    let (n, used) = read_uie_raw(dtype, view)?;
    Ok((Value::from(n), used))
}

pub fn encode_uie(dtype: &Dtype, value: &Value, sink: &mut BitBuf) -> Result<()> {
    write_uie_raw(expect_unsigned(dtype, value)?, sink);
    Ok(())
}

/// Magnitude as `uie`, then a sign bit (1 for negative) unless the magnitude is zero.
pub fn read_sie(dtype: &Dtype, view: &Bits) -> Result<(Value, usize)> {
    let (magnitude, used) = read_uie_raw(dtype, view)?;
    if magnitude.is_zero() {
        return Ok((Value::from(0), used));
    }

    let negative = view.get(used).ok_or_else(|| truncated(dtype, view))?;
    let sign = if *negative { Sign::Minus } else { Sign::Plus };
    Ok((Value::Int(BigInt::from_biguint(sign, magnitude)), used + 1))
}

pub fn encode_sie(dtype: &Dtype, value: &Value, sink: &mut BitBuf) -> Result<()> {
    let v = expect_int(dtype, value)?;
    write_uie_raw(v.magnitude(), sink);
    if !v.is_zero() {
        sink.push(v.sign() == Sign::Minus);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{codec::Codec, Family};
    use test_case::test_case;

    fn pattern(s: &str) -> BitBuf {
        s.chars().map(|c| c == '1').collect()
    }

    fn encode_with(family: Family, n: i64) -> String {
        let d = Dtype::of(family);
        let mut sink = BitBuf::new();
        d.codec().encoder()(&d, &Value::from(n), &mut sink).unwrap();
        sink.iter().by_vals().map(|b| if b { '1' } else { '0' }).collect()
    }

    #[test_case(0, "1")]
    #[test_case(1, "010")]
    #[test_case(2, "011")]
    #[test_case(3, "00100")]
    #[test_case(12, "0001101")]
    fn test_ue_patterns(n: i64, expected: &str) {
        assert_eq!(encode_with(Family::Ue, n), expected);
        let (value, used) = read_ue(&Dtype::of(Family::Ue), &pattern(expected)).unwrap();
        assert_eq!(value, Value::from(n));
        assert_eq!(used, expected.len());
    }

    #[test_case(0, "1")]
    #[test_case(1, "010")]
    #[test_case(-1, "011")]
    #[test_case(2, "00100")]
    #[test_case(-5, "0001011")]
    fn test_se_patterns(n: i64, expected: &str) {
        assert_eq!(encode_with(Family::Se, n), expected);
        let (value, _) = read_se(&Dtype::of(Family::Se), &pattern(expected)).unwrap();
        assert_eq!(value, Value::from(n));
    }

    #[test_case(0, "1")]
    #[test_case(1, "001")]
    #[test_case(2, "011")]
    #[test_case(3, "00001")]
    #[test_case(6, "01011")]
    fn test_uie_patterns(n: i64, expected: &str) {
        assert_eq!(encode_with(Family::Uie, n), expected);
        let (value, used) = read_uie(&Dtype::of(Family::Uie), &pattern(expected)).unwrap();
        assert_eq!(value, Value::from(n));
        assert_eq!(used, expected.len());
    }

    #[test_case(0, "1")]
    #[test_case(1, "0010")]
    #[test_case(-1, "0011")]
    #[test_case(-3, "000011")]
    fn test_sie_patterns(n: i64, expected: &str) {
        assert_eq!(encode_with(Family::Sie, n), expected);
        let (value, used) = read_sie(&Dtype::of(Family::Sie), &pattern(expected)).unwrap();
        assert_eq!(value, Value::from(n));
        assert_eq!(used, expected.len());
    }

    #[test]
    fn test_reader_reports_consumed_bits() {
        let (value, used) = read_ue(&Dtype::of(Family::Ue), &pattern("0101")).unwrap();
        assert_eq!(value, Value::from(1));
        assert_eq!(used, 3);
    }

    #[test_case(Family::Ue, "000"; "ue all zeros")]
    #[test_case(Family::Ue, "0001"; "ue missing payload")]
    #[test_case(Family::Se, ""; "se empty")]
    #[test_case(Family::Uie, "00"; "uie no stop bit")]
    #[test_case(Family::Uie, "0"; "uie missing payload")]
    #[test_case(Family::Sie, "001"; "sie missing sign")]
    fn test_truncated_codes(family: Family, bits: &str) {
        let d = Dtype::of(family);
        let Codec::Variable { read, .. } = d.codec() else {
            panic!("{family} is not variable-length");
        };
        assert!(matches!(read(&d, &pattern(bits)), Err(Error::Interpret { .. })));
    }

    #[test]
    fn test_unsigned_codes_reject_negatives() {
        for family in [Family::Ue, Family::Uie] {
            let d = Dtype::of(family);
            let mut sink = BitBuf::new();
            assert!(matches!(
                d.codec().encoder()(&d, &Value::from(-1), &mut sink),
                Err(Error::Value { .. })
            ));
        }
    }

    #[test]
    fn test_large_values() {
        let d = Dtype::of(Family::Ue);
        let n: BigInt = BigInt::from(u64::MAX) * 1000;
        let mut sink = BitBuf::new();
        encode_ue(&d, &Value::Int(n.clone()), &mut sink).unwrap();
        let (value, used) = read_ue(&d, &sink).unwrap();
        assert_eq!(value, Value::Int(n));
        assert_eq!(used, sink.len());
    }
}
