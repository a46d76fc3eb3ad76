//! Low-level bit helpers over `bitvec` views and sinks.
//!
//! Bits are addressed in MSB-first order: bit 0 is the high bit of the first byte.
//! [`Bits`] is the read-only view the codecs consume and [`BitBuf`] is the sink they
//! append encoded output to.

use bitvec::prelude::*;
use num_bigint::{BigInt, BigUint};
use num_traits::One;

/// Read-only, MSB-first view over a contiguous run of bits.
pub type Bits = BitSlice<u8, Msb0>;

/// Growable MSB-first bit buffer that receives encoded output.
pub type BitBuf = BitVec<u8, Msb0>;

/// Reads the whole view as an unsigned value, MSB-first. At most 64 bits.
pub fn read_u64(view: &Bits) -> u64 {
    debug_assert!(view.len() <= 64);
    view.iter()
        .by_vals()
        .fold(0u64, |acc, bit| (acc << 1) | bit as u64)
}

/// Packs the view into bytes, MSB of each byte first. A partial last byte is padded with zero bits.
pub fn pack_bytes(view: &Bits) -> Vec<u8> {
    view.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .by_vals()
                .enumerate()
                .fold(0u8, |acc, (i, bit)| acc | ((bit as u8) << (7 - i)))
        })
        .collect()
}

/// Reads the whole view as an arbitrary-precision unsigned magnitude, MSB-first.
pub fn to_biguint(view: &Bits) -> BigUint {
    let bytes = pack_bytes(view);
    let pad = bytes.len() * 8 - view.len();
    BigUint::from_bytes_be(&bytes) >> pad
}

/// Two's-complement reading of `value` as a `bits`-wide signed integer.
pub fn sign_extend(value: BigUint, bits: usize) -> BigInt {
    if bits > 0 && value.bit(bits as u64 - 1) {
        BigInt::from(value) - (BigInt::one() << bits)
    } else {
        BigInt::from(value)
    }
}

/// Copies the view with its byte order reversed. The length must be a whole number of bytes.
pub fn reverse_bytes(view: &Bits) -> BitBuf {
    debug_assert_eq!(view.len() % 8, 0);
    let mut out = BitBuf::with_capacity(view.len());
    for chunk in view.rchunks(8) {
        out.extend_from_bitslice(chunk);
    }

    out
}

/// Appends the low `n` bits of `value`, MSB-first.
pub fn push_u64(sink: &mut BitBuf, value: u64, n: usize) {
    debug_assert!(n <= 64);
    for i in (0..n).rev() {
        sink.push((value >> i) & 1 == 1);
    }
}

/// Appends `value` as exactly `n` bits, MSB-first. `value` must fit in `n` bits.
pub fn push_biguint(sink: &mut BitBuf, value: &BigUint, n: usize) {
    let width = value.bits() as usize;
    debug_assert!(width <= n);
    sink.resize(sink.len() + (n - width), false);
    for i in (0..width).rev() {
        sink.push(value.bit(i as u64));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u64() {
        let data = [0b11111111u8];
        assert_eq!(read_u64(data.view_bits::<Msb0>()), 0b11111111);
        assert_eq!(read_u64(&data.view_bits::<Msb0>()[2..5]), 0b111);
    }

    #[test]
    fn test_pack_bytes_pads_last_byte() {
        let view = bits![u8, Msb0; 1, 0, 1, 0, 1, 0, 1, 0, 1, 1];
        assert_eq!(pack_bytes(view), vec![0b10101010, 0b11000000]);
    }

    #[test]
    fn test_to_biguint_unaligned() {
        let data = [0x12u8, 0x34];
        let view = &data.view_bits::<Msb0>()[4..16];
        assert_eq!(to_biguint(view), BigUint::from(0x234u32));
        assert_eq!(to_biguint(&view[..0]), BigUint::from(0u32));
    }

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(BigUint::from(0b11111111u32), 8), BigInt::from(-1));
        assert_eq!(sign_extend(BigUint::from(0b10000000u32), 8), BigInt::from(-128));
        assert_eq!(sign_extend(BigUint::from(0b01111111u32), 8), BigInt::from(127));
    }

    #[test]
    fn test_reverse_bytes() {
        let data = [0x01u8, 0x02, 0x03];
        let reversed = reverse_bytes(data.view_bits::<Msb0>());
        assert_eq!(pack_bytes(&reversed), vec![0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_push_biguint_left_pads() {
        let mut sink = BitBuf::new();
        push_biguint(&mut sink, &BigUint::from(5u32), 6);
        assert_eq!(sink.as_bitslice(), bits![u8, Msb0; 0, 0, 0, 1, 0, 1]);

        let mut sink = BitBuf::new();
        push_biguint(&mut sink, &BigUint::from(0u32), 3);
        assert_eq!(sink.as_bitslice(), bits![u8, Msb0; 0, 0, 0]);
    }

    #[test]
    fn test_push_u64() {
        let mut sink = BitBuf::new();
        push_u64(&mut sink, 0b1011, 4);
        assert_eq!(sink.as_bitslice(), bits![u8, Msb0; 1, 0, 1, 1]);
    }
}
