use bitvec::prelude::*;

use crate::{
    bits::Bits,
    dtype::Dtype,
    errors::{Error, Result},
    interpret,
    token::resolve_token,
    value::Value,
};

/// Stream-style reader: each read decodes one value at the current position and advances
/// past exactly the bits it consumed.
pub struct BitReader<'a> {
    data: &'a Bits,
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a Bits) -> Self {
        Self { data, bit_pos: 0 }
    }

    pub fn from_bytes(data: &'a [u8]) -> Self {
        Self::new(data.view_bits::<Msb0>())
    }

    pub fn pos(&self) -> usize {
        self.bit_pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.bit_pos
    }

    fn rest(&self) -> &'a Bits {
        &self.data[self.bit_pos..]
    }

    pub fn read(&mut self, dtype: &Dtype) -> Result<Value> {
        let (value, used) = interpret::read(dtype, self.rest())?;
        self.bit_pos += used;
        Ok(value)
    }

    pub fn read_token(&mut self, token: &str) -> Result<Value> {
        self.read(&resolve_token(token)?)
    }

    /// Reads one value per dtype. On failure the position is left where it started.
    pub fn read_list(&mut self, dtypes: &[Dtype]) -> Result<Vec<Value>> {
        let start = self.bit_pos;
        let values = dtypes
            .iter()
            .map(|dtype| self.read(dtype))
            .collect::<Result<Vec<_>>>();

        if values.is_err() {
            self.bit_pos = start;
        }

        values
    }

    /// Decodes the next value without advancing.
    pub fn peek(&self, dtype: &Dtype) -> Result<Value> {
        interpret::read(dtype, self.rest()).map(|(value, _)| value)
    }

    /// The next `n` raw bits.
    pub fn read_bits(&mut self, n: usize) -> Result<&'a Bits> {
        if n > self.remaining() {
            return Err(Error::interpret(
                "bits",
                self.remaining(),
                format!("cannot read {n} bits"),
            ));
        }

        let bits = &self.data[self.bit_pos..self.bit_pos + n];
        self.bit_pos += n;
        Ok(bits)
    }

    pub fn skip_bits(&mut self, n: usize) -> Result<()> {
        self.read_bits(n).map(|_| ())
    }

    /// Moves forward to the next multiple of `bits`, stopping at the end of the data.
    pub fn align_to(&mut self, bits: usize) {
        if bits == 0 {
            return;
        }

        let rem = self.bit_pos % bits;
        if rem != 0 {
            self.bit_pos = (self.bit_pos + bits - rem).min(self.data.len());
        }
    }
}
