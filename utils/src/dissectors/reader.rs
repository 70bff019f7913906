//! Bounds checked field readers
//!
//! Every byte a dissector looks at goes through a [`Cursor`]. Reads that would run past the
//! end of the region handed to a dissector fail with [`Error::Truncated`] and leave the
//! cursor where it was.

use std::ops::RangeFrom;

use nom::bytes::complete::take;
use nom::number::complete::{be_u16, be_u32, be_u8, le_u16};
use nom::IResult;

use super::Error;

#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// The whole region this cursor reads from, including consumed bytes
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Bytes consumed so far
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.offset..]
    }

    #[inline]
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.offset
    }

    fn run<T, F>(&mut self, parser: F) -> Result<T, Error>
    where
        F: FnOnce(&'a [u8]) -> IResult<&'a [u8], T, Error>,
    {
        let input = self.remaining();
        match parser(input) {
            Ok((remain, value)) => {
                self.offset += input.len() - remain.len();
                Ok(value)
            }
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e),
            Err(nom::Err::Incomplete(_)) => Err(Error::Truncated),
        }
    }

    #[inline]
    pub fn u8(&mut self) -> Result<u8, Error> {
        self.run(be_u8)
    }

    #[inline]
    pub fn be_u16(&mut self) -> Result<u16, Error> {
        self.run(be_u16)
    }

    #[inline]
    pub fn be_u32(&mut self) -> Result<u32, Error> {
        self.run(be_u32)
    }

    /// Only for the few link layer protocols that put little endian words on the wire
    #[inline]
    pub fn le_u16(&mut self) -> Result<u16, Error> {
        self.run(le_u16)
    }

    #[inline]
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        self.run(take(len))
    }

    /// Read a fixed length address field as raw bytes
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let bytes = self.bytes(N)?;
        let mut array = [0u8; N];
        array.copy_from_slice(bytes);
        Ok(array)
    }

    #[inline]
    pub fn skip(&mut self, len: usize) -> Result<(), Error> {
        self.bytes(len).map(|_| ())
    }

    /// Cut the region down to the first `len` bytes past the current offset, e.g. to drop
    /// trailing padding once a header declared its own length
    pub fn limit(&mut self, len: usize) -> Result<(), Error> {
        if len > self.remaining_len() {
            return Err(Error::Truncated);
        }
        self.data = &self.data[..self.offset + len];
        Ok(())
    }

    /// Bytes from `range` of the whole region, if present
    #[inline]
    pub fn peek(&self, range: RangeFrom<usize>) -> Option<&'a [u8]> {
        self.data.get(range)
    }
}

/// Most significant four bits: `(byte & 0xf0) >> 4`
#[inline]
pub fn high_nibble(byte: u8) -> u8 {
    (byte & 0xf0) >> 4
}

/// Least significant four bits: `byte & 0x0f`
#[inline]
pub fn low_nibble(byte: u8) -> u8 {
    byte & 0x0f
}

/// Bit `n` counted from the least significant bit: `(value >> n) & 1`
#[inline]
pub fn bit(value: u16, n: u8) -> bool {
    (value >> n) & 1 == 1
}
