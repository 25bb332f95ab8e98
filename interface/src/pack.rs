//! Little-endian, borsh-compatible packing primitives shared by account state, instruction data
//! and events.
//!
//! Layout rules:
//! - integers are little-endian
//! - `bool` is one byte, `0` or `1`
//! - `Option<T>` is a one byte tag followed by `T` only when the tag is `1`
//! - enums are a one byte variant tag followed by the variant's fields

use core::mem::MaybeUninit;

use pinocchio::Address;

use crate::state::{ADDRESS_SIZE, U64_SIZE};

pub const UNINIT_BYTE: MaybeUninit<u8> = MaybeUninit::uninit();

/// Writes bytes from a source slice into an uninitialized destination buffer.
///
/// Caller must ensure that `src.len()` equals `dst.len()`. A partial write isn't immediate
/// undefined behavior, but the buffer must not be reinterpreted as initialized bytes afterwards.
///
/// From pinocchio's `[no_std]` library:
/// <https://github.com/anza-xyz/pinocchio/blob/3044aaf5ea7eac01adc754d4bdf93c21c6e54d42/programs/token/src/lib.rs#L13>
#[inline(always)]
pub fn write_bytes(dst: &mut [MaybeUninit<u8>], src: &[u8]) {
    debug_assert_eq!(
        src.len(),
        dst.len(),
        "tried to `write_bytes` with mismatched src/dst lengths"
    );
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        d.write(*s);
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnpackError {
    InsufficientBytes,
    InvalidDiscriminator,
    InvalidVariantTag(u8),
    InvalidBool(u8),
    InvalidOptionTag(u8),
}

#[cfg(not(target_os = "solana"))]
impl core::fmt::Display for UnpackError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UnpackError::InsufficientBytes => write!(f, "not enough bytes to unpack"),
            UnpackError::InvalidDiscriminator => write!(f, "discriminator mismatch"),
            UnpackError::InvalidVariantTag(tag) => write!(f, "invalid enum variant tag {tag}"),
            UnpackError::InvalidBool(b) => write!(f, "invalid bool byte {b}"),
            UnpackError::InvalidOptionTag(tag) => write!(f, "invalid option tag {tag}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnpackError {}

/// Sequential writer over an already initialized byte buffer, e.g. account data or a zeroed
/// stack buffer.
///
/// Writes past the end of the buffer panic, so callers size buffers with the `MAX_LEN` constants
/// of the types being packed.
pub struct ByteWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteWriter<'a> {
    #[inline(always)]
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// The number of bytes written so far.
    #[inline(always)]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline(always)]
    pub fn write(&mut self, src: &[u8]) {
        let end = self.pos + src.len();
        self.buf[self.pos..end].copy_from_slice(src);
        self.pos = end;
    }

    #[inline(always)]
    pub fn write_u8(&mut self, value: u8) {
        self.write(&[value]);
    }

    #[inline(always)]
    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(value as u8);
    }

    #[inline(always)]
    pub fn write_u64(&mut self, value: u64) {
        self.write(&value.to_le_bytes());
    }

    #[inline(always)]
    pub fn write_i64(&mut self, value: i64) {
        self.write(&value.to_le_bytes());
    }

    #[inline(always)]
    pub fn write_address(&mut self, address: &Address) {
        self.write(address.as_ref());
    }

    #[inline(always)]
    pub fn write_option_u64(&mut self, value: Option<u64>) {
        match value {
            Some(v) => {
                self.write_u8(1);
                self.write_u64(v);
            }
            None => self.write_u8(0),
        }
    }
}

/// Sequential reader over a byte slice of unknown length.
pub struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    #[inline(always)]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// The bytes that haven't been read yet.
    #[inline(always)]
    pub fn remaining(&self) -> &'a [u8] {
        self.data
    }

    #[inline(always)]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], UnpackError> {
        let (head, rest) = self
            .data
            .split_first_chunk::<N>()
            .ok_or(UnpackError::InsufficientBytes)?;
        self.data = rest;
        Ok(*head)
    }

    #[inline(always)]
    pub fn read_u8(&mut self) -> Result<u8, UnpackError> {
        let [byte, rest @ ..] = self.data else {
            return Err(UnpackError::InsufficientBytes);
        };
        self.data = rest;
        Ok(*byte)
    }

    #[inline(always)]
    pub fn read_bool(&mut self) -> Result<bool, UnpackError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(UnpackError::InvalidBool(b)),
        }
    }

    #[inline(always)]
    pub fn read_u64(&mut self) -> Result<u64, UnpackError> {
        Ok(u64::from_le_bytes(self.read_array::<U64_SIZE>()?))
    }

    #[inline(always)]
    pub fn read_i64(&mut self) -> Result<i64, UnpackError> {
        Ok(i64::from_le_bytes(self.read_array::<U64_SIZE>()?))
    }

    #[inline(always)]
    pub fn read_address(&mut self) -> Result<Address, UnpackError> {
        Ok(Address::new_from_array(self.read_array::<ADDRESS_SIZE>()?))
    }

    #[inline(always)]
    pub fn read_option_u64(&mut self) -> Result<Option<u64>, UnpackError> {
        match self.read_u8()? {
            0 => Ok(None),
            1 => Ok(Some(self.read_u64()?)),
            tag => Err(UnpackError::InvalidOptionTag(tag)),
        }
    }

    /// Consumes an 8-byte discriminator and checks it against `expected`.
    #[inline(always)]
    pub fn expect_discriminator(&mut self, expected: &[u8; 8]) -> Result<(), UnpackError> {
        if &self.read_array::<8>()? != expected {
            return Err(UnpackError::InvalidDiscriminator);
        }
        Ok(())
    }
}

/// Safely unpacks a u64 from a slice of unknown length.
pub fn unpack_u64(data: &[u8]) -> Result<u64, UnpackError> {
    ByteReader::new(data).read_u64()
}
