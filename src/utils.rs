use std::fmt::{Debug, Display};

use crate::config::arch_config::{SignedWordType, WordType, XLEN};

pub fn sign_extend(value: WordType, from_bits: u32) -> WordType {
    let sign_bit = XLEN as u32 - from_bits;
    ((value << sign_bit) as SignedWordType >> sign_bit) as WordType
}

pub fn wrapping_add_as_signed(lhs: WordType, rhs: WordType) -> WordType {
    lhs.cast_signed()
        .wrapping_add(rhs.cast_signed())
        .cast_unsigned()
}

/// get the negative of given number of [`WordType`] in 2's complement.
pub fn negative_of(value: WordType) -> WordType {
    (!value).wrapping_add(1)
}

pub trait TruncateFrom<T>: Sized {
    fn truncate_from(value: T) -> Self;
}

macro_rules! impl_truncate_from {
    ($from:ty, $to:ty) => {
        impl TruncateFrom<$from> for $to {
            fn truncate_from(val: $from) -> Self {
                val as $to
            }
        }
    };
}

impl_truncate_from!(u32, u8);
impl_truncate_from!(u32, u16);
impl_truncate_from!(u32, u32);

/// Integer widths the guest can load or store.
pub trait UnsignedInteger:
    Copy + Sized + Default + Into<WordType> + TruncateFrom<WordType> + PartialEq + Eq + Debug + Display
{
    const BYTES: usize;

    /// Build a value from exactly [`Self::BYTES`] little-endian bytes.
    fn from_le_slice(bytes: &[u8]) -> Self;

    /// Store the value into exactly [`Self::BYTES`] bytes, little-endian.
    fn write_le_slice(self, dst: &mut [u8]);
}

macro_rules! impl_unsigned_integer {
    ($T:ty) => {
        impl UnsignedInteger for $T {
            const BYTES: usize = size_of::<$T>();

            #[inline]
            fn from_le_slice(bytes: &[u8]) -> Self {
                let mut raw = [0u8; size_of::<$T>()];
                raw.copy_from_slice(bytes);
                <$T>::from_le_bytes(raw)
            }

            #[inline]
            fn write_le_slice(self, dst: &mut [u8]) {
                dst.copy_from_slice(&self.to_le_bytes());
            }
        }
    };
}

impl_unsigned_integer!(u8);
impl_unsigned_integer!(u16);
impl_unsigned_integer!(u32);

// ========================================
//  hex helpers for the debug protocol
// ========================================

pub const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

pub fn hex_value(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

/// Parse hex digits from the front of `input` while they last.
///
/// Returns the value and the number of digits consumed. Overflowing digits shift out
/// of the top, as a `u32` accumulator would.
pub fn parse_hex_prefix(input: &[u8]) -> (u32, usize) {
    let mut value = 0u32;
    let mut count = 0;
    for &ch in input {
        match hex_value(ch) {
            Some(v) => {
                value = (value << 4) | v as u32;
                count += 1;
            }
            None => break,
        }
    }
    (value, count)
}
