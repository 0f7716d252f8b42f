//! Fixed width bit fields packed back to back inside wider words.
//!
//! Fields are laid out least significant bit first: the first field of a
//! word occupies its lowest bits, and a field may straddle two words.
use crate::error::BitPackError;
use bitvec::prelude::*;

/// Widest supported field or word.
pub const MAX_BITS: u32 = 64;

fn check_width(bits: u32) -> Result<(), BitPackError> {
    if bits == 0 || bits > MAX_BITS {
        return Err(BitPackError::UnsupportedWidth { bits });
    }

    Ok(())
}

fn mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1 << bits) - 1
    }
}

/// Smallest of 8, 16, 32 or 64 bits able to store a `nbits` wide field.
pub fn field_storage_bits(nbits: u32) -> Result<u32, BitPackError> {
    check_width(nbits)?;

    Ok(nbits.next_power_of_two().max(8))
}

/// Concatenates the low `input_bits` of every item into one bit stream
/// and cuts it again into `output_bits` wide fields.
fn regroup(
    output_bits: u32,
    input_bits: u32,
    input: &[u64],
    strict: bool,
) -> Result<Vec<u64>, BitPackError> {
    check_width(output_bits)?;
    check_width(input_bits)?;

    let mut stream: BitVec<u64, Lsb0> = BitVec::with_capacity(input.len() * input_bits as usize);

    for &item in input {
        if strict && item & !mask(input_bits) != 0 {
            return Err(BitPackError::ValueTooWide {
                value: item,
                bits: input_bits,
            });
        }

        stream.extend_from_bitslice(&item.view_bits::<Lsb0>()[..input_bits as usize]);
    }

    let remaining = stream.len() % output_bits as usize;

    if remaining != 0 {
        return Err(BitPackError::TrailingBits {
            remaining,
            nbits: output_bits,
        });
    }

    Ok(stream
        .chunks_exact(output_bits as usize)
        .map(|field| field.load_le::<u64>())
        .collect())
}

/// Splits `word_bits` wide words into `nbits` wide fields.
///
/// Bits above `word_bits` are ignored, so sign extended words taken from
/// signed arrays unpack the same as their unsigned counterpart.
pub fn unpack(nbits: u32, word_bits: u32, words: &[u64]) -> Result<Vec<u64>, BitPackError> {
    regroup(nbits, word_bits, words, false)
}

/// Joins `nbits` wide fields into `word_bits` wide words.
///
/// Exact inverse of [`unpack`]. Fields wider than `nbits` are rejected.
pub fn pack(word_bits: u32, nbits: u32, fields: &[u64]) -> Result<Vec<u64>, BitPackError> {
    regroup(word_bits, nbits, fields, true)
}

/// Changes the field width of packed data, keeping every field value.
///
/// Fails when a field value needs more than `new_bits` bits.
pub fn reshape(
    words: &[u64],
    word_bits: u32,
    old_bits: u32,
    new_bits: u32,
) -> Result<Vec<u64>, BitPackError> {
    let fields = unpack(old_bits, word_bits, words)?;

    pack(word_bits, new_bits, &fields)
}

/// Reads the `index`th `nbits` wide field of 64 bits words.
pub(crate) fn read_field(words: &[u64], nbits: u32, index: usize) -> u64 {
    let start = index * nbits as usize;

    words.view_bits::<Lsb0>()[start..start + nbits as usize].load_le::<u64>()
}

/// Overwrites the `index`th `nbits` wide field of 64 bits words.
pub(crate) fn write_field(words: &mut [u64], nbits: u32, index: usize, value: u64) {
    let start = index * nbits as usize;

    words.view_bits_mut::<Lsb0>()[start..start + nbits as usize].store_le::<u64>(value);
}

/// Whether `value` fits in a `nbits` wide field.
pub(crate) fn fits(value: u64, nbits: u32) -> bool {
    value & !mask(nbits) == 0
}
