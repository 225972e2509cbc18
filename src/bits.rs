//! Conversions between integers and the LSB-first bit sequences that are shifted through the
//! chain.  Bit `i` of the sequence is bit `i` of the value, so a sequence loaded at offset `o`
//! places the least significant bit at chain position `o`.
use alloc::vec::Vec;

/// Split the low `width` bits of `value` into a sequence of 0/1, least significant bit first
pub fn to_bits(value: u64, width: usize) -> Vec<u8> {
    (0..width)
        .map(|i| if i < 64 { ((value >> i) & 1) as u8 } else { 0 })
        .collect()
}

/// Keep the low `width` bits of `value`, the part of it that `to_bits(value, width)` carries
pub fn truncate(value: u64, width: usize) -> u64 {
    match width {
        0 => 0,
        w if w < 64 => value & ((1 << w) - 1),
        _ => value,
    }
}

/// Reassemble a LSB-first bit sequence into an integer.  Bits past the 64th are ignored.
pub fn from_bits(bits: &[u8]) -> u64 {
    bits.iter()
        .take(64)
        .enumerate()
        .fold(0, |acc, (i, &b)| acc | (u64::from(b & 1) << i))
}
