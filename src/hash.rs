//! Hash mixing and index reduction.
//!
//! `mix32` is a 32-bit member of the FxHash family: a rotate/xor/multiply
//! step applied to 4-byte words, then to each trailing byte. `reduce` maps
//! the mixed hash into a power-of-two table by Fibonacci (multiplicative)
//! hashing and keeps the top bits of the product.

/// Odd multiplier of the mixing step.
pub const MIX_MULTIPLIER: u32 = 0x2722_0a95;

/// 2^32 divided by the golden ratio.
pub const FIBONACCI_MULTIPLIER: u32 = 2_654_435_769;

const BLOCK: usize = 4;

#[inline]
fn step(hash: u32, word: u32) -> u32 {
    (hash.rotate_left(5) ^ word).wrapping_mul(MIX_MULTIPLIER)
}

/// Hash a byte string.
///
/// Full 4-byte blocks are read as little-endian words; the remaining 0..=3
/// bytes are folded in one at a time. The empty input hashes to 0.
pub fn mix32(data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(BLOCK);
    let mut hash = 0u32;
    for chunk in chunks.by_ref() {
        let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        hash = step(hash, word);
    }
    for &byte in chunks.remainder() {
        hash = step(hash, u32::from(byte));
    }
    hash
}

/// Map `hash` to a slot index in `[0, table_size)`.
///
/// Panics if `table_size` is not a power of two.
#[inline]
pub fn reduce(hash: u32, table_size: u32) -> u32 {
    assert!(
        table_size.is_power_of_two(),
        "table size {table_size} is not a power of two"
    );
    let shift = 32 - table_size.trailing_zeros();
    // shift == 32 for a single-slot table; widen so it yields 0.
    (u64::from(hash.wrapping_mul(FIBONACCI_MULTIPLIER)) >> shift) as u32
}
