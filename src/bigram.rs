//! Bigram counting on top of `StrTable`.
//!
//! Words are maximal runs of ASCII letters; every other byte separates
//! words. Each pair of consecutive words is counted under the key
//! `"first second"`. The client only uses `get`, `set`, `capacity`,
//! `probe` and `len`.

use crate::error::TableError;
use crate::table::StrTable;
use std::io::{self, Write};

/// Counts at or above this are reported when no other threshold is given.
pub const DEFAULT_THRESHOLD: i32 = 200;

/// Letters-only words of `text`, in order.
pub fn words(text: &[u8]) -> impl Iterator<Item = &str> {
    text.split(|b| !b.is_ascii_alphabetic())
        .filter(|w| !w.is_empty())
        .filter_map(|w| std::str::from_utf8(w).ok())
}

/// Add every bigram of `text` to `table`. Returns how many pairs were seen.
pub fn count_bigrams(table: &mut StrTable, text: &[u8]) -> Result<usize, TableError> {
    let mut words = words(text);
    let Some(mut prev) = words.next() else {
        return Ok(0);
    };
    let mut key = String::new();
    let mut pairs = 0;
    for word in words {
        key.clear();
        key.push_str(prev);
        key.push(' ');
        key.push_str(word);

        let count = table.get(&key).map_or(1, |c| c.saturating_add(1));
        table.set(&key, count)?;
        pairs += 1;
        prev = word;
    }
    tracing::debug!(pairs, distinct = table.len(), "bigrams counted");
    Ok(pairs)
}

/// Summary of what `report` wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    /// Entries printed as `Bigram ... has count of ...` lines.
    pub printed: usize,
    /// No entry met the threshold, so every entry was printed.
    pub fell_back: bool,
    pub distinct: usize,
}

/// Print every bigram counted at least `threshold` times, in slot order.
/// When none qualifies every bigram is printed instead, each preceded by
/// its key repeated once per occurrence. A final line gives the number of
/// distinct bigrams.
pub fn report<W: Write>(table: &StrTable, threshold: i32, out: &mut W) -> io::Result<Report> {
    let mut printed = 0;
    for idx in 0..table.capacity() {
        if let Some((key, count)) = table.probe(idx) {
            if count >= threshold {
                writeln!(out, "Bigram '{key}' has count of {count}")?;
                printed += 1;
            }
        }
    }

    let fell_back = printed == 0;
    if fell_back {
        for idx in 0..table.capacity() {
            if let Some((key, count)) = table.probe(idx) {
                for _ in 0..count {
                    writeln!(out, "{key}")?;
                }
                writeln!(out, "Bigram '{key}' has count of {count}")?;
                printed += 1;
            }
        }
    }

    let distinct = table.len();
    writeln!(out, "Total of {distinct} different bigrams recorded")?;
    Ok(Report {
        printed,
        fell_back,
        distinct,
    })
}
