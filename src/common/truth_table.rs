//! Ordered pattern-matching tables for control decode.
//!
//! Control decisions in this machine are data, not code: each decode
//! table is a list of rows, every row a tuple of bit patterns (`0`, `1`,
//! or `X` for don't-care, written MSB-first) mapping to a value. Lookup
//! scans rows in insertion order and the first full match wins, so a
//! catch-all `XXX...` row placed last gives the table its defaults.
//!
//! Patterns are parsed once at construction; matching is two mask
//! compares per column.

use super::bits::Bits;

/// One parsed pattern column: `input & care == want`.
#[derive(Clone, Copy)]
struct Pattern {
    care: u64,
    want: u64,
    width: u32,
}

impl Pattern {
    fn parse(text: &str) -> Self {
        let width = text.len() as u32;
        assert!((1..=64).contains(&width), "unsupported pattern width {width}");
        let mut care = 0u64;
        let mut want = 0u64;
        for ch in text.chars() {
            care <<= 1;
            want <<= 1;
            match ch {
                '0' => care |= 1,
                '1' => {
                    care |= 1;
                    want |= 1;
                }
                'X' | 'x' => {}
                _ => panic!("invalid pattern character {ch:?} in {text:?}"),
            }
        }
        Self { care, want, width }
    }

    fn matches(&self, input: &Bits) -> bool {
        assert_eq!(
            input.width(),
            self.width,
            "pattern width {} does not match input width {}",
            self.width,
            input.width()
        );
        input.to_unsigned() & self.care == self.want
    }
}

/// An insertion-ordered decode table from bit patterns to values.
pub struct TruthTable<V> {
    columns: usize,
    rows: Vec<(Vec<Pattern>, V)>,
}

impl<V> TruthTable<V> {
    /// Parses the given rows. Every row must have the same number of
    /// pattern columns.
    ///
    /// # Panics
    ///
    /// Panics on an empty table, ragged rows, or a malformed pattern.
    /// Tables are static data, so these are construction-site bugs.
    pub fn new(rows: Vec<(Vec<&str>, V)>) -> Self {
        assert!(!rows.is_empty(), "truth table with no rows");
        let columns = rows[0].0.len();
        let rows = rows
            .into_iter()
            .map(|(patterns, value)| {
                assert_eq!(patterns.len(), columns, "ragged truth table row");
                (patterns.iter().map(|p| Pattern::parse(p)).collect(), value)
            })
            .collect();
        Self { columns, rows }
    }

    /// Returns the value of the first row whose every pattern matches the
    /// corresponding input, or `None` if no row matches.
    ///
    /// # Panics
    ///
    /// Panics if the number of inputs differs from the number of table
    /// columns, or an input width differs from its column's pattern width.
    pub fn lookup(&self, inputs: &[Bits]) -> Option<&V> {
        assert_eq!(inputs.len(), self.columns, "wrong number of table inputs");
        self.rows
            .iter()
            .find(|(patterns, _)| {
                patterns
                    .iter()
                    .zip(inputs)
                    .all(|(pattern, input)| pattern.matches(input))
            })
            .map(|(_, value)| value)
    }
}
