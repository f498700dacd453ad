//! Integration tests for bit vectors and truth tables.

use proptest::prelude::*;
use rv32sim::common::{Bits, TruthTable};

/// Tests unsigned construction and conversion.
#[test]
fn test_bits_unsigned_round_trip() {
    let b = Bits::unsigned(0xA5, 8);
    assert_eq!(b.width(), 8);
    assert_eq!(b.to_unsigned(), 0xA5);
}

/// Tests signed construction producing two's complement.
#[test]
fn test_bits_signed_construction() {
    let b = Bits::signed(-1, 12);
    assert_eq!(b.to_unsigned(), 0xFFF);
    assert_eq!(b.to_signed(), -1);

    let b = Bits::signed(-2048, 12);
    assert_eq!(b.to_unsigned(), 0x800);
    assert_eq!(b.to_signed(), -2048);
}

/// Tests out-of-range construction panics at the call site.
#[test]
#[should_panic]
fn test_bits_unsigned_out_of_range() {
    Bits::unsigned(256, 8);
}

/// Tests out-of-range signed construction panics.
#[test]
#[should_panic]
fn test_bits_signed_out_of_range() {
    Bits::signed(2048, 12);
}

/// Tests single-bit access.
#[test]
fn test_bits_bit_access() {
    let b = Bits::unsigned(0b1010, 4);
    assert_eq!(b.bit(0), 0);
    assert_eq!(b.bit(1), 1);
    assert_eq!(b.bit(2), 0);
    assert_eq!(b.bit(3), 1);
}

/// Tests LSB-first half-open slicing.
#[test]
fn test_bits_slice() {
    let b = Bits::unsigned(0b110100, 6);
    let s = b.slice(2, 5);
    assert_eq!(s.width(), 3);
    assert_eq!(s.to_unsigned(), 0b101);
}

/// Tests MSB-first concatenation.
#[test]
fn test_bits_join() {
    let hi = Bits::unsigned(0b10, 2);
    let lo = Bits::unsigned(0b01, 2);
    let joined = Bits::join(&[hi, lo]);
    assert_eq!(joined.width(), 4);
    assert_eq!(joined.to_unsigned(), 0b1001);
}

/// Tests sign extension replicates the top bit.
#[test]
fn test_bits_sign_extend() {
    let b = Bits::signed(-2, 4);
    let wide = b.sign_extend(8);
    assert_eq!(wide.to_unsigned(), 0xFE);
    assert_eq!(wide.to_signed(), -2);

    let positive = Bits::unsigned(0b0110, 4).sign_extend(8);
    assert_eq!(positive.to_unsigned(), 0b0110);
}

/// Tests zero extension never sets new bits.
#[test]
fn test_bits_zero_extend() {
    let b = Bits::unsigned(0xF, 4).zero_extend(8);
    assert_eq!(b.to_unsigned(), 0x0F);
}

/// Tests first-match-wins row priority.
#[test]
fn test_truth_table_insertion_order() {
    let table = TruthTable::new(vec![
        (vec!["1XX"], "top"),
        (vec!["11X"], "shadowed"),
        (vec!["XXX"], "default"),
    ]);
    assert_eq!(*table.lookup(&[Bits::unsigned(0b110, 3)]).unwrap(), "top");
    assert_eq!(
        *table.lookup(&[Bits::unsigned(0b010, 3)]).unwrap(),
        "default"
    );
}

/// Tests don't-care columns and multi-column rows.
#[test]
fn test_truth_table_dont_care() {
    let table = TruthTable::new(vec![
        (vec!["0100011", "XXX"], 1),
        (vec!["XXXXXXX", "XXX"], 0),
    ]);
    let store = [Bits::unsigned(0b0100011, 7), Bits::unsigned(0b010, 3)];
    let other = [Bits::unsigned(0b0110011, 7), Bits::unsigned(0b000, 3)];
    assert_eq!(*table.lookup(&store).unwrap(), 1);
    assert_eq!(*table.lookup(&other).unwrap(), 0);
}

/// Tests a table without a catch-all can miss.
#[test]
fn test_truth_table_miss() {
    let table = TruthTable::new(vec![(vec!["00"], 1), (vec!["01"], 2), (vec!["10"], 4)]);
    assert!(table.lookup(&[Bits::unsigned(0b11, 2)]).is_none());
}

/// Tests width mismatches are rejected.
#[test]
#[should_panic]
fn test_truth_table_width_mismatch() {
    let table = TruthTable::new(vec![(vec!["000"], 0)]);
    table.lookup(&[Bits::unsigned(0, 4)]);
}

proptest! {
    /// Round-trip: converting a constructed vector back with the same
    /// signedness returns the original value.
    #[test]
    fn prop_unsigned_round_trip(width in 1u32..=63, raw in 0u64..u64::MAX) {
        let value = raw & ((1u64 << width) - 1);
        prop_assert_eq!(Bits::unsigned(value, width).to_unsigned(), value);
    }

    /// Round-trip for signed construction.
    #[test]
    fn prop_signed_round_trip(width in 2u32..=63, raw in i64::MIN..i64::MAX) {
        let lo = -(1i64 << (width - 1));
        let hi = (1i64 << (width - 1)) - 1;
        let span = (hi as i128) - (lo as i128) + 1;
        let value = (lo as i128 + (raw as i128 - i64::MIN as i128) % span) as i64;
        prop_assert_eq!(Bits::signed(value, width).to_signed(), value);
    }
}
