//! Unit tests for the sparse RAM.

use rv32sim::core::units::Ram;

/// Tests unwritten memory reads as zero.
#[test]
fn test_ram_reads_zero_when_unwritten() {
    let ram = Ram::new();
    assert_eq!(ram.load(0, 4), 0);
    assert_eq!(ram.load(0xFFFF_FFF0, 1), 0);
}

/// Tests stores land little-endian.
#[test]
fn test_ram_little_endian_layout() {
    let mut ram = Ram::new();
    ram.store(0x100, 4, 0x1122_3344);
    assert_eq!(ram.load(0x100, 1), 0x44);
    assert_eq!(ram.load(0x101, 1), 0x33);
    assert_eq!(ram.load(0x102, 1), 0x22);
    assert_eq!(ram.load(0x103, 1), 0x11);
}

/// Tests a store observed through loads of different sizes.
#[test]
fn test_ram_mixed_size_access() {
    let mut ram = Ram::new();
    ram.store(0x200, 4, 0xDEAD_BEEF);
    assert_eq!(ram.load(0x200, 2), 0xBEEF);
    assert_eq!(ram.load(0x202, 2), 0xDEAD);

    ram.store(0x201, 1, 0x55);
    assert_eq!(ram.load(0x200, 4), 0xDEAD_55EF);
}

/// Tests sub-word stores leave neighboring bytes alone.
#[test]
fn test_ram_store_width() {
    let mut ram = Ram::new();
    ram.store(0x300, 4, 0xFFFF_FFFF);
    ram.store(0x301, 2, 0);
    assert_eq!(ram.load(0x300, 4), 0xFF00_00FF);
}

/// Tests misaligned half-word access reads the two bytes at that
/// address without trapping.
#[test]
fn test_ram_misaligned_half() {
    let mut ram = Ram::new();
    ram.store(0x400, 4, 0x1122_3344);
    assert_eq!(ram.load(0x401, 2), 0x2233);
}

/// Tests address arithmetic wraps at the top of the address space.
#[test]
fn test_ram_address_wraparound() {
    let mut ram = Ram::new();
    ram.store(0xFFFF_FFFF, 2, 0xAABB);
    assert_eq!(ram.load(0xFFFF_FFFF, 1), 0xBB);
    assert_eq!(ram.load(0, 1), 0xAA);
}

/// Tests sparse iteration returns written bytes in address order.
#[test]
fn test_ram_sparse_iteration() {
    let mut ram = Ram::new();
    ram.store(0x500, 1, 0x11);
    ram.store(0x10, 1, 0x22);
    let bytes: Vec<(u32, u8)> = ram.iter().collect();
    assert_eq!(bytes, vec![(0x10, 0x22), (0x500, 0x11)]);
}
