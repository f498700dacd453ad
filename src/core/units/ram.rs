//! Byte-addressable sparse memory.
//!
//! Covers the full 32-bit address space; bytes never written read as
//! zero. Accesses are little-endian and byte-granular, so misaligned
//! half-word and word accesses simply touch the bytes at that address
//! without trapping.

use std::collections::BTreeMap;

use super::super::component::Component;
use super::super::wires::Wires;
use crate::common::{SimError, TruthTable};

/// Sparse RAM with sized, sign/zero-extending access.
pub struct Ram {
    bytes: BTreeMap<u32, u8>,
    read_latch: u32,
    /// Maps the 2-bit size selector (the low funct3 bits) to a byte
    /// count. `11` has no row: an access with that selector is an
    /// undefined decode.
    size_table: TruthTable<u32>,
}

impl Ram {
    pub fn new() -> Self {
        let size_table = TruthTable::new(vec![
            (vec!["00"], 1),
            (vec!["01"], 2),
            (vec!["10"], 4),
        ]);
        Self {
            bytes: BTreeMap::new(),
            read_latch: 0,
            size_table,
        }
    }

    /// Reads `size` bytes at `addr`, little-endian, as an unsigned value.
    pub fn load(&self, addr: u32, size: u32) -> u32 {
        let mut value = 0u32;
        for i in (0..size).rev() {
            let byte = self
                .bytes
                .get(&addr.wrapping_add(i))
                .copied()
                .unwrap_or(0);
            value = (value << 8) | byte as u32;
        }
        value
    }

    /// Writes the low `size` bytes of `value` at `addr`, little-endian.
    pub fn store(&mut self, addr: u32, size: u32, value: u32) {
        for i in 0..size {
            self.bytes
                .insert(addr.wrapping_add(i), (value >> (8 * i)) as u8);
        }
    }

    /// Iterates over all written bytes in address order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u8)> + '_ {
        self.bytes.iter().map(|(&addr, &byte)| (addr, byte))
    }

    fn extend(raw: u32, size: u32, unsigned: bool) -> u32 {
        if size == 4 || unsigned {
            return raw;
        }
        let shift = 32 - 8 * size;
        (((raw << shift) as i32) >> shift) as u32
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Ram {
    fn rising_edge(&mut self, wires: &mut Wires) -> Result<(), SimError> {
        let size = *self.size_table.lookup(&[wires.mem_size]).ok_or_else(|| {
            SimError::UndefinedDecode {
                opcode: wires.opcode.to_unsigned() as u8,
                funct3: wires.funct3.to_unsigned() as u8,
                state: "memory access size",
            }
        })?;

        let addr = wires.mem_address;
        if wires.mem_write {
            self.store(addr, size, wires.read_data2);
        }
        self.read_latch = Self::extend(self.load(addr, size), size, wires.mem_unsigned);
        Ok(())
    }

    fn falling_edge(&mut self, wires: &mut Wires) {
        wires.mem_read_data = self.read_latch;
    }
}
