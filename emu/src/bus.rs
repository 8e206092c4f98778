//! # Memory Boundary
//!
//! The core needs exactly one thing from the memory subsystem: reading a
//! 32-bit instruction word. Everything else (load/store addressing, wait
//! states, I/O registers) lives outside of it.

use crate::bitwise::Bits;

/// Source of instruction words for [`Arm7tdmi::step`](crate::cpu::arm7tdmi::Arm7tdmi::step).
///
/// Reads are synchronous and never fail; the returned value is the raw
/// little-endian word at `address`.
pub trait InstructionBus {
    fn read_word(&mut self, address: u32) -> u32;
}

/// Flat byte-addressed memory starting at address 0.
///
/// Reads past the end return zero bytes, mirroring open-bus style
/// behaviour rather than failing.
#[derive(Default, Clone)]
pub struct WordMemory {
    data: Vec<u8>,
}

impl WordMemory {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    /// Wraps a raw image (e.g. the bytes of a program file).
    #[must_use]
    pub const fn load(data: Vec<u8>) -> Self {
        Self { data }
    }

    #[must_use]
    pub fn from_words(words: &[u32]) -> Self {
        Self {
            data: words.iter().flat_map(|w| w.to_le_bytes()).collect(),
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Writes `value` at `address`, growing the backing store when needed.
    pub fn write_word(&mut self, address: u32, value: u32) {
        let address = address as usize;
        let end = address + 4;
        if self.data.len() < end {
            self.data.resize(end, 0);
        }

        for (i, byte) in value.to_le_bytes().into_iter().enumerate() {
            self.data[address + i] = byte;
        }
    }

    fn read_byte(&self, address: usize) -> u8 {
        self.data.get(address).copied().unwrap_or(0)
    }
}

impl InstructionBus for WordMemory {
    fn read_word(&mut self, address: u32) -> u32 {
        if address.get_bits(0..=1) != 0 {
            tracing::debug!("read_word at unaligned address 0x{address:08X}");
        }

        let address = address as usize;
        u32::from_le_bytes([
            self.read_byte(address),
            self.read_byte(address + 1),
            self.read_byte(address + 2),
            self.read_byte(address + 3),
        ])
    }
}
