//! # Register File
//!
//! The 16 general-purpose registers visible at any time.
//!
//! - **R0-R12**: General purpose
//! - **R13 (SP)**: Stack pointer (by convention)
//! - **R14 (LR)**: Link register (return address)
//! - **R15 (PC)**: Program counter
//!
//! Banked copies for the exception modes live in
//! [`RegisterBank`](super::register_bank::RegisterBank).

use serde::{Deserialize, Serialize};

/// Stack Pointer register index.
pub const REG_SP: usize = 0xD;

/// Link Register index (return address for subroutines).
pub const REG_LR: usize = 0xE;

/// Program Counter register index.
pub const REG_PROGRAM_COUNTER: usize = 0xF;

/// The 16 general-purpose registers visible to the CPU.
///
/// R15 is read as stored: data-processing instructions see the raw
/// program counter, with no pipeline offset applied.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers([u32; 16]);

impl Registers {
    #[must_use]
    pub const fn program_counter(&self) -> u32 {
        self.0[REG_PROGRAM_COUNTER]
    }

    pub const fn set_program_counter(&mut self, new_value: u32) {
        self.0[REG_PROGRAM_COUNTER] = new_value;
    }

    pub const fn advance_program_counter(&mut self, bytes: u32) {
        self.0[REG_PROGRAM_COUNTER] = self.0[REG_PROGRAM_COUNTER].wrapping_add(bytes);
    }

    /// Only the low 4 bits of `reg` select the register.
    pub const fn set_register_at(&mut self, reg: usize, new_value: u32) {
        self.0[reg & 0xF] = new_value;
    }

    /// Only the low 4 bits of `reg` select the register.
    #[must_use]
    pub const fn register_at(&self, reg: usize) -> u32 {
        self.0[reg & 0xF]
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<u32> {
        self.0.as_slice().to_vec()
    }
}

impl From<[u32; 16]> for Registers {
    fn from(values: [u32; 16]) -> Self {
        Self(values)
    }
}
