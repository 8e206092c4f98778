//! # Banked Registers for Exception Modes
//!
//! Each exception mode has its own R13 (SP), R14 (LR) and SPSR; FIQ
//! additionally banks R8-R12. The data-processing core never switches mode,
//! so this storage is only written by [`Arm7tdmi::reset`] and is otherwise
//! carried as state.
//!
//! [`Arm7tdmi::reset`]: crate::cpu::arm7tdmi::Arm7tdmi::reset

use serde::{Deserialize, Serialize};

use crate::cpu::psr::Psr;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterBank {
    pub r8_fiq: u32,
    pub r9_fiq: u32,
    pub r10_fiq: u32,
    pub r11_fiq: u32,
    pub r12_fiq: u32,
    pub r13_fiq: u32,
    pub r14_fiq: u32,

    /// R13 (SP) for Supervisor mode.
    pub r13_svc: u32,
    /// R14 (LR) for Supervisor mode; holds the pre-reset PC after a reset.
    pub r14_svc: u32,

    pub r13_abt: u32,
    pub r14_abt: u32,

    pub r13_irq: u32,
    pub r14_irq: u32,

    pub r13_und: u32,
    pub r14_und: u32,

    pub spsr_fiq: Psr,
    /// Holds the pre-reset CPSR after a reset.
    pub spsr_svc: Psr,
    pub spsr_abt: Psr,
    pub spsr_irq: Psr,
    pub spsr_und: Psr,
}
