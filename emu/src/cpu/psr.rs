//! # Program Status Registers (CPSR and SPSR)
//!
//! ```text
//! 31 30 29 28 27         8 7 6 5 4   0
//! ┌──┬──┬──┬──┬───────────┬─┬─┬─┬─────┐
//! │N │Z │C │V │ Reserved  │I│F│T│Mode │
//! └──┴──┴──┴──┴───────────┴─┴─┴─┴─────┘
//! ```
//!
//! - **Flags (28-31)**: tested by [`condition`](super::condition), written by
//!   flag-setting ALU operations only
//! - **I/F bits (7-6)**: IRQ/FIQ disable
//! - **T bit (5)**: ARM (0) or Thumb (1) state
//! - **Mode (4-0)**: see [`cpu_modes`](super::cpu_modes)
//!
//! The raw word is the only storage; every field is a view computed on
//! access, so the named fields and the raw value can never disagree.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::arm::alu_instruction::ArithmeticOpResult;
use crate::cpu::{condition::Condition, cpu_modes::Mode};

const SIGN_BIT: u8 = 31;
const ZERO_BIT: u8 = 30;
const CARRY_BIT: u8 = 29;
const OVERFLOW_BIT: u8 = 28;
const IRQ_DISABLE_BIT: u8 = 7;
const FIQ_DISABLE_BIT: u8 = 6;
const STATE_BIT: u8 = 5;
const MODE_MASK: u32 = 0b1_1111;

/// Program Status Register (CPSR or SPSR).
///
/// # Example
///
/// ```
/// use emu::cpu::psr::Psr;
///
/// let mut cpsr = Psr::default();
///
/// cpsr.set_zero_flag(true);
/// assert!(cpsr.zero_flag());
/// assert_eq!(u32::from(cpsr), 0x4000_0000);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Psr(u32);

impl Psr {
    /// Evaluates `cond` against the current flags.
    ///
    /// Returns `None` for the reserved `NV` encoding, which has no defined
    /// outcome; the caller decides how to fault.
    #[must_use]
    pub fn can_execute(self, cond: Condition) -> Option<bool> {
        use Condition::{AL, CC, CS, EQ, GE, GT, HI, LE, LS, LT, MI, NE, NV, PL, VC, VS};
        let execute = match cond {
            EQ => self.zero_flag(),
            NE => !self.zero_flag(),
            CS => self.carry_flag(),
            CC => !self.carry_flag(),
            MI => self.sign_flag(),
            PL => !self.sign_flag(),
            VS => self.overflow_flag(),
            VC => !self.overflow_flag(),
            HI => self.carry_flag() && !self.zero_flag(),
            LS => !self.carry_flag() || self.zero_flag(),
            GE => self.sign_flag() == self.overflow_flag(),
            LT => self.sign_flag() != self.overflow_flag(),
            GT => !self.zero_flag() && (self.sign_flag() == self.overflow_flag()),
            LE => self.zero_flag() || (self.sign_flag() != self.overflow_flag()),
            AL => true,
            NV => return None,
        };

        Some(execute)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// N => Bit 31, (0=Not Signed, 1=Signed)
    #[must_use]
    pub fn sign_flag(self) -> bool {
        self.0.get_bit(SIGN_BIT)
    }

    /// Z => Bit 30, (0=Not Zero, 1=Zero)
    #[must_use]
    pub fn zero_flag(self) -> bool {
        self.0.get_bit(ZERO_BIT)
    }

    /// C => Bit 29, (0=Borrow/No Carry, 1=Carry/No Borrow)
    #[must_use]
    pub fn carry_flag(self) -> bool {
        self.0.get_bit(CARRY_BIT)
    }

    /// V => Bit 28, (0=No Overflow, 1=Overflow)
    #[must_use]
    pub fn overflow_flag(self) -> bool {
        self.0.get_bit(OVERFLOW_BIT)
    }

    /// I => Bit 7, (0=Enable, 1=Disable)
    #[must_use]
    pub fn irq_disable(self) -> bool {
        self.0.get_bit(IRQ_DISABLE_BIT)
    }

    /// F => Bit 6, (0=Enable, 1=Disable)
    #[must_use]
    pub fn fiq_disable(self) -> bool {
        self.0.get_bit(FIQ_DISABLE_BIT)
    }

    /// T => Bit 5, (0=ARM, 1=THUMB)
    #[must_use]
    pub fn state_bit(self) -> bool {
        self.0.get_bit(STATE_BIT)
    }

    /// M4-M0 => Bits 4-0, as stored.
    #[must_use]
    pub const fn mode_raw(self) -> u32 {
        self.0 & MODE_MASK
    }

    /// M4-M0 => Bits 4-0
    ///
    /// Invalid mode bits (e.g. a zeroed SPSR) read back as Supervisor.
    #[must_use]
    pub fn mode(self) -> Mode {
        let mode_bits = self.mode_raw();
        Mode::try_from(mode_bits).unwrap_or_else(|_| {
            tracing::debug!(
                "invalid mode bits 0b{:05b} in PSR=0x{:08X}, defaulting to Supervisor",
                mode_bits,
                self.0
            );
            Mode::Supervisor
        })
    }

    #[must_use]
    pub fn cpu_state(self) -> CpuState {
        self.state_bit().into()
    }

    pub fn set_sign_flag(&mut self, value: bool) {
        self.0.set_bit(SIGN_BIT, value);
    }

    pub fn set_zero_flag(&mut self, value: bool) {
        self.0.set_bit(ZERO_BIT, value);
    }

    pub fn set_carry_flag(&mut self, value: bool) {
        self.0.set_bit(CARRY_BIT, value);
    }

    pub fn set_overflow_flag(&mut self, value: bool) {
        self.0.set_bit(OVERFLOW_BIT, value);
    }

    /// Writes N, Z, C and V from an arithmetic result.
    pub fn set_flags(&mut self, op_result: &ArithmeticOpResult) {
        self.set_sign_flag(op_result.sign);
        self.set_zero_flag(op_result.zero);
        self.set_carry_flag(op_result.carry);
        self.set_overflow_flag(op_result.overflow);
    }

    /// Writes N and Z from `result` and C from the shifter carry-out.
    /// V is left untouched.
    pub fn set_logical_flags(&mut self, result: u32, shifter_carry: bool) {
        self.set_sign_flag(result.sign_bit());
        self.set_zero_flag(result == 0);
        self.set_carry_flag(shifter_carry);
    }

    pub fn set_irq_disable(&mut self, value: bool) {
        self.0.set_bit(IRQ_DISABLE_BIT, value);
    }

    pub fn set_fiq_disable(&mut self, value: bool) {
        self.0.set_bit(FIQ_DISABLE_BIT, value);
    }

    pub fn set_state_bit(&mut self, value: bool) {
        self.0.set_bit(STATE_BIT, value);
    }

    pub fn set_cpu_state(&mut self, state: CpuState) {
        self.set_state_bit(state.into());
    }

    pub const fn set_mode_raw(&mut self, m: u32) {
        self.0 = (self.0 & !MODE_MASK) | (m & MODE_MASK);
    }

    pub const fn set_mode(&mut self, m: Mode) {
        self.set_mode_raw(m as u32);
    }
}

impl From<Mode> for Psr {
    fn from(m: Mode) -> Self {
        let mut s = Self(0);

        s.set_mode(m);

        s
    }
}

impl From<u32> for Psr {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<Psr> for u32 {
    fn from(p: Psr) -> Self {
        p.0
    }
}

impl std::fmt::Display for Psr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flag = |set: bool, c: char| if set { c } else { '-' };
        write!(
            f,
            "{}{}{}{} {}{}{} {}",
            flag(self.sign_flag(), 'N'),
            flag(self.zero_flag(), 'Z'),
            flag(self.carry_flag(), 'C'),
            flag(self.overflow_flag(), 'V'),
            flag(self.irq_disable(), 'I'),
            flag(self.fiq_disable(), 'F'),
            flag(self.state_bit(), 'T'),
            self.mode(),
        )
    }
}

/// The CPU execution state (ARM or Thumb), controlled by the T bit.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CpuState {
    /// Thumb: 16-bit instructions, fetched halfword-aligned.
    Thumb,
    /// ARM: 32-bit instructions, fetched word-aligned.
    Arm,
}

impl From<CpuState> for bool {
    fn from(state: CpuState) -> Self {
        match state {
            CpuState::Arm => false,
            CpuState::Thumb => true,
        }
    }
}

impl From<bool> for CpuState {
    fn from(state: bool) -> Self {
        if state { Self::Thumb } else { Self::Arm }
    }
}
