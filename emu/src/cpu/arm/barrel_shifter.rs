//! # Barrel Shifter
//!
//! Resolves operand 2 of a data-processing instruction and the carry-out
//! that flag-setting logical operations copy into C.
//!
//! ```text
//! Register operand (I=0):
//! 11      7 6  5 4 3  0        11   8 7 6  5 4 3  0
//! ┌────────┬────┬─┬────┐       ┌─────┬─┬────┬─┬────┐
//! │ amount │type│0│ Rm │       │ Rs  │0│type│1│ Rm │
//! └────────┴────┴─┴────┘       └─────┴─┴────┴─┴────┘
//!   shift by immediate           shift by register
//!
//! Immediate operand (I=1):
//! 11    8 7        0
//! ┌──────┬──────────┐
//! │rotate│   imm8   │   value = imm8 ROR (rotate * 2)
//! └──────┴──────────┘
//! ```
//!
//! Every function here is pure: the carry-out is returned with the value
//! and never stored, so nothing carries over between instructions.

use crate::bitwise::Bits;
use crate::cpu::flags::ShiftKind;

/// Operand 2 together with the shifter carry-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShifterOutput {
    pub value: u32,
    pub carry: bool,
}

impl ShifterOutput {
    const fn unshifted(value: u32, carry: bool) -> Self {
        Self { value, carry }
    }
}

/// Shift with a 5-bit immediate amount (bits 11-7).
///
/// An amount of 0 only means "no shift" for LSL. LSR, ASR and ROR use it to
/// encode a shift by 32.
#[must_use]
pub fn shift_by_immediate(kind: ShiftKind, value: u32, amount: u32, carry_in: bool) -> ShifterOutput {
    let amount = amount & 0x1F;
    if amount != 0 {
        return shift(kind, value, amount);
    }

    match kind {
        ShiftKind::Lsl => ShifterOutput::unshifted(value, carry_in),
        // LSR #32
        ShiftKind::Lsr => ShifterOutput {
            value: 0,
            carry: value.sign_bit(),
        },
        // ASR #32
        ShiftKind::Asr => ShifterOutput {
            value: ((value as i32) >> 31) as u32,
            carry: value.sign_bit(),
        },
        // Rotating by 32 leaves the value in place; the last bit out is bit 31.
        ShiftKind::Ror => ShifterOutput {
            value,
            carry: value.sign_bit(),
        },
    }
}

/// Shift with the amount taken from the low byte of Rs.
///
/// Only the low 5 bits of `rs_value` are used. When they are all zero the
/// operand passes through with the current carry, whatever the shift type.
#[must_use]
pub fn shift_by_register(kind: ShiftKind, value: u32, rs_value: u32, carry_in: bool) -> ShifterOutput {
    match rs_value & 0x1F {
        0 => ShifterOutput::unshifted(value, carry_in),
        amount => shift(kind, value, amount),
    }
}

/// Decodes a rotated 8-bit immediate (bits 11-0 of the instruction).
#[must_use]
pub fn rotated_immediate(operand: u32, carry_in: bool) -> ShifterOutput {
    let imm = operand.get_bits(0..=7);
    let rotate = operand.get_bits(8..=11) * 2;

    if rotate == 0 {
        return ShifterOutput::unshifted(imm, carry_in);
    }

    let value = imm.rotate_right(rotate);
    ShifterOutput {
        value,
        carry: value.sign_bit(),
    }
}

/// Shift by `amount` in `1..=31`.
fn shift(kind: ShiftKind, value: u32, amount: u32) -> ShifterOutput {
    debug_assert!((1..=31).contains(&amount));
    let last_out = (amount - 1) as u8;

    match kind {
        ShiftKind::Lsl => ShifterOutput {
            value: value << amount,
            carry: value.get_bit((32 - amount) as u8),
        },
        ShiftKind::Lsr => ShifterOutput {
            value: value >> amount,
            carry: value.get_bit(last_out),
        },
        ShiftKind::Asr => ShifterOutput {
            value: ((value as i32) >> amount) as u32,
            carry: value.get_bit(last_out),
        },
        ShiftKind::Ror => ShifterOutput {
            value: value.rotate_right(amount),
            carry: value.get_bit(last_out),
        },
    }
}
