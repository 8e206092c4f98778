use crate::cpu::arm::alu_instruction::{AluSecondOperandInfo, ArmModeAluInstruction, ShiftOperator};
use crate::cpu::condition::Condition;
use crate::cpu::flags::ShiftKind;

use super::AsmErrorKind;

/// Packs the fields of a data-processing instruction into a word.
///
/// No field is validated beyond masking it to its width; compares are
/// encoded with whatever `set_conditions` says.
#[must_use]
pub fn encode_data_processing(
    condition: Condition,
    alu_instruction: ArmModeAluInstruction,
    set_conditions: bool,
    rn: u32,
    rd: u32,
    op2: AluSecondOperandInfo,
) -> u32 {
    ((condition as u32) << 28)
        | ((alu_instruction as u32) << 21)
        | (u32::from(set_conditions) << 20)
        | ((rn & 0xF) << 16)
        | ((rd & 0xF) << 12)
        | op2.encode()
}

/// Finds the smallest even rotation that turns `value` into an 8-bit
/// immediate.
#[must_use]
pub fn encode_immediate(value: u32) -> Option<AluSecondOperandInfo> {
    (0..16).find_map(|rotate: u32| {
        let shift = rotate * 2;
        let base = value.rotate_left(shift);
        (base <= 0xFF).then_some(AluSecondOperandInfo::Immediate { base, shift })
    })
}

/// Encodes `Rm, <kind> #amount`.
///
/// LSL takes 0-31; LSR, ASR and ROR take 1-32, with 32 stored as 0. A shift
/// by 0 of any kind is stored as LSL #0.
///
/// # Errors
///
/// [`AsmErrorKind::ShiftOutOfRange`] when the amount cannot be encoded.
pub fn encode_shift(
    register: u32,
    kind: ShiftKind,
    amount: u32,
) -> Result<AluSecondOperandInfo, AsmErrorKind> {
    let (shift_kind, stored) = match (kind, amount) {
        (_, 0) => (ShiftKind::Lsl, 0),
        (_, 1..=31) => (kind, amount),
        (ShiftKind::Lsr | ShiftKind::Asr | ShiftKind::Ror, 32) => (kind, 0),
        _ => return Err(AsmErrorKind::ShiftOutOfRange { kind, amount }),
    };

    Ok(AluSecondOperandInfo::Register {
        shift_op: ShiftOperator::Immediate(stored),
        shift_kind,
        register,
    })
}
