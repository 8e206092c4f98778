use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::flags::ShiftKind;

/// Data-processing opcode, bits 24-21 of the instruction.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum ArmModeAluInstruction {
    And = 0x0,
    Eor = 0x1,
    Sub = 0x2,
    Rsb = 0x3,
    Add = 0x4,
    Adc = 0x5,
    Sbc = 0x6,
    Rsc = 0x7,
    Tst = 0x8,
    Teq = 0x9,
    Cmp = 0xA,
    Cmn = 0xB,
    Orr = 0xC,
    Mov = 0xD,
    Bic = 0xE,
    Mvn = 0xF,
}

impl ArmModeAluInstruction {
    /// `TST`, `TEQ`, `CMP` and `CMN` only compute flags; every other
    /// operation writes its result to Rd.
    #[must_use]
    pub const fn writes_destination(self) -> bool {
        !matches!(self, Self::Tst | Self::Teq | Self::Cmp | Self::Cmn)
    }

    /// `MOV` and `MVN` ignore Rn.
    #[must_use]
    pub const fn uses_first_operand(self) -> bool {
        !matches!(self, Self::Mov | Self::Mvn)
    }
}

impl Display for ArmModeAluInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => f.write_str("AND"),
            Self::Eor => f.write_str("EOR"),
            Self::Sub => f.write_str("SUB"),
            Self::Rsb => f.write_str("RSB"),
            Self::Add => f.write_str("ADD"),
            Self::Adc => f.write_str("ADC"),
            Self::Sbc => f.write_str("SBC"),
            Self::Rsc => f.write_str("RSC"),
            Self::Tst => f.write_str("TST"),
            Self::Teq => f.write_str("TEQ"),
            Self::Cmp => f.write_str("CMP"),
            Self::Cmn => f.write_str("CMN"),
            Self::Orr => f.write_str("ORR"),
            Self::Mov => f.write_str("MOV"),
            Self::Bic => f.write_str("BIC"),
            Self::Mvn => f.write_str("MVN"),
        }
    }
}

impl std::str::FromStr for ArmModeAluInstruction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        (0..16_u32)
            .map(Self::from)
            .find(|op| op.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown mnemonic {s}"))
    }
}

impl From<u32> for ArmModeAluInstruction {
    /// Only the low 4 bits are considered.
    fn from(alu_op_code: u32) -> Self {
        use ArmModeAluInstruction::{
            Adc, Add, And, Bic, Cmn, Cmp, Eor, Mov, Mvn, Orr, Rsb, Rsc, Sbc, Sub, Teq, Tst,
        };
        match alu_op_code & 0xF {
            0x0 => And,
            0x1 => Eor,
            0x2 => Sub,
            0x3 => Rsb,
            0x4 => Add,
            0x5 => Adc,
            0x6 => Sbc,
            0x7 => Rsc,
            0x8 => Tst,
            0x9 => Teq,
            0xA => Cmp,
            0xB => Cmn,
            0xC => Orr,
            0xD => Mov,
            0xE => Bic,
            _ => Mvn,
        }
    }
}

/// Result of an adder pass together with the NZCV flags it produces.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArithmeticOpResult {
    pub result: u32,
    pub carry: bool,
    pub overflow: bool,
    pub sign: bool,
    pub zero: bool,
}

/// Source of the shift amount of a register operand 2.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShiftOperator {
    /// 5-bit amount from bits 11-7.
    Immediate(u32),
    /// Register number from bits 11-8.
    Register(u32),
}

impl std::fmt::Display for ShiftOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immediate(value) => write!(f, "#{value}"),
            Self::Register(register) => write!(f, "R{register}"),
        }
    }
}

/// Decoded operand 2 fields (bit 25 and bits 11-0).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AluSecondOperandInfo {
    Register {
        shift_op: ShiftOperator,
        shift_kind: ShiftKind,
        register: u32,
    },
    /// `base` rotated right by `shift` (always even, 0-30).
    Immediate { base: u32, shift: u32 },
}

impl AluSecondOperandInfo {
    #[must_use]
    pub fn decode(opcode: u32) -> Self {
        if opcode.get_bit(25) {
            Self::Immediate {
                base: opcode.get_bits(0..=7),
                shift: opcode.get_bits(8..=11) * 2,
            }
        } else {
            let shift_op = if opcode.get_bit(4) {
                ShiftOperator::Register(opcode.get_bits(8..=11))
            } else {
                ShiftOperator::Immediate(opcode.get_bits(7..=11))
            };

            Self::Register {
                shift_op,
                shift_kind: opcode.get_bits(5..=6).into(),
                register: opcode.get_bits(0..=3),
            }
        }
    }

    /// Packs the operand back into bit 25 and bits 11-0.
    #[must_use]
    pub fn encode(self) -> u32 {
        match self {
            Self::Immediate { base, shift } => {
                (1 << 25) | (((shift / 2) & 0xF) << 8) | (base & 0xFF)
            }
            Self::Register {
                shift_op,
                shift_kind,
                register,
            } => {
                let shift_bits = match shift_op {
                    ShiftOperator::Immediate(amount) => (amount & 0x1F) << 7,
                    ShiftOperator::Register(rs) => ((rs & 0xF) << 8) | (1 << 4),
                };

                shift_bits | (u32::from(shift_kind) << 5) | (register & 0xF)
            }
        }
    }
}

impl std::fmt::Display for AluSecondOperandInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Register {
                shift_op,
                shift_kind,
                register,
            } => {
                // An immediate amount of 0 stands for "no shift" with LSL and
                // for a shift by 32 with every other kind.
                match (shift_op, shift_kind) {
                    (ShiftOperator::Immediate(0), ShiftKind::Lsl) => write!(f, "R{register}"),
                    (ShiftOperator::Immediate(0), _) => {
                        write!(f, "R{register}, {shift_kind} #32")
                    }
                    _ => write!(f, "R{register}, {shift_kind} {shift_op}"),
                }
            }
            Self::Immediate { base, shift } => {
                write!(f, "#{}", base.rotate_right(shift))
            }
        }
    }
}
