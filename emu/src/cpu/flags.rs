use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Barrel shifter operation, bits 6-5 of a register operand.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum ShiftKind {
    Lsl,
    Lsr,
    Asr,
    Ror,
}

impl From<u32> for ShiftKind {
    /// Only the low 2 bits are considered.
    fn from(op_code: u32) -> Self {
        match op_code & 0b11 {
            0b00 => Self::Lsl,
            0b01 => Self::Lsr,
            0b10 => Self::Asr,
            _ => Self::Ror,
        }
    }
}

impl From<u8> for ShiftKind {
    fn from(op_code: u8) -> Self {
        u32::from(op_code).into()
    }
}

impl From<ShiftKind> for u32 {
    fn from(kind: ShiftKind) -> Self {
        match kind {
            ShiftKind::Lsl => 0b00,
            ShiftKind::Lsr => 0b01,
            ShiftKind::Asr => 0b10,
            ShiftKind::Ror => 0b11,
        }
    }
}

impl Display for ShiftKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lsl => f.write_str("LSL"),
            Self::Lsr => f.write_str("LSR"),
            Self::Asr => f.write_str("ASR"),
            Self::Ror => f.write_str("ROR"),
        }
    }
}

impl std::str::FromStr for ShiftKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LSL" | "ASL" => Ok(Self::Lsl),
            "LSR" => Ok(Self::Lsr),
            "ASR" => Ok(Self::Asr),
            "ROR" => Ok(Self::Ror),
            _ => Err(format!("unknown shift {s}")),
        }
    }
}
