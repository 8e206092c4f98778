//! # Data-Processing Assembler
//!
//! Turns source text into instruction words, one instruction per line.
//! It exists to build test programs; the CPU never calls it.
//!
//! ```text
//! <op>[cond][S] Rd, Rn, <op2>     AND EOR SUB RSB ADD ADC SBC RSC ORR BIC
//! <op>[cond][S] Rd, <op2>         MOV MVN
//! <op>[cond]    Rn, <op2>         TST TEQ CMP CMN (always flag-setting)
//!
//! <op2> := #imm | Rm | Rm, <shift> #n | Rm, <shift> Rs
//! ```
//!
//! `;` starts a comment. Mnemonics, registers and shifts are case
//! insensitive.
//!
//! # Example
//!
//! ```
//! use emu::asm::assemble;
//!
//! let words = assemble("ands r0, r8, r8, lsr #32\ncmpne r1, #4").unwrap();
//! assert_eq!(words, vec![0xE018_0028, 0x1351_0004]);
//! ```

mod encoder;
mod lexer;
mod parser;

pub use encoder::{encode_data_processing, encode_immediate, encode_shift};

use crate::cpu::flags::ShiftKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmErrorKind {
    UnknownMnemonic(String),
    Syntax(String),
    InvalidRegister(String),
    ShiftOutOfRange { kind: ShiftKind, amount: u32 },
    ImmediateNotEncodable(u32),
}

impl std::fmt::Display for AsmErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownMnemonic(mnemonic) => write!(f, "unknown mnemonic {mnemonic}"),
            Self::Syntax(message) => f.write_str(message),
            Self::InvalidRegister(name) => write!(f, "invalid register {name}"),
            Self::ShiftOutOfRange { kind, amount } => {
                write!(f, "{kind} #{amount} is out of range")
            }
            Self::ImmediateNotEncodable(value) => {
                write!(f, "0x{value:X} is not an 8-bit value rotated by an even amount")
            }
        }
    }
}

/// An error found while assembling, with its 1-indexed position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsmError {
    pub line: usize,
    pub column: usize,
    pub kind: AsmErrorKind,
}

impl std::fmt::Display for AsmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}: {}", self.line, self.column, self.kind)
    }
}

impl std::error::Error for AsmError {}

/// Assembles every non-empty line of `source`.
///
/// # Errors
///
/// Stops at the first line that cannot be assembled.
pub fn assemble(source: &str) -> Result<Vec<u32>, AsmError> {
    let mut words = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let line_number = index + 1;
        let tokens = lexer::tokenize(line).map_err(|(column, kind)| AsmError {
            line: line_number,
            column,
            kind,
        })?;

        if tokens.is_empty() {
            continue;
        }

        let opcode = parser::parse_instruction(&tokens).map_err(|(column, kind)| AsmError {
            line: line_number,
            column,
            kind,
        })?;
        words.push(opcode);
    }

    Ok(words)
}
