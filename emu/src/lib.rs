#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
mod bitwise;

#[allow(clippy::cast_possible_truncation)]
pub mod asm;

pub mod bus;

pub mod cpu;

#[cfg(feature = "disassembler")]
pub mod disassembler;
