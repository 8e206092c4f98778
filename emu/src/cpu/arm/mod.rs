//! # ARM Data-Processing Instructions (32-bit)
//!
//! ## Format
//!
//! ```text
//! 31-28   27-26  25  24-21   20  19-16  15-12  11-0
//! [Cond]  [00]   [I] [OpCode][S] [Rn]   [Rd]   [Operand 2]
//! ```
//!
//! - **Condition (bits 31-28)**: See [`condition`](super::condition)
//! - **I (bit 25)**: operand 2 is a rotated immediate (1) or a shifted register (0)
//! - **S (bit 20)**: update the condition flags
//!
//! ## Submodules
//!
//! - [`alu_instruction`] - The sixteen operations
//! - [`barrel_shifter`] - Operand 2 and shifter carry-out
//! - [`operations`] - Execution
//! - [`dispatch`] - Opcode to handler table

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_lossless)]
pub mod alu_instruction;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
pub mod barrel_shifter;

#[allow(clippy::cast_possible_truncation)]
pub mod dispatch;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_lossless)]
#[allow(clippy::similar_names)]
pub mod operations;
