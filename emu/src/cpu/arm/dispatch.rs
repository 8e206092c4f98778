//! # Dispatch Table
//!
//! A 4096-entry table indexed by bits 27-20 and 7-4 of the instruction:
//!
//! ```text
//! index = (opcode[27:20] << 4) | opcode[7:4]
//!
//!   11 10  9  8     5  4  3        0
//! ┌─────┬──┬────────┬──┬───────────┐
//! │ 0 0 │I │ OpCode │S │ bits 7..4 │
//! └─────┴──┴────────┴──┴───────────┘
//! ```
//!
//! - `0x000..=0x1FF` register operand 2. Bits 6-5 pick the shift type and
//!   bit 4 picks immediate or register amount; bit 7 does not take part.
//! - `0x200..=0x3FF` rotated immediate operand 2. The low nibble belongs to
//!   the immediate, so one handler fills all sixteen slots.
//! - Everything else is another instruction family and stays unmapped.
//!
//! Each handler is a monomorphised function with the operation, the S bit
//! and the shift encoding fixed at compile time. The table is built once on
//! first use and shared read-only by every processor.

use std::sync::LazyLock;

use crate::cpu::arm::alu_instruction::ArmModeAluInstruction;
use crate::cpu::arm7tdmi::Arm7tdmi;
use crate::cpu::flags::ShiftKind;

pub type ArmHandler = fn(&mut Arm7tdmi, u32);

pub const DISPATCH_TABLE_SIZE: usize = 4096;

const IMMEDIATE_BLOCK: usize = 0x200;

/// Computes the 12-bit dispatch index of `opcode`.
#[must_use]
pub const fn dispatch_index(opcode: u32) -> usize {
    (((opcode >> 16) & 0xFF0) | ((opcode >> 4) & 0xF)) as usize
}

pub static DISPATCH_TABLE: LazyLock<DispatchTable> = LazyLock::new(DispatchTable::build);

pub struct DispatchTable {
    handlers: Box<[Option<ArmHandler>]>,
}

impl DispatchTable {
    fn build() -> Self {
        let mut handlers = vec![None; DISPATCH_TABLE_SIZE].into_boxed_slice();

        for (op, class) in operation_classes().into_iter().enumerate() {
            for s in 0..2 {
                let base = (op << 5) | (s << 4);
                for low in 0..16 {
                    handlers[base | low] = Some(class.register[s][low & 0b111]);
                    handlers[IMMEDIATE_BLOCK | base | low] = Some(class.immediate[s]);
                }
            }
        }

        tracing::debug!(
            "dispatch table built with {} handlers",
            handlers.iter().flatten().count()
        );

        Self { handlers }
    }

    /// Returns the handler at `index`, or `None` for an unmapped slot.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<ArmHandler> {
        self.handlers.get(index).copied().flatten()
    }

    #[must_use]
    pub fn mapped_count(&self) -> usize {
        self.handlers.iter().flatten().count()
    }
}

/// Handlers of one operation class: eight register shift encodings and one
/// immediate form, each for S=0 and S=1.
struct OperationClass {
    register: [[ArmHandler; 8]; 2],
    immediate: [ArmHandler; 2],
}

fn class<const OP: u32>() -> OperationClass {
    OperationClass {
        register: [register_block::<OP, false>(), register_block::<OP, true>()],
        immediate: [immediate_form::<OP, false>, immediate_form::<OP, true>],
    }
}

fn operation_classes() -> [OperationClass; 16] {
    [
        class::<0x0>(),
        class::<0x1>(),
        class::<0x2>(),
        class::<0x3>(),
        class::<0x4>(),
        class::<0x5>(),
        class::<0x6>(),
        class::<0x7>(),
        class::<0x8>(),
        class::<0x9>(),
        class::<0xA>(),
        class::<0xB>(),
        class::<0xC>(),
        class::<0xD>(),
        class::<0xE>(),
        class::<0xF>(),
    ]
}

/// Indexed by bits 6-4: `(shift type << 1) | shift by register`.
fn register_block<const OP: u32, const S: bool>() -> [ArmHandler; 8] {
    [
        register_form::<OP, S, 0b00, false>,
        register_form::<OP, S, 0b00, true>,
        register_form::<OP, S, 0b01, false>,
        register_form::<OP, S, 0b01, true>,
        register_form::<OP, S, 0b10, false>,
        register_form::<OP, S, 0b10, true>,
        register_form::<OP, S, 0b11, false>,
        register_form::<OP, S, 0b11, true>,
    ]
}

fn register_form<const OP: u32, const S: bool, const SHIFT: u32, const BY_REGISTER: bool>(
    cpu: &mut Arm7tdmi,
    opcode: u32,
) {
    let op2 = cpu.register_operand(opcode, ShiftKind::from(SHIFT), BY_REGISTER);
    cpu.data_processing(ArmModeAluInstruction::from(OP), S, opcode, op2);
}

fn immediate_form<const OP: u32, const S: bool>(cpu: &mut Arm7tdmi, opcode: u32) {
    let op2 = cpu.immediate_operand(opcode);
    cpu.data_processing(ArmModeAluInstruction::from(OP), S, opcode, op2);
}
