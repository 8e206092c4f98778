//! Renders data-processing instruction words in conventional assembler
//! syntax. Used by the per-instruction trace and by the runner.

use crate::bitwise::Bits;
use crate::cpu::arm::alu_instruction::{AluSecondOperandInfo, ArmModeAluInstruction};
use crate::cpu::condition::Condition;

/// Disassembles one instruction word.
///
/// Words outside the data-processing space are rendered as `UNDEFINED`.
///
/// # Example
///
/// ```
/// use emu::disassembler::disassemble;
///
/// assert_eq!(disassemble(0xE018_0028), "ANDS R0, R8, R8, LSR #32");
/// assert_eq!(disassemble(0x1351_0004), "CMPNE R1, #4");
/// ```
#[must_use]
pub fn disassemble(opcode: u32) -> String {
    if opcode.get_bits(26..=27) != 0 {
        return "UNDEFINED".to_owned();
    }

    let condition = Condition::from_opcode(opcode);
    let alu_instruction = ArmModeAluInstruction::from(opcode.get_bits(21..=24));
    let set_string = if opcode.get_bit(20) { "S" } else { "" };
    let rn = opcode.get_bits(16..=19);
    let destination = opcode.get_bits(12..=15);
    let op2 = AluSecondOperandInfo::decode(opcode);

    if !alu_instruction.writes_destination() {
        format!("{alu_instruction}{condition} R{rn}, {op2}")
    } else if !alu_instruction.uses_first_operand() {
        format!("{alu_instruction}{condition}{set_string} R{destination}, {op2}")
    } else {
        format!("{alu_instruction}{condition}{set_string} R{destination}, R{rn}, {op2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn register_operands() {
        assert_eq!(disassemble(0xE1A0_0001), "MOV R0, R1");
        assert_eq!(disassemble(0xE021_0372), "EOR R0, R1, R2, ROR R3");
        assert_eq!(disassemble(0xE018_0028), "ANDS R0, R8, R8, LSR #32");
        assert_eq!(disassemble(0xE019_0049), "ANDS R0, R9, R9, ASR #32");
        assert_eq!(disassemble(0xE090_0F81), "ADDS R0, R0, R1, LSL #31");
    }

    #[test]
    fn immediate_operands() {
        assert_eq!(disassemble(0x1351_0004), "CMPNE R1, #4");
        assert_eq!(disassemble(0xE3A0_0001), "MOV R0, #1");
        assert_eq!(disassemble(0xE3E0_04FF), "MVN R0, #4278190080");
        assert_eq!(disassemble(0xB2D2_100A), "SBCLTS R1, R2, #10");
    }

    #[test]
    fn compares_have_no_destination() {
        assert_eq!(disassemble(0xE111_0002), "TST R1, R2");
        assert_eq!(disassemble(0xE137_0005), "TEQ R7, R5");
        assert_eq!(disassemble(0x4170_0003), "CMNMI R0, R3");
    }

    #[test]
    fn other_families_are_undefined() {
        assert_eq!(disassemble(0xE591_0000), "UNDEFINED");
        assert_eq!(disassemble(0xEA00_0000), "UNDEFINED");
    }
}
