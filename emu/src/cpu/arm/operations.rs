//! # Data-Processing Operations
//!
//! ```text
//! 31  28 27 26 25 24   21 20 19  16 15  12 11          0
//! ┌─────┬─────┬──┬───────┬──┬──────┬──────┬─────────────┐
//! │Cond │ 0 0 │I │OpCode │S │  Rn  │  Rd  │  Operand 2  │
//! └─────┴─────┴──┴───────┴──┴──────┴──────┴─────────────┘
//! ```
//!
//! Logical operations (AND, EOR, TST, TEQ, ORR, MOV, BIC, MVN) set N and Z
//! from the result and C from the shifter carry-out, leaving V alone.
//! Arithmetic operations set all four flags from the adder.

use crate::bitwise::Bits;
use crate::cpu::arm::alu_instruction::{ArithmeticOpResult, ArmModeAluInstruction};
use crate::cpu::arm::barrel_shifter::{self, ShifterOutput};
use crate::cpu::arm7tdmi::Arm7tdmi;
use crate::cpu::flags::ShiftKind;

impl Arm7tdmi {
    /// Resolves a register operand 2 (I=0): Rm shifted by an immediate
    /// amount or by the low byte of Rs.
    #[must_use]
    pub fn register_operand(&self, opcode: u32, kind: ShiftKind, by_register: bool) -> ShifterOutput {
        let rm = self.registers.register_at(opcode.get_bits(0..=3) as usize);
        let carry = self.cpsr.carry_flag();

        if by_register {
            let rs = self.registers.register_at(opcode.get_bits(8..=11) as usize) & 0xFF;
            barrel_shifter::shift_by_register(kind, rm, rs, carry)
        } else {
            barrel_shifter::shift_by_immediate(kind, rm, opcode.get_bits(7..=11), carry)
        }
    }

    /// Resolves an immediate operand 2 (I=1).
    #[must_use]
    pub fn immediate_operand(&self, opcode: u32) -> ShifterOutput {
        barrel_shifter::rotated_immediate(opcode.get_bits(0..=11), self.cpsr.carry_flag())
    }

    /// Executes `alu_instruction` with an already resolved operand 2.
    ///
    /// Rn is read from bits 19-16 and Rd from bits 15-12 of `opcode`.
    pub fn data_processing(
        &mut self,
        alu_instruction: ArmModeAluInstruction,
        set_conditions: bool,
        opcode: u32,
        op2: ShifterOutput,
    ) {
        use ArmModeAluInstruction::{
            Adc, Add, And, Bic, Cmn, Cmp, Eor, Mov, Mvn, Orr, Rsb, Rsc, Sbc, Sub, Teq, Tst,
        };

        let rn = self.registers.register_at(opcode.get_bits(16..=19) as usize);
        let rd = opcode.get_bits(12..=15) as usize;

        match alu_instruction {
            And => self.and(rd, rn, op2, set_conditions),
            Eor => self.eor(rd, rn, op2, set_conditions),
            Sub => self.sub(rd, rn, op2.value, set_conditions),
            Rsb => self.rsb(rd, rn, op2.value, set_conditions),
            Add => self.add(rd, rn, op2.value, set_conditions),
            Adc => self.adc(rd, rn, op2.value, set_conditions),
            Sbc => self.sbc(rd, rn, op2.value, set_conditions),
            Rsc => self.rsc(rd, rn, op2.value, set_conditions),
            Tst => self.tst(rn, op2, set_conditions),
            Teq => self.teq(rn, op2, set_conditions),
            Cmp => self.cmp(rn, op2.value, set_conditions),
            Cmn => self.cmn(rn, op2.value, set_conditions),
            Orr => self.orr(rd, rn, op2, set_conditions),
            Mov => self.mov(rd, op2, set_conditions),
            Bic => self.bic(rd, rn, op2, set_conditions),
            Mvn => self.mvn(rd, op2, set_conditions),
        }
    }

    /// `first_op + second_op + carry_in`, done in 64 bits so that bit 32 is
    /// the carry.
    #[must_use]
    pub fn add_inner_op(first_op: u32, second_op: u32, carry_in: bool) -> ArithmeticOpResult {
        let result_and_carry =
            u64::from(first_op) + u64::from(second_op) + u64::from(carry_in);
        let result = result_and_carry as u32;

        // overflow only occurs when operands have the same sign and result has the opposite one
        let overflow = ((first_op ^ result) & (second_op ^ result)).sign_bit();

        ArithmeticOpResult {
            result,
            carry: result_and_carry >> 32 == 1,
            overflow,
            sign: result.sign_bit(),
            zero: result == 0,
        }
    }

    /// `first_op - second_op - !carry_in`, computed as
    /// `first_op + !second_op + carry_in`.
    ///
    /// The resulting carry is NOT borrow: set when no borrow occurred.
    #[must_use]
    pub fn sub_inner_op(first_op: u32, second_op: u32, carry_in: bool) -> ArithmeticOpResult {
        Self::add_inner_op(first_op, !second_op, carry_in)
    }

    fn write_logical(&mut self, rd: Option<usize>, result: u32, shifter_carry: bool, s: bool) {
        if let Some(rd) = rd {
            self.registers.set_register_at(rd, result);
        }

        if s {
            self.cpsr.set_logical_flags(result, shifter_carry);
        }
    }

    fn write_arithmetic(&mut self, rd: Option<usize>, op_result: &ArithmeticOpResult, s: bool) {
        if let Some(rd) = rd {
            self.registers.set_register_at(rd, op_result.result);
        }

        if s {
            self.cpsr.set_flags(op_result);
        }
    }

    pub fn and(&mut self, rd: usize, rn: u32, op2: ShifterOutput, s: bool) {
        self.write_logical(Some(rd), rn & op2.value, op2.carry, s);
    }

    pub fn eor(&mut self, rd: usize, rn: u32, op2: ShifterOutput, s: bool) {
        self.write_logical(Some(rd), rn ^ op2.value, op2.carry, s);
    }

    pub fn sub(&mut self, rd: usize, rn: u32, op2: u32, s: bool) {
        let sub_result = Self::sub_inner_op(rn, op2, true);
        self.write_arithmetic(Some(rd), &sub_result, s);
    }

    pub fn rsb(&mut self, rd: usize, rn: u32, op2: u32, s: bool) {
        let sub_result = Self::sub_inner_op(op2, rn, true);
        self.write_arithmetic(Some(rd), &sub_result, s);
    }

    pub fn add(&mut self, rd: usize, rn: u32, op2: u32, s: bool) {
        let add_result = Self::add_inner_op(rn, op2, false);
        self.write_arithmetic(Some(rd), &add_result, s);
    }

    pub fn adc(&mut self, rd: usize, rn: u32, op2: u32, s: bool) {
        let add_result = Self::add_inner_op(rn, op2, self.cpsr.carry_flag());
        self.write_arithmetic(Some(rd), &add_result, s);
    }

    pub fn sbc(&mut self, rd: usize, rn: u32, op2: u32, s: bool) {
        let sub_result = Self::sub_inner_op(rn, op2, self.cpsr.carry_flag());
        self.write_arithmetic(Some(rd), &sub_result, s);
    }

    pub fn rsc(&mut self, rd: usize, rn: u32, op2: u32, s: bool) {
        let sub_result = Self::sub_inner_op(op2, rn, self.cpsr.carry_flag());
        self.write_arithmetic(Some(rd), &sub_result, s);
    }

    pub fn tst(&mut self, rn: u32, op2: ShifterOutput, s: bool) {
        self.write_logical(None, rn & op2.value, op2.carry, s);
    }

    pub fn teq(&mut self, rn: u32, op2: ShifterOutput, s: bool) {
        self.write_logical(None, rn ^ op2.value, op2.carry, s);
    }

    pub fn cmp(&mut self, rn: u32, op2: u32, s: bool) {
        let sub_result = Self::sub_inner_op(rn, op2, true);
        self.write_arithmetic(None, &sub_result, s);
    }

    pub fn cmn(&mut self, rn: u32, op2: u32, s: bool) {
        let add_result = Self::add_inner_op(rn, op2, false);
        self.write_arithmetic(None, &add_result, s);
    }

    pub fn orr(&mut self, rd: usize, rn: u32, op2: ShifterOutput, s: bool) {
        self.write_logical(Some(rd), rn | op2.value, op2.carry, s);
    }

    pub fn mov(&mut self, rd: usize, op2: ShifterOutput, s: bool) {
        self.write_logical(Some(rd), op2.value, op2.carry, s);
    }

    pub fn bic(&mut self, rd: usize, rn: u32, op2: ShifterOutput, s: bool) {
        self.write_logical(Some(rd), rn & !op2.value, op2.carry, s);
    }

    pub fn mvn(&mut self, rd: usize, op2: ShifterOutput, s: bool) {
        self.write_logical(Some(rd), !op2.value, op2.carry, s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::cpu_modes::Mode;
    use crate::cpu::psr::Psr;
    use pretty_assertions::assert_eq;
    use rand::Rng;

    fn operand(value: u32, carry: bool) -> ShifterOutput {
        ShifterOutput { value, carry }
    }

    #[test]
    fn add_inner_op_flags() {
        let r = Arm7tdmi::add_inner_op(0x7FFF_FFFF, 1, false);
        assert_eq!(
            r,
            ArithmeticOpResult {
                result: 0x8000_0000,
                carry: false,
                overflow: true,
                sign: true,
                zero: false,
            }
        );

        let r = Arm7tdmi::add_inner_op(0xFFFF_FFFF, 1, false);
        assert_eq!(
            r,
            ArithmeticOpResult {
                result: 0,
                carry: true,
                overflow: false,
                sign: false,
                zero: true,
            }
        );

        let r = Arm7tdmi::add_inner_op(0xFFFF_FFFF, 0xFFFF_FFFF, true);
        assert_eq!(r.result, 0xFFFF_FFFF);
        assert!(r.carry);
        assert!(!r.overflow);
    }

    #[test]
    fn sub_inner_op_flags() {
        let r = Arm7tdmi::sub_inner_op(1, 2, true);
        assert_eq!(
            r,
            ArithmeticOpResult {
                result: 0xFFFF_FFFF,
                carry: false,
                overflow: false,
                sign: true,
                zero: false,
            }
        );

        let r = Arm7tdmi::sub_inner_op(0x7FFF_FFFF, 0xFFFF_FFFF, true);
        assert_eq!(r.result, 0x8000_0000);
        assert!(r.overflow);
        assert!(!r.carry);

        let r = Arm7tdmi::sub_inner_op(5, 5, true);
        assert!(r.zero);
        assert!(r.carry);

        // borrow-in: 5 - 5 - 1
        let r = Arm7tdmi::sub_inner_op(5, 5, false);
        assert_eq!(r.result, 0xFFFF_FFFF);
        assert!(!r.carry);
    }

    #[test]
    fn carry_matches_wide_arithmetic() {
        let mut rng = rand::rng();
        for _ in 0..512 {
            let a: u32 = rng.random();
            let b: u32 = rng.random();
            let c: bool = rng.random();

            let add = Arm7tdmi::add_inner_op(a, b, c);
            let wide = u64::from(a) + u64::from(b) + u64::from(c);
            assert_eq!(add.result, wide as u32);
            assert_eq!(add.carry, wide > u64::from(u32::MAX));
            let signed = i64::from(a as i32) + i64::from(b as i32) + i64::from(c);
            assert_eq!(add.overflow, i32::try_from(signed).is_err());

            let sub = Arm7tdmi::sub_inner_op(a, b, true);
            assert_eq!(sub.result, a.wrapping_sub(b));
            assert_eq!(sub.carry, a >= b);
            let signed = i64::from(a as i32) - i64::from(b as i32);
            assert_eq!(sub.overflow, i32::try_from(signed).is_err());
        }
    }

    #[test]
    fn check_and() {
        let mut cpu = Arm7tdmi::new();
        cpu.cpsr.set_carry_flag(true);
        cpu.and(0, 0xFFFF_FFFF, operand(0xFFFF_FFFF, true), true);
        assert_eq!(cpu.registers.register_at(0), 0xFFFF_FFFF);
        assert!(cpu.cpsr.sign_flag());
        assert!(cpu.cpsr.carry_flag());
        assert!(!cpu.cpsr.zero_flag());

        cpu.and(0, 0, operand(0, false), true);
        assert!(cpu.cpsr.zero_flag());
        assert!(!cpu.cpsr.sign_flag());
        assert!(!cpu.cpsr.carry_flag());
        assert!(!cpu.cpsr.overflow_flag());
    }

    #[test]
    fn logical_ops_leave_overflow() {
        let mut cpu = Arm7tdmi::new();
        cpu.cpsr.set_overflow_flag(true);
        cpu.eor(1, 0xF0, operand(0x0F, false), true);
        cpu.orr(2, 0xF0, operand(0x0F, false), true);
        cpu.bic(3, 0xFF, operand(0x0F, false), true);
        assert_eq!(cpu.registers.register_at(1), 0xFF);
        assert_eq!(cpu.registers.register_at(2), 0xFF);
        assert_eq!(cpu.registers.register_at(3), 0xF0);
        assert!(cpu.cpsr.overflow_flag());
    }

    #[test]
    fn check_mov_and_mvn() {
        let mut cpu = Arm7tdmi::new();
        cpu.mov(4, operand(0x1234, false), false);
        assert_eq!(cpu.registers.register_at(4), 0x1234);

        cpu.mvn(5, operand(0, true), true);
        assert_eq!(cpu.registers.register_at(5), 0xFFFF_FFFF);
        assert!(cpu.cpsr.sign_flag());
        assert!(cpu.cpsr.carry_flag());
    }

    #[test]
    fn flags_untouched_without_s() {
        let mut rng = rand::rng();
        let mut cpu = Arm7tdmi::new();
        let before = Psr::from(rng.random::<u32>() & 0xF000_0000 | 0xD3);
        cpu.cpsr = before;

        for op in 0..16_u32 {
            let alu = ArmModeAluInstruction::from(op);
            let opcode = (op << 21) | (1 << 16) | (2 << 12);
            cpu.registers.set_register_at(1, rng.random());
            cpu.data_processing(alu, false, opcode, operand(rng.random(), rng.random()));
            assert_eq!(cpu.cpsr, before, "{alu}");
        }
        assert_eq!(cpu.cpsr.mode(), Mode::Supervisor);
    }

    #[test]
    fn compares_write_only_flags() {
        let mut cpu = Arm7tdmi::new();
        for r in 0..15 {
            cpu.registers.set_register_at(r, r as u32 * 3);
        }
        let before = cpu.registers.clone();

        for op in [
            ArmModeAluInstruction::Tst,
            ArmModeAluInstruction::Teq,
            ArmModeAluInstruction::Cmp,
            ArmModeAluInstruction::Cmn,
        ] {
            let opcode = ((op as u32) << 21) | (1 << 20) | (3 << 16) | (7 << 12);
            cpu.data_processing(op, true, opcode, operand(9, true));
            assert_eq!(cpu.registers, before, "{op}");
        }
    }

    #[test]
    fn check_cmp() {
        let mut cpu = Arm7tdmi::new();
        cpu.cmp(1, 2, true);
        assert!(cpu.cpsr.sign_flag());
        assert!(!cpu.cpsr.carry_flag());
        assert!(!cpu.cpsr.overflow_flag());
        assert!(!cpu.cpsr.zero_flag());

        cpu.cmp(2, 2, true);
        assert!(cpu.cpsr.zero_flag());
        assert!(cpu.cpsr.carry_flag());
    }

    #[test]
    fn check_cmn() {
        let mut cpu = Arm7tdmi::new();
        cpu.cmn(0xFFFF_FFFF, 1, true);
        assert!(cpu.cpsr.zero_flag());
        assert!(cpu.cpsr.carry_flag());
        assert!(!cpu.cpsr.sign_flag());
        assert!(!cpu.cpsr.overflow_flag());
    }

    #[test]
    fn check_adc_sbc_rsc_use_carry() {
        let mut cpu = Arm7tdmi::new();

        cpu.cpsr.set_carry_flag(true);
        cpu.adc(0, 1, 1, false);
        assert_eq!(cpu.registers.register_at(0), 3);

        cpu.cpsr.set_carry_flag(false);
        cpu.sbc(0, 5, 2, false);
        assert_eq!(cpu.registers.register_at(0), 2);

        cpu.cpsr.set_carry_flag(true);
        cpu.sbc(0, 5, 2, false);
        assert_eq!(cpu.registers.register_at(0), 3);

        cpu.cpsr.set_carry_flag(false);
        cpu.rsc(0, 2, 5, true);
        assert_eq!(cpu.registers.register_at(0), 2);
        assert!(cpu.cpsr.carry_flag());
    }

    #[test]
    fn check_rsb() {
        let mut cpu = Arm7tdmi::new();
        cpu.rsb(0, 1, 0, true);
        assert_eq!(cpu.registers.register_at(0), 0xFFFF_FFFF);
        assert!(cpu.cpsr.sign_flag());
        assert!(!cpu.cpsr.carry_flag());
    }

    #[test]
    fn register_operand_reads_rs_low_byte() {
        let mut cpu = Arm7tdmi::new();
        cpu.registers.set_register_at(1, 0x8000_0000);
        cpu.registers.set_register_at(2, 0x101);
        // Rm = R1, LSR by R2
        let opcode = (2 << 8) | (0b01 << 5) | (1 << 4) | 1;
        let out = cpu.register_operand(opcode, ShiftKind::Lsr, true);
        assert_eq!(out, operand(0x4000_0000, false));
    }

    #[test]
    fn register_operand_reads_pc_unmodified() {
        let mut cpu = Arm7tdmi::new();
        cpu.registers.set_program_counter(0x100);
        let out = cpu.register_operand(0xF, ShiftKind::Lsl, false);
        assert_eq!(out.value, 0x100);
    }
}
