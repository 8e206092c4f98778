use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::bus::InstructionBus;
use crate::cpu::arm::dispatch::{DISPATCH_TABLE, dispatch_index};
use crate::cpu::condition::Condition;
use crate::cpu::cpu_modes::Mode;
use crate::cpu::error::CpuError;
use crate::cpu::psr::{CpuState, Psr};
use crate::cpu::register_bank::RegisterBank;
use crate::cpu::registers::Registers;

pub const SIZE_OF_ARM_INSTRUCTION: u32 = 4;
pub const SIZE_OF_THUMB_INSTRUCTION: u32 = 2;

/// Observer called with each instruction word that is about to execute.
pub type Tracer = Box<dyn FnMut(u32) + Send>;

/// Processor state and the fetch-execute engine.
///
/// The engine never advances the program counter on its own: whoever drives
/// [`step`](Self::step) decides where the next instruction comes from.
#[derive(Serialize, Deserialize)]
pub struct Arm7tdmi {
    pub cpsr: Psr,
    pub registers: Registers,
    pub register_bank: RegisterBank,

    #[serde(skip)]
    tracer: Option<Tracer>,
}

impl Default for Arm7tdmi {
    fn default() -> Self {
        Self::new()
    }
}

/// Clones the architectural state. The tracer is not carried over.
impl Clone for Arm7tdmi {
    fn clone(&self) -> Self {
        Self {
            cpsr: self.cpsr,
            registers: self.registers.clone(),
            register_bank: self.register_bank.clone(),
            tracer: None,
        }
    }
}

impl std::fmt::Debug for Arm7tdmi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arm7tdmi")
            .field("cpsr", &self.cpsr)
            .field("registers", &self.registers)
            .field("register_bank", &self.register_bank)
            .field("tracer", &self.tracer.is_some())
            .finish()
    }
}

impl Arm7tdmi {
    /// Zeroed registers followed by [`reset`](Self::reset).
    #[must_use]
    pub fn new() -> Self {
        let mut s = Self {
            cpsr: Psr::default(),
            registers: Registers::default(),
            register_bank: RegisterBank::default(),
            tracer: None,
        };

        s.reset();

        s
    }

    /// Takes the reset exception: the old PC and CPSR are saved into the
    /// Supervisor bank, then the CPU restarts at address 0 in Supervisor
    /// mode, ARM state, with IRQ and FIQ disabled.
    ///
    /// R0-R14 are not touched.
    pub fn reset(&mut self) {
        self.register_bank.r14_svc = self.registers.program_counter();
        self.register_bank.spsr_svc = self.cpsr;

        let mut cpsr = Psr::from(Mode::Supervisor);
        cpsr.set_irq_disable(true);
        cpsr.set_fiq_disable(true);
        cpsr.set_cpu_state(CpuState::Arm);
        self.cpsr = cpsr;

        self.registers.set_program_counter(0);

        tracing::debug!("reset, CPSR=0x{:08X}", self.cpsr.raw());
    }

    pub fn set_tracer(&mut self, tracer: Tracer) {
        self.tracer = Some(tracer);
    }

    pub fn clear_tracer(&mut self) -> Option<Tracer> {
        self.tracer.take()
    }

    /// Address of the next instruction. ARM instructions are word aligned,
    /// Thumb instructions halfword aligned.
    #[must_use]
    pub fn fetch_address(&self) -> u32 {
        let mut pc = self.registers.program_counter();
        pc.set_bit_off(0);
        if self.cpsr.cpu_state() == CpuState::Arm {
            pc.set_bit_off(1);
        }

        pc
    }

    /// Fetches one word at [`fetch_address`](Self::fetch_address) and runs it
    /// through [`execute`](Self::execute).
    ///
    /// # Errors
    ///
    /// Forwards the decode faults of [`execute`](Self::execute).
    pub fn step<B: InstructionBus + ?Sized>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        let opcode = bus.read_word(self.fetch_address());

        self.execute(opcode)
    }

    /// Evaluates the condition of `opcode` and, when it passes, runs the
    /// handler selected by its dispatch index.
    ///
    /// A failed condition is a no-op.
    ///
    /// # Errors
    ///
    /// - [`CpuError::ReservedCondition`] for condition `0b1111`
    /// - [`CpuError::UnmappedInstruction`] for words outside the
    ///   data-processing space
    ///
    /// In both cases no register or flag has been modified.
    pub fn execute(&mut self, opcode: u32) -> Result<(), CpuError> {
        let condition = Condition::from_opcode(opcode);
        let Some(can_execute) = self.cpsr.can_execute(condition) else {
            let error = CpuError::ReservedCondition { opcode };
            tracing::error!("{error}");
            return Err(error);
        };

        if !can_execute {
            tracing::trace!("skipped 0x{opcode:08X}, {condition:?} failed");
            return Ok(());
        }

        let index = dispatch_index(opcode);
        let Some(handler) = DISPATCH_TABLE.get(index) else {
            let error = CpuError::UnmappedInstruction { opcode, index };
            tracing::error!("{error}");
            return Err(error);
        };

        #[cfg(feature = "disassembler")]
        tracing::trace!(
            "0x{opcode:08X} [0x{index:03X}] {}",
            crate::disassembler::disassemble(opcode)
        );
        #[cfg(not(feature = "disassembler"))]
        tracing::trace!("0x{opcode:08X} [0x{index:03X}]");

        if let Some(tracer) = self.tracer.as_mut() {
            tracer(opcode);
        }

        handler(self, opcode);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::WordMemory;
    use crate::cpu::registers::{REG_LR, REG_PROGRAM_COUNTER};
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    const RESET_CPSR: u32 = 0b1101_0011;

    #[test]
    fn power_on_state() {
        let cpu = Arm7tdmi::new();
        assert_eq!(cpu.cpsr.raw(), RESET_CPSR);
        assert_eq!(cpu.cpsr.mode(), Mode::Supervisor);
        assert_eq!(cpu.cpsr.cpu_state(), CpuState::Arm);
        assert_eq!(cpu.registers.to_vec(), vec![0; 16]);
    }

    #[test]
    fn reset_saves_pc_and_cpsr() {
        let mut cpu = Arm7tdmi::new();
        cpu.registers.set_register_at(3, 33);
        cpu.registers.set_register_at(REG_LR, 0xDEAD);
        cpu.registers.set_program_counter(0x80);
        cpu.cpsr.set_zero_flag(true);
        cpu.cpsr.set_mode(Mode::User);
        let old_cpsr = cpu.cpsr;

        cpu.reset();

        assert_eq!(cpu.register_bank.r14_svc, 0x80);
        assert_eq!(cpu.register_bank.spsr_svc, old_cpsr);
        assert_eq!(cpu.cpsr.raw(), RESET_CPSR);
        assert_eq!(cpu.registers.program_counter(), 0);
        assert_eq!(cpu.registers.register_at(3), 33);
        assert_eq!(cpu.registers.register_at(REG_LR), 0xDEAD);
    }

    struct RecordingBus {
        addresses: Vec<u32>,
        word: u32,
    }

    impl InstructionBus for RecordingBus {
        fn read_word(&mut self, address: u32) -> u32 {
            self.addresses.push(address);
            self.word
        }
    }

    #[test]
    fn fetch_is_aligned_to_state() {
        // MOV R0, R0
        let mut bus = RecordingBus {
            addresses: Vec::new(),
            word: 0xE1A0_0000,
        };
        let mut cpu = Arm7tdmi::new();

        cpu.registers.set_program_counter(0x1003);
        cpu.step(&mut bus).unwrap();

        cpu.cpsr.set_cpu_state(CpuState::Thumb);
        cpu.step(&mut bus).unwrap();

        assert_eq!(bus.addresses, vec![0x1000, 0x1002]);
        assert_eq!(cpu.registers.program_counter(), 0x1003);
    }

    #[test]
    fn step_does_not_advance_pc() {
        // MOV R1, #5
        let mut memory = WordMemory::from_words(&[0xE3A0_1005]);
        let mut cpu = Arm7tdmi::new();
        cpu.step(&mut memory).unwrap();
        assert_eq!(cpu.registers.register_at(1), 5);
        assert_eq!(cpu.registers.register_at(REG_PROGRAM_COUNTER), 0);
    }

    #[test]
    fn failed_condition_is_a_no_op() {
        let mut cpu = Arm7tdmi::new();
        cpu.registers.set_register_at(1, 7);
        let before = cpu.clone();

        // MOVEQS R1, #0 with Z clear
        cpu.execute(0x03B0_1000).unwrap();

        assert_eq!(cpu.registers, before.registers);
        assert_eq!(cpu.cpsr, before.cpsr);
    }

    #[test]
    fn reserved_condition_is_a_fault() {
        let mut cpu = Arm7tdmi::new();
        let before = cpu.clone();

        let result = cpu.execute(0xF3A0_1005);

        assert_eq!(result, Err(CpuError::ReservedCondition { opcode: 0xF3A0_1005 }));
        assert_eq!(cpu.registers, before.registers);
        assert_eq!(cpu.cpsr, before.cpsr);
    }

    #[test]
    fn unmapped_instruction_is_a_fault() {
        let mut cpu = Arm7tdmi::new();

        // B #0
        let result = cpu.execute(0xEA00_0000);

        assert_eq!(
            result,
            Err(CpuError::UnmappedInstruction {
                opcode: 0xEA00_0000,
                index: 0xA00
            })
        );
        assert_eq!(cpu.cpsr.raw(), RESET_CPSR);
    }

    #[test]
    fn tracer_sees_executed_words_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut cpu = Arm7tdmi::new();
        cpu.set_tracer(Box::new(move |opcode| sink.lock().unwrap().push(opcode)));

        // MOV R0, #1 / MOVEQ R0, #2 / MOVNE R0, #3
        for opcode in [0xE3A0_0001, 0x03A0_0002, 0x13A0_0003] {
            cpu.execute(opcode).unwrap();
        }

        assert_eq!(*seen.lock().unwrap(), vec![0xE3A0_0001, 0x13A0_0003]);
        assert_eq!(cpu.registers.register_at(0), 3);

        assert!(cpu.clear_tracer().is_some());
        cpu.execute(0xE3A0_0004).unwrap();
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn state_snapshot_skips_tracer() {
        let mut cpu = Arm7tdmi::new();
        cpu.set_tracer(Box::new(|_| {}));
        let clone = cpu.clone();
        assert!(format!("{cpu:?}").contains("tracer: true"));
        assert!(format!("{clone:?}").contains("tracer: false"));
    }
}
