/// Fatal decode faults raised by [`Arm7tdmi::step`](super::arm7tdmi::Arm7tdmi::step)
/// and [`Arm7tdmi::execute`](super::arm7tdmi::Arm7tdmi::execute).
///
/// Both are raised before any architectural state is touched, so the CPU
/// is left exactly as it was when the offending word was fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuError {
    /// Condition field `0b1111` (NV) has no defined behaviour.
    ReservedCondition { opcode: u32 },

    /// The dispatch table holds no handler for this instruction.
    ///
    /// `index` is the 12-bit dispatch index computed from the opcode.
    UnmappedInstruction { opcode: u32, index: usize },
}

impl std::fmt::Display for CpuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReservedCondition { opcode } => {
                write!(f, "reserved condition code in opcode 0x{opcode:08X}")
            }
            Self::UnmappedInstruction { opcode, index } => {
                write!(
                    f,
                    "no handler for opcode 0x{opcode:08X} (dispatch index 0x{index:03X})"
                )
            }
        }
    }
}

impl std::error::Error for CpuError {}
