pub mod arm;

#[allow(clippy::module_name_repetitions)]
pub mod arm7tdmi;
#[allow(clippy::cast_possible_truncation)]
pub mod condition;
pub mod cpu_modes;
pub mod error;
pub mod flags;
pub mod psr;
pub mod register_bank;
pub mod registers;
