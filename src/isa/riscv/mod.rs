mod cpu_tester;
pub mod csr_reg;
pub mod debugger;
pub mod decoder;
pub mod executor;
pub mod instruction;
pub mod trap;

/// `ebreak`
pub const EBREAK: u32 = 0x00100073;
