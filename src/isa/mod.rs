use crate::{config::arch_config::WordType, device::MemError, utils::UnsignedInteger};

pub mod riscv;

mod utils;

/// Machine state as a debugger or a host bridge sees it.
pub trait DebugTarget {
    fn read_pc(&self) -> WordType;
    fn write_pc(&mut self, new_pc: WordType);

    fn read_reg(&self, idx: u8) -> WordType;
    /// Writes to x0 are dropped.
    fn write_reg(&mut self, idx: u8, value: WordType);

    fn read_mem<T: UnsignedInteger>(&self, addr: WordType) -> Result<T, MemError>;
    fn write_mem<T: UnsignedInteger>(&mut self, addr: WordType, data: T) -> Result<(), MemError>;

    /// Borrow `[base, base + len)`, failing unless the whole range is inside memory.
    fn view(&self, base: WordType, len: usize) -> Result<&[u8], MemError>;
    fn view_mut(&mut self, base: WordType, len: usize) -> Result<&mut [u8], MemError>;

    /// Side-effect free CSR read, `None` for CSRs that do not exist.
    fn read_csr(&self, addr: WordType) -> Option<WordType>;
}
