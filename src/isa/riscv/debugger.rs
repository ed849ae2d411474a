use crate::{
    config::arch_config::WordType,
    device::{Mem, MemError},
    isa::{DebugTarget, riscv::executor::RV32CPU},
    utils::UnsignedInteger,
};

impl DebugTarget for RV32CPU {
    fn read_pc(&self) -> WordType {
        self.pc
    }

    fn write_pc(&mut self, new_pc: WordType) {
        self.pc = new_pc;
    }

    fn read_reg(&self, idx: u8) -> WordType {
        self.reg_file[idx as usize]
    }

    fn write_reg(&mut self, idx: u8, value: WordType) {
        self.reg_file.write(idx, value)
    }

    fn read_mem<T: UnsignedInteger>(&self, addr: WordType) -> Result<T, MemError> {
        self.memory.read::<T>(addr)
    }

    fn write_mem<T: UnsignedInteger>(&mut self, addr: WordType, data: T) -> Result<(), MemError> {
        self.memory.write::<T>(addr, data)
    }

    fn view(&self, base: WordType, len: usize) -> Result<&[u8], MemError> {
        self.memory.view(base, len)
    }

    fn view_mut(&mut self, base: WordType, len: usize) -> Result<&mut [u8], MemError> {
        self.memory.view_mut(base, len)
    }

    fn read_csr(&self, addr: WordType) -> Option<WordType> {
        self.csr.read_directly(addr)
    }
}
