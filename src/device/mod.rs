use crate::{config::arch_config::WordType, utils::UnsignedInteger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Fetch,
    Load,
    Store,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{access:?} fault at {addr:#010x}")]
pub struct MemError {
    pub addr: WordType,
    pub access: AccessKind,
}

impl MemError {
    pub fn new(addr: WordType, access: AccessKind) -> Self {
        Self { addr, access }
    }
}

pub trait Mem {
    fn read<T>(&self, addr: WordType) -> Result<T, MemError>
    where
        T: UnsignedInteger;

    fn write<T>(&mut self, addr: WordType, data: T) -> Result<(), MemError>
    where
        T: UnsignedInteger;
}
