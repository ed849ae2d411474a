use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{
    config::arch_config::{WordType, XLEN},
    device::{AccessKind, MemError},
};

pub mod trap_controller;

/// Trap Cause
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Trap {
    Interrupt(Interrupt),
    Exception(Exception),
}

/// Interrupt
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
pub enum Interrupt {
    UserSoft = 0,
    SupervisorSoft = 1,
    MachineSoft = 3,
    UserTimer = 4,
    SupervisorTimer = 5,
    MachineTimer = 7,
    UserExternal = 8,
    SupervisorExternal = 9,
    MachineExternal = 11,
}

/// Exception
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
pub enum Exception {
    InstructionMisaligned = 0,
    InstructionFault = 1,
    IllegalInstruction = 2,
    Breakpoint = 3,
    LoadMisaligned = 4,
    LoadFault = 5,
    StoreMisaligned = 6,
    StoreFault = 7,
    UserEnvCall = 8,
    SupervisorEnvCall = 9,
    MachineEnvCall = 11,
    InstructionPageFault = 12,
    LoadPageFault = 13,
    StorePageFault = 15,
}

impl Exception {
    /// Memory is flat, so a failed fetch is reported as an instruction page fault.
    pub fn from_memory_err(err: MemError) -> Self {
        match err.access {
            AccessKind::Fetch => Exception::InstructionPageFault,
            AccessKind::Load => Exception::LoadFault,
            AccessKind::Store => Exception::StoreFault,
        }
    }
}

impl From<Trap> for WordType {
    fn from(trap: Trap) -> WordType {
        match trap {
            Trap::Interrupt(nr) => {
                let nr: WordType = nr.into();
                nr | (1 << (XLEN - 1))
            }
            Trap::Exception(nr) => nr.into(),
        }
    }
}
