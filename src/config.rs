pub mod ram_config {
    /// Memory handed to the guest when nothing else is requested.
    pub const DEFAULT_SIZE: usize = 1024 * 400;

    /// Extra bytes allocated past the guest-visible size.
    pub const GUARD_SIZE: usize = 8;

    pub const DEFAULT_PC_VALUE: u32 = 0;
}

pub mod stub_config {
    /// Capacity of the inbound and outbound packet buffers.
    /// At least `33 * 4 * 2` is needed for a register packet.
    pub const BUFMAX: usize = 1024;

    /// Signal reported to the debugger on every stop (SIGTRAP).
    pub const STOP_SIGNAL: u8 = 5;

    /// Attention byte (Ctrl-C) that interrupts a running guest.
    pub const INTERRUPT_BYTE: u8 = 0x03;
}

pub mod arch_config {
    pub type WordType = u32;
    pub type SignedWordType = i32;

    pub const XLEN: usize = 32;

    pub const REGFILE_CNT: usize = 32;

    #[rustfmt::skip]
    pub const REG_NAME: [&str; REGFILE_CNT] = [
        "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2",
        "s0/fp", "s1", "a0", "a1", "a2", "a3", "a4", "a5",
        "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7",
        "s8", "s9", "s10", "s11", "t3", "t4", "t5", "t6",
    ];
}

/// What an `ecall` does when it is executed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "native-cli", derive(clap::ValueEnum))]
pub enum EnvCallMode {
    /// Raise a machine environment-call exception.
    #[default]
    Trap,
    /// Hand the call to the attached host bridge and continue after it.
    Host,
}

#[derive(Debug, Clone)]
pub struct EmulatorConfig {
    pub(crate) mem_size: usize,
    pub(crate) load_offset: u32,
    pub(crate) env_call: EnvCallMode,
    pub(crate) break_on_attach: bool,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EmulatorConfig {
    pub fn new() -> Self {
        Self {
            mem_size: ram_config::DEFAULT_SIZE,
            load_offset: 0,
            env_call: EnvCallMode::Trap,
            break_on_attach: true,
        }
    }

    /// Guest-visible memory size, guard bytes excluded.
    pub fn mem_size(mut self, size: usize) -> Self {
        self.mem_size = size;
        self
    }

    pub fn load_offset(mut self, offset: u32) -> Self {
        self.load_offset = offset;
        self
    }

    pub fn env_call(mut self, mode: EnvCallMode) -> Self {
        self.env_call = mode;
        self
    }

    /// Enter a debug session before the first instruction once a channel is attached.
    pub fn break_on_attach(mut self, enable: bool) -> Self {
        self.break_on_attach = enable;
        self
    }

    pub fn guest_mem_size(&self) -> usize {
        self.mem_size
    }

    pub fn allocated_mem_size(&self) -> usize {
        self.mem_size + ram_config::GUARD_SIZE
    }
}
