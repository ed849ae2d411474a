use crate::{
    config::{
        EmulatorConfig, EnvCallMode,
        arch_config::{REG_NAME, REGFILE_CNT, WordType},
    },
    cpu::RegFile,
    device::MemError,
    isa::riscv::{
        csr_reg::CsrRegFile,
        decoder::{DecodeInstr, Decoder, DecoderTrait},
        instruction::{RVInstrInfo, exec_mapping::get_exec_func, rv32i_table::RiscvInstr},
        trap::{Exception, Trap, trap_controller::TrapController},
    },
    ram::Ram,
    ram_config::DEFAULT_PC_VALUE,
};

/// How a single step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Keep running. Also reported for an `ecall` delivered as a trap.
    Continue,
    /// An `ecall` in [`EnvCallMode::Host`]. pc already points past it.
    HostCall,
    /// The trap was delivered and a debugger should take over.
    Trapped(Exception),
}

pub struct RV32CPU {
    pub(super) reg_file: RegFile,
    pub(super) memory: Ram,
    pub(super) pc: WordType,
    pub(super) decoder: Decoder,
    pub(super) csr: CsrRegFile,
    pub(super) env_call: EnvCallMode,

    /// The trap value pending to be written to `mtval`.
    pub(super) pending_tval: Option<WordType>,
}

impl RV32CPU {
    /// A core over `mem_size` bytes of zeroed memory.
    pub fn new(mem_size: usize) -> Self {
        Self {
            reg_file: RegFile::new(),
            memory: Ram::new(mem_size),
            pc: DEFAULT_PC_VALUE,
            decoder: Decoder::new(),
            csr: CsrRegFile::new(),
            env_call: EnvCallMode::Trap,
            pending_tval: None,
        }
    }

    pub fn from_config(config: &EmulatorConfig) -> Self {
        let mut cpu = Self::new(config.allocated_mem_size());
        cpu.env_call = config.env_call;
        cpu
    }

    pub fn set_env_call_mode(&mut self, mode: EnvCallMode) {
        self.env_call = mode;
    }

    /// Copy a raw image into memory at `offset`.
    pub fn load(&mut self, image: &[u8], offset: WordType) -> Result<(), MemError> {
        self.memory.insert_section(image, offset)
    }

    pub fn mem_size(&self) -> usize {
        self.memory.size()
    }

    pub(in super::super) fn execute(
        &mut self,
        instr: RiscvInstr,
        info: RVInstrInfo,
    ) -> Result<(), Exception> {
        let rst = get_exec_func(instr)(info, self);
        self.reg_file[0] = 0;

        rst
    }

    fn debug_reg_string(&self) -> String {
        let mut s = String::new();
        for i in 0..REGFILE_CNT {
            if self.reg_file[i] == 0 {
                continue;
            }

            s.push_str(&format!("{}: 0x{:x}, ", REG_NAME[i], self.reg_file[i]));
        }
        s
    }

    /// Deliver a trap from outside the instruction stream, e.g. an interrupt.
    pub fn raise(&mut self, cause: Trap, trap_value: WordType) {
        TrapController::send_trap_signal(self, cause, trap_value);
    }

    fn raise_exception(&mut self, exception: Exception, trap_value: WordType) -> StepOutcome {
        TrapController::send_trap_signal(self, Trap::Exception(exception), trap_value);
        self.reg_file[0] = 0;

        match exception {
            Exception::MachineEnvCall => StepOutcome::Continue,
            _ => {
                log::debug!("stopped by {:?}, {}", exception, self.debug_reg_string());
                StepOutcome::Trapped(exception)
            }
        }
    }

    /// Fetch, decode and execute exactly one instruction.
    pub fn step(&mut self) -> StepOutcome {
        // IF
        let raw_instr = match self.memory.fetch(self.pc) {
            Ok(raw_instr) => raw_instr,
            Err(err) => {
                log::warn!("instruction fetch fault at {:#010x}", self.pc);
                return self.raise_exception(Exception::from_memory_err(err), self.pc);
            }
        };

        // ID
        let Some(DecodeInstr(instr, info)) = self.decoder.decode(raw_instr) else {
            log::warn!("Illegal instruction: {:#x} at {:#x}", raw_instr, self.pc);
            return self.raise_exception(Exception::IllegalInstruction, raw_instr);
        };

        log::trace!(
            "{:#010x}: {:?}, info: {:?}",
            self.pc,
            instr,
            info
        );

        // EX && MEM && WB
        match self.execute(instr, info) {
            Ok(()) if instr == RiscvInstr::ECALL => StepOutcome::HostCall,
            Ok(()) => StepOutcome::Continue,
            Err(Exception::IllegalInstruction) => {
                self.raise_exception(Exception::IllegalInstruction, raw_instr)
            }
            Err(exception) => self.raise_exception(exception, 0),
        }
    }
}
