#![cfg(test)]
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

use crate::{
    config::arch_config::{REGFILE_CNT, WordType},
    isa::{
        DebugTarget,
        riscv::{
            csr_reg::csr_index,
            decoder::{DecodeInstr, DecoderTrait},
            executor::{RV32CPU, StepOutcome},
            instruction::{RVInstrInfo, rv32i_table::RiscvInstr},
        },
    },
    utils::{UnsignedInteger, sign_extend},
};

pub(super) const TEST_MEM_SIZE: usize = 0x4000;

/// Address the randomized single-instruction tests execute from.
const EXEC_PC: WordType = 0x1000;

pub(super) struct TestCPUBuilder {
    cpu: RV32CPU,
}

impl TestCPUBuilder {
    pub(super) fn new() -> Self {
        Self {
            cpu: RV32CPU::new(TEST_MEM_SIZE),
        }
    }

    pub(super) fn reg(mut self, idx: u8, value: WordType) -> Self {
        self.cpu.write_reg(idx, value);
        self
    }

    pub(super) fn pc(mut self, value: WordType) -> Self {
        self.cpu.write_pc(value);
        self
    }

    pub(super) fn mem<T: UnsignedInteger>(mut self, addr: WordType, value: T) -> Self {
        if let Err(err) = self.cpu.write_mem(addr, value) {
            panic!("test setup wrote outside memory: {}", err);
        }
        self
    }

    /// Place `instrs` from address 0, where execution starts.
    pub(super) fn program(self, instrs: &[u32]) -> Self {
        instrs
            .iter()
            .zip((0..).step_by(4))
            .fold(self, |builder, (&instr, addr)| builder.mem(addr, instr))
    }

    /// Architectural write, so the CSR's write mask applies.
    pub(super) fn csr(mut self, csr_addr: WordType, value: WordType) -> Self {
        if let Err(err) = self.cpu.csr.write(csr_addr, value) {
            panic!("test setup: {}", err);
        }
        self
    }

    pub(super) fn build(self) -> RV32CPU {
        self.cpu
    }
}

pub(super) struct CPUChecker<'a> {
    pub(super) cpu: &'a mut RV32CPU,
}

impl<'a> CPUChecker<'a> {
    pub(super) fn new(cpu: &'a mut RV32CPU) -> Self {
        Self { cpu }.reg(0, 0)
    }

    pub(super) fn reg(self, idx: u8, value: WordType) -> Self {
        assert_eq!(
            self.cpu.read_reg(idx),
            value,
            "x{} holds {:#x}, expected {:#x}",
            idx,
            self.cpu.read_reg(idx),
            value,
        );
        self
    }

    pub(super) fn pc(self, value: WordType) -> Self {
        assert_eq!(self.cpu.read_pc(), value, "pc incorrect");
        self
    }

    pub(super) fn mem<T>(self, addr: WordType, value: WordType) -> Self
    where
        T: UnsignedInteger,
    {
        let actual: WordType = match self.cpu.read_mem::<T>(addr) {
            Ok(data) => data.into(),
            Err(err) => panic!("checking memory: {}", err),
        };
        assert_eq!(actual, value, "memory at {:#x} incorrect", addr);
        self
    }

    pub(super) fn csr(self, addr: WordType, value: WordType) -> Self {
        assert_eq!(
            self.cpu.read_csr(addr),
            Some(value),
            "CSR {:#x} incorrect",
            addr
        );
        self
    }

    /// The machine trap registers after a delivered trap.
    pub(super) fn trap(self, cause: WordType, epc: WordType, tval: WordType) -> Self {
        self.csr(csr_index::mcause, cause)
            .csr(csr_index::mepc, epc)
            .csr(csr_index::mtval, tval)
    }

    pub(super) fn customized<F>(self, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        f(self)
    }
}

pub(super) fn run_test_exec<F, G>(instr: RiscvInstr, info: RVInstrInfo, build: F, check: G)
where
    F: FnOnce(TestCPUBuilder) -> TestCPUBuilder,
    G: FnOnce(CPUChecker) -> CPUChecker,
{
    let mut cpu = build(TestCPUBuilder::new()).build();
    if let Err(exception) = cpu.execute(instr, info) {
        panic!("{:?} raised {:?}", instr, exception);
    }
    check(CPUChecker::new(&mut cpu));
}

pub(super) fn run_test_exec_decode<F, G>(raw_instr: u32, build: F, check: G)
where
    F: FnOnce(TestCPUBuilder) -> TestCPUBuilder,
    G: FnOnce(CPUChecker) -> CPUChecker,
{
    let cpu = build(TestCPUBuilder::new()).build();
    let Some(DecodeInstr(instr, info)) = cpu.decoder.decode(raw_instr) else {
        panic!("{:#010x} does not decode", raw_instr);
    };
    run_test_exec(instr, info, |_| TestCPUBuilder { cpu }, check);
}

/// Load `raw_instrs` at address 0 and step once per instruction.
pub(super) fn run_test_cpu_step<F, G>(raw_instrs: &[u32], build: F, check: G)
where
    F: FnOnce(TestCPUBuilder) -> TestCPUBuilder,
    G: FnOnce(CPUChecker) -> CPUChecker,
{
    let mut cpu = build(TestCPUBuilder::new().program(raw_instrs)).build();
    for _ in raw_instrs {
        assert_eq!(cpu.step(), StepOutcome::Continue, "pc {:#x}", cpu.read_pc());
    }
    check(CPUChecker::new(&mut cpu));
}

/// Randomized single-instruction checks. The seed is fixed, so failures reproduce.
pub(super) struct ExecTester {
    rng: ChaCha12Rng,
}

impl ExecTester {
    pub(super) fn new() -> Self {
        Self {
            rng: ChaCha12Rng::seed_from_u64(0721),
        }
    }

    fn word(&mut self) -> WordType {
        self.rng.random()
    }

    /// Any register but x0.
    fn reg_idx(&mut self) -> u8 {
        self.rng.random_range(1..REGFILE_CNT as u8)
    }

    fn distinct_reg_idx2(&mut self) -> (u8, u8) {
        let first = self.reg_idx();
        loop {
            let second = self.reg_idx();
            if second != first {
                return (first, second);
            }
        }
    }

    /// Run an R-type instruction on random registers holding `lhs` and `rhs`.
    pub(super) fn check_r(&mut self, instr: RiscvInstr, lhs: WordType, rhs: WordType, expected: WordType) {
        let rd = self.reg_idx();
        let (rs1, rs2) = self.distinct_reg_idx2();

        run_test_exec(
            instr,
            RVInstrInfo::R { rd, rs1, rs2 },
            |builder| builder.reg(rs1, lhs).reg(rs2, rhs).pc(EXEC_PC),
            |checker| checker.reg(rd, expected).pc(EXEC_PC + 4),
        );
    }

    pub(super) fn rand_r<F>(&mut self, instr: RiscvInstr, calc: F)
    where
        F: FnOnce(WordType, WordType) -> WordType,
    {
        let (lhs, rhs) = (self.word(), self.word());
        self.check_r(instr, lhs, rhs, calc(lhs, rhs));
    }

    /// `calc` receives the immediate already sign extended.
    pub(super) fn rand_i<F>(&mut self, instr: RiscvInstr, calc: F)
    where
        F: FnOnce(WordType, WordType) -> WordType,
    {
        let lhs = self.word();
        let imm = self.word() & 0xFFF;
        let (rd, rs1) = (self.reg_idx(), self.reg_idx());
        let expected = calc(lhs, sign_extend(imm, 12));

        run_test_exec(
            instr,
            RVInstrInfo::I { rd, rs1, imm },
            |builder| builder.reg(rs1, lhs).pc(EXEC_PC),
            |checker| checker.reg(rd, expected).pc(EXEC_PC + 4),
        );
    }
}
