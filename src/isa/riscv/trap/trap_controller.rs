use crate::{
    config::arch_config::WordType,
    isa::riscv::{
        csr_reg::{Mstatus, csr_index},
        executor::RV32CPU,
        trap::Trap,
    },
};

/// Machine-mode trap entry and return. Only M-mode exists, so every trap lands here.
pub(in crate::isa::riscv) struct TrapController {}

impl TrapController {
    /// Deliver `cause`. Traps do not nest: the previous `mepc`/`mcause`/`mtval` are lost.
    pub fn send_trap_signal(cpu: &mut RV32CPU, cause: Trap, trap_value: WordType) {
        let tval = cpu.pending_tval.take().unwrap_or(trap_value);
        let code: WordType = cause.into();

        log::debug!(
            "trap {:?} at pc {:#010x}, tval {:#010x}",
            cause,
            cpu.pc,
            tval
        );

        let written = cpu
            .csr
            .write_directly(csr_index::mcause, code)
            .and_then(|_| cpu.csr.write_directly(csr_index::mepc, cpu.pc))
            .and_then(|_| cpu.csr.write_directly(csr_index::mtval, tval));
        debug_assert!(written.is_some(), "machine trap CSRs are always present");

        let mut mstatus = cpu.csr.mstatus();
        mstatus.remove(Mstatus::MIE);
        cpu.csr.set_mstatus(mstatus);

        cpu.pc = cpu.csr.read_directly(csr_index::mtvec).unwrap_or(0);
    }

    /// Restore the interrupt-enable bit of the privilege level held in `MPP` from `MPIE`.
    /// `MPP = 0` selects `UIE`, `MPP = 3` selects `MIE`.
    pub fn mret(cpu: &mut RV32CPU) {
        let mut mstatus = cpu.csr.mstatus();
        let mpp = (mstatus.bits() & Mstatus::MPP.bits()) >> Mstatus::MPP.bits().trailing_zeros();
        let enable = Mstatus::from_bits_retain(1 << mpp);
        mstatus.set(enable, mstatus.contains(Mstatus::MPIE));
        mstatus.insert(Mstatus::MPIE);
        mstatus.remove(Mstatus::MPP);
        cpu.csr.set_mstatus(mstatus);

        cpu.pc = cpu.csr.read_directly(csr_index::mepc).unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::riscv::trap::{Exception, Interrupt};

    #[test]
    fn test_send_trap_signal() {
        let mut cpu = RV32CPU::new(64);
        cpu.pc = 0x20;
        cpu.csr.write(csr_index::mtvec, 0x100).unwrap();
        cpu.csr.set_mstatus(Mstatus::MIE);

        TrapController::send_trap_signal(
            &mut cpu,
            Trap::Exception(Exception::LoadFault),
            0xdead,
        );

        assert_eq!(cpu.pc, 0x100);
        assert_eq!(cpu.csr.read_directly(csr_index::mcause), Some(5));
        assert_eq!(cpu.csr.read_directly(csr_index::mepc), Some(0x20));
        assert_eq!(cpu.csr.read_directly(csr_index::mtval), Some(0xdead));
        assert!(!cpu.csr.mstatus().contains(Mstatus::MIE));
    }

    #[test]
    fn test_pending_tval_wins() {
        let mut cpu = RV32CPU::new(64);
        cpu.pending_tval = Some(0x44);
        TrapController::send_trap_signal(&mut cpu, Trap::Exception(Exception::StoreFault), 0);
        assert_eq!(cpu.csr.read_directly(csr_index::mtval), Some(0x44));
        assert_eq!(cpu.pending_tval, None);
    }

    #[test]
    fn test_interrupt_cause() {
        let mut cpu = RV32CPU::new(64);
        TrapController::send_trap_signal(&mut cpu, Trap::Interrupt(Interrupt::MachineSoft), 0);
        assert_eq!(cpu.csr.read_directly(csr_index::mcause), Some(0x8000_0003));
    }

    #[test]
    fn test_mret_from_machine() {
        let mut cpu = RV32CPU::new(64);
        cpu.csr.write(csr_index::mepc, 0x44).unwrap();
        cpu.csr.set_mstatus(Mstatus::MPIE | Mstatus::MPP);

        TrapController::mret(&mut cpu);

        let mstatus = cpu.csr.mstatus();
        assert_eq!(cpu.pc, 0x44);
        assert!(mstatus.contains(Mstatus::MIE | Mstatus::MPIE));
        assert!(!mstatus.intersects(Mstatus::MPP | Mstatus::UIE));
    }

    #[test]
    fn test_mret_restores_bit_selected_by_mpp() {
        let mut cpu = RV32CPU::new(64);
        cpu.csr.write(csr_index::mepc, 0x10).unwrap();
        cpu.csr.set_mstatus(Mstatus::MPIE);

        TrapController::mret(&mut cpu);

        let mstatus = cpu.csr.mstatus();
        assert_eq!(cpu.pc, 0x10);
        assert_eq!(mstatus, Mstatus::UIE | Mstatus::MPIE);
        assert!(!mstatus.contains(Mstatus::MIE));
    }

    #[test]
    fn test_mret_clears_selected_bit_when_mpie_clear() {
        let mut cpu = RV32CPU::new(64);
        cpu.csr.set_mstatus(Mstatus::MIE | Mstatus::UIE);

        TrapController::mret(&mut cpu);

        assert_eq!(cpu.csr.mstatus(), Mstatus::MIE | Mstatus::MPIE);
    }
}
