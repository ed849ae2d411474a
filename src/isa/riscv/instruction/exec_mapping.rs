use crate::{
    config::{EnvCallMode, arch_config::WordType},
    isa::riscv::{
        executor::RV32CPU,
        instruction::{ExecFn, RVInstrInfo, exec_function::*, rv32i_table::RiscvInstr},
        trap::{Exception, trap_controller::TrapController},
    },
    utils::sign_extend,
};

pub(in crate::isa::riscv) fn get_exec_func(instr: RiscvInstr) -> ExecFn {
    match instr {
        //---------------------------------------
        // RV_I
        //---------------------------------------

        // Arith
        RiscvInstr::ADD | RiscvInstr::ADDI => exec_arith::<ExecAdd>,
        RiscvInstr::SUB => exec_arith::<ExecSub>,

        // Shift
        RiscvInstr::SLL | RiscvInstr::SLLI => exec_arith::<ExecSLL>,
        RiscvInstr::SRL | RiscvInstr::SRLI => exec_arith::<ExecSRL>,
        RiscvInstr::SRA | RiscvInstr::SRAI => exec_arith::<ExecSRA>,

        // Cond set
        RiscvInstr::SLT | RiscvInstr::SLTI => exec_arith::<ExecSignedLess>,
        RiscvInstr::SLTU | RiscvInstr::SLTIU => exec_arith::<ExecUnsignedLess>,

        // Bit
        RiscvInstr::AND | RiscvInstr::ANDI => exec_arith::<ExecAnd>,
        RiscvInstr::OR | RiscvInstr::ORI => exec_arith::<ExecOr>,
        RiscvInstr::XOR | RiscvInstr::XORI => exec_arith::<ExecXor>,

        // Branch
        RiscvInstr::BEQ => exec_branch::<ExecEqual>,
        RiscvInstr::BNE => exec_branch::<ExecNotEqual>,
        RiscvInstr::BLT => exec_branch::<ExecSignedLess>,
        RiscvInstr::BGE => exec_branch::<ExecSignedGreatEqual>,
        RiscvInstr::BLTU => exec_branch::<ExecUnsignedLess>,
        RiscvInstr::BGEU => exec_branch::<ExecUnsignedGreatEqual>,

        // Load
        RiscvInstr::LB => exec_load::<u8, true>,
        RiscvInstr::LBU => exec_load::<u8, false>,
        RiscvInstr::LH => exec_load::<u16, true>,
        RiscvInstr::LHU => exec_load::<u16, false>,
        RiscvInstr::LW => exec_load::<u32, false>,

        // Store
        RiscvInstr::SB => exec_store::<u8>,
        RiscvInstr::SH => exec_store::<u16>,
        RiscvInstr::SW => exec_store::<u32>,

        // Jump and link
        RiscvInstr::JAL => |inst_info: RVInstrInfo, cpu: &mut RV32CPU| {
            if let RVInstrInfo::J { rd, imm } = inst_info {
                let target = cpu.pc.wrapping_add(sign_extend(imm, 21));
                cpu.reg_file.write(rd, cpu.pc.wrapping_add(4));
                cpu.pc = target;
            } else {
                std::unreachable!();
            }
            Ok(())
        },

        RiscvInstr::JALR => |inst_info: RVInstrInfo, cpu: &mut RV32CPU| {
            if let RVInstrInfo::I { rs1, rd, imm } = inst_info {
                // rd may alias rs1, so read it before linking.
                let link = cpu.pc.wrapping_add(4);
                let val = cpu.reg_file.read(rs1, 0).0;
                let target: WordType = val.wrapping_add(sign_extend(imm, 12)) & !1;

                cpu.pc = target;
                cpu.reg_file.write(rd, link);
            } else {
                std::unreachable!();
            }
            Ok(())
        },

        RiscvInstr::AUIPC => |inst_info, cpu| {
            if let RVInstrInfo::U { rd, imm } = inst_info {
                cpu.reg_file.write(rd, cpu.pc.wrapping_add(imm));
                cpu.pc = cpu.pc.wrapping_add(4);
                Ok(())
            } else {
                std::unreachable!();
            }
        },

        RiscvInstr::LUI => |inst_info, cpu| {
            if let RVInstrInfo::U { rd, imm } = inst_info {
                cpu.reg_file.write(rd, imm);
                cpu.pc = cpu.pc.wrapping_add(4);
                Ok(())
            } else {
                std::unreachable!();
            }
        },

        //---------------------------------------
        // RV_M
        //---------------------------------------
        RiscvInstr::MUL => exec_arith::<ExecMulLow>,
        RiscvInstr::MULH => exec_arith::<ExecMulHighSigned>,
        RiscvInstr::MULHU => exec_arith::<ExecMulHighUnsigned>,
        RiscvInstr::MULHSU => exec_arith::<ExecMulHighSignedUnsigned>,
        RiscvInstr::DIV => exec_arith::<ExecDivSigned>,
        RiscvInstr::DIVU => exec_arith::<ExecDivUnsigned>,
        RiscvInstr::REM => exec_arith::<ExecRemSigned>,
        RiscvInstr::REMU => exec_arith::<ExecRemUnsigned>,

        //---------------------------------------
        // Zicsr & system
        //---------------------------------------
        RiscvInstr::CSRRW => exec_csrw::<false>,
        RiscvInstr::CSRRC => exec_csr_bit::<false, false>,
        RiscvInstr::CSRRS => exec_csr_bit::<true, false>,
        RiscvInstr::CSRRWI => exec_csrw::<true>,
        RiscvInstr::CSRRCI => exec_csr_bit::<false, true>,
        RiscvInstr::CSRRSI => exec_csr_bit::<true, true>,

        RiscvInstr::EBREAK => |_info, _cpu| Err(Exception::Breakpoint),

        // In host mode the call is serviced outside the core once the step returns.
        RiscvInstr::ECALL => |_info, cpu| match cpu.env_call {
            EnvCallMode::Trap => Err(Exception::MachineEnvCall),
            EnvCallMode::Host => {
                cpu.pc = cpu.pc.wrapping_add(4);
                Ok(())
            }
        },

        RiscvInstr::MRET => |_info, cpu| {
            TrapController::mret(cpu);
            Ok(())
        },

        // Nothing ever becomes pending asynchronously.
        RiscvInstr::WFI => exec_nop,
    }
}
