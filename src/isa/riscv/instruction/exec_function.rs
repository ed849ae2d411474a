use crate::{
    config::arch_config::{SignedWordType, WordType},
    device::Mem,
    isa::riscv::{executor::RV32CPU, instruction::RVInstrInfo, trap::Exception},
    utils::{UnsignedInteger, sign_extend, wrapping_add_as_signed},
};

/// ExecTrait will generate operation result to `exec_xxx` function.
/// ExecTrait::exec only do calculate.
/// `exec_xxx` function interact with other mod in CPU.
pub(super) trait ExecTrait<T> {
    fn exec(a: WordType, b: WordType) -> T;
}

/// Process arithmetic instructions with `rs1`, (`rs2` or `imm`) and `rd`.
///
/// This will always do signed extension to `imm` as 12 bit.
pub(super) fn exec_arith<F>(info: RVInstrInfo, cpu: &mut RV32CPU) -> Result<(), Exception>
where
    F: ExecTrait<WordType>,
{
    let (rd, rst) = match info {
        RVInstrInfo::R { rs1, rs2, rd } => {
            let (val1, val2) = cpu.reg_file.read(rs1, rs2);
            (rd, F::exec(val1, val2))
        }
        RVInstrInfo::I { rs1, rd, imm } => {
            let val1 = cpu.reg_file.read(rs1, 0).0;
            let simm = sign_extend(imm, 12);
            (rd, F::exec(val1, simm))
        }
        _ => std::unreachable!(),
    };

    cpu.reg_file.write(rd, rst);
    cpu.pc = cpu.pc.wrapping_add(4);

    Ok(())
}

pub(super) fn exec_branch<F>(info: RVInstrInfo, cpu: &mut RV32CPU) -> Result<(), Exception>
where
    F: ExecTrait<bool>,
{
    if let RVInstrInfo::B { rs1, rs2, imm } = info {
        let (val1, val2) = cpu.reg_file.read(rs1, rs2);

        if F::exec(val1, val2) {
            cpu.pc = cpu.pc.wrapping_add(sign_extend(imm, 13));
        } else {
            cpu.pc = cpu.pc.wrapping_add(4);
        }
    } else {
        std::unreachable!();
    }

    Ok(())
}

pub(super) fn exec_load<T, const EXTEND: bool>(
    info: RVInstrInfo,
    cpu: &mut RV32CPU,
) -> Result<(), Exception>
where
    T: UnsignedInteger,
{
    if let RVInstrInfo::I { rs1, rd, imm } = info {
        let val = cpu.reg_file.read(rs1, 0).0;
        let addr = wrapping_add_as_signed(val, sign_extend(imm, 12));

        match cpu.memory.read::<T>(addr) {
            Ok(data) => {
                let mut data: WordType = data.into();
                if EXTEND {
                    data = sign_extend(data, (T::BYTES as u32) * 8);
                }
                cpu.reg_file.write(rd, data);
            }
            Err(err) => {
                cpu.pending_tval = Some(addr);
                return Err(Exception::from_memory_err(err));
            }
        }
    } else {
        std::unreachable!();
    }

    cpu.pc = cpu.pc.wrapping_add(4);
    Ok(())
}

pub(super) fn exec_store<T>(info: RVInstrInfo, cpu: &mut RV32CPU) -> Result<(), Exception>
where
    T: UnsignedInteger,
{
    if let RVInstrInfo::S { rs1, rs2, imm } = info {
        let (val1, val2) = cpu.reg_file.read(rs1, rs2);
        let addr = wrapping_add_as_signed(val1, sign_extend(imm, 12));

        if let Err(err) = cpu.memory.write(addr, T::truncate_from(val2)) {
            cpu.pending_tval = Some(addr);
            return Err(Exception::from_memory_err(err));
        }
    } else {
        std::unreachable!();
    }

    cpu.pc = cpu.pc.wrapping_add(4);
    Ok(())
}

/// CSRRW / CSRRWI. The CSR is always written, so the read always announces a write.
pub(super) fn exec_csrw<const UIMM: bool>(
    info: RVInstrInfo,
    cpu: &mut RV32CPU,
) -> Result<(), Exception> {
    if let RVInstrInfo::I { rs1, rd, imm } = info {
        let new_val = if UIMM {
            rs1 as WordType
        } else {
            cpu.reg_file.read(rs1, 0).0
        };

        let old = cpu.csr.read(imm, true).map_err(csr_fault)?;
        cpu.csr.write(imm, new_val).map_err(csr_fault)?;
        cpu.reg_file.write(rd, old);
    } else {
        std::unreachable!();
    }

    cpu.pc = cpu.pc.wrapping_add(4);

    Ok(())
}

/// CSRRS / CSRRC and their immediate forms. A zero `rs1` field makes them read-only.
pub(super) fn exec_csr_bit<const SET: bool, const UIMM: bool>(
    info: RVInstrInfo,
    cpu: &mut RV32CPU,
) -> Result<(), Exception> {
    if let RVInstrInfo::I { rs1, rd, imm } = info {
        let rhs = if UIMM {
            rs1 as WordType
        } else {
            cpu.reg_file.read(rs1, 0).0
        };
        let will_write = rs1 != 0;

        let old = cpu.csr.read(imm, will_write).map_err(csr_fault)?;
        if will_write {
            let data = if SET { old | rhs } else { old & !rhs };
            cpu.csr.write(imm, data).map_err(csr_fault)?;
        }
        cpu.reg_file.write(rd, old);
    } else {
        std::unreachable!();
    }

    cpu.pc = cpu.pc.wrapping_add(4);

    Ok(())
}

fn csr_fault(err: crate::isa::riscv::csr_reg::CsrError) -> Exception {
    log::warn!("csr access rejected: {}", err);
    Exception::IllegalInstruction
}

pub(super) fn exec_nop(_info: RVInstrInfo, cpu: &mut RV32CPU) -> Result<(), Exception> {
    cpu.pc = cpu.pc.wrapping_add(4);
    Ok(())
}

// =============================================
//                  ExecTrait
// =============================================
// Arith
pub(super) struct ExecAdd {}
impl ExecTrait<WordType> for ExecAdd {
    fn exec(a: WordType, b: WordType) -> WordType {
        a.wrapping_add(b)
    }
}

pub(super) struct ExecSub {}
impl ExecTrait<WordType> for ExecSub {
    fn exec(a: WordType, b: WordType) -> WordType {
        a.wrapping_sub(b)
    }
}

pub(super) struct ExecMulLow {}
impl ExecTrait<WordType> for ExecMulLow {
    fn exec(a: WordType, b: WordType) -> WordType {
        a.wrapping_mul(b)
    }
}

pub(super) struct ExecMulHighUnsigned {}
impl ExecTrait<WordType> for ExecMulHighUnsigned {
    fn exec(a: WordType, b: WordType) -> WordType {
        ((a as u64 * b as u64) >> 32) as WordType
    }
}

pub(super) struct ExecMulHighSigned {}
impl ExecTrait<WordType> for ExecMulHighSigned {
    fn exec(a: WordType, b: WordType) -> WordType {
        let a = a as SignedWordType as i64;
        let b = b as SignedWordType as i64;

        (a.wrapping_mul(b) >> 32) as WordType
    }
}

pub(super) struct ExecMulHighSignedUnsigned {}
impl ExecTrait<WordType> for ExecMulHighSignedUnsigned {
    fn exec(a: WordType, b: WordType) -> WordType {
        let a = a as SignedWordType as i64;
        let b = b as i64;

        (a.wrapping_mul(b) >> 32) as WordType
    }
}

pub(super) struct ExecDivSigned {}
impl ExecTrait<WordType> for ExecDivSigned {
    fn exec(a: WordType, b: WordType) -> WordType {
        if b == 0 {
            return WordType::MAX;
        }
        // INT_MIN / -1 wraps back to INT_MIN.
        a.cast_signed().wrapping_div(b.cast_signed()) as WordType
    }
}

pub(super) struct ExecDivUnsigned {}
impl ExecTrait<WordType> for ExecDivUnsigned {
    fn exec(a: WordType, b: WordType) -> WordType {
        if b == 0 {
            return WordType::MAX;
        }
        a / b
    }
}

pub(super) struct ExecRemSigned {}
impl ExecTrait<WordType> for ExecRemSigned {
    fn exec(a: WordType, b: WordType) -> WordType {
        if b == 0 {
            return a;
        }
        a.cast_signed().wrapping_rem(b.cast_signed()) as WordType
    }
}

pub(super) struct ExecRemUnsigned {}
impl ExecTrait<WordType> for ExecRemUnsigned {
    fn exec(a: WordType, b: WordType) -> WordType {
        if b == 0 {
            return a;
        }
        a % b
    }
}

// Shift
pub(super) struct ExecSLL {}
impl ExecTrait<WordType> for ExecSLL {
    fn exec(a: WordType, b: WordType) -> WordType {
        a << (b & 0x1F)
    }
}

pub(super) struct ExecSRL {}
impl ExecTrait<WordType> for ExecSRL {
    fn exec(a: WordType, b: WordType) -> WordType {
        a >> (b & 0x1F)
    }
}

pub(super) struct ExecSRA {}
impl ExecTrait<WordType> for ExecSRA {
    fn exec(a: WordType, b: WordType) -> WordType {
        (a.cast_signed() >> (b & 0x1F)) as WordType
    }
}

// Bit
pub(super) struct ExecAnd {}
impl ExecTrait<WordType> for ExecAnd {
    fn exec(a: WordType, b: WordType) -> WordType {
        a & b
    }
}

pub(super) struct ExecOr {}
impl ExecTrait<WordType> for ExecOr {
    fn exec(a: WordType, b: WordType) -> WordType {
        a | b
    }
}

pub(super) struct ExecXor {}
impl ExecTrait<WordType> for ExecXor {
    fn exec(a: WordType, b: WordType) -> WordType {
        a ^ b
    }
}

// Compare. Usable as a branch condition or, through the `WordType` impls, as SLT/SLTU.
pub(super) struct ExecSignedLess {}
impl ExecTrait<bool> for ExecSignedLess {
    fn exec(a: WordType, b: WordType) -> bool {
        a.cast_signed() < b.cast_signed()
    }
}
impl ExecTrait<WordType> for ExecSignedLess {
    fn exec(a: WordType, b: WordType) -> WordType {
        <Self as ExecTrait<bool>>::exec(a, b) as WordType
    }
}

pub(super) struct ExecUnsignedLess {}
impl ExecTrait<bool> for ExecUnsignedLess {
    fn exec(a: WordType, b: WordType) -> bool {
        a < b
    }
}
impl ExecTrait<WordType> for ExecUnsignedLess {
    fn exec(a: WordType, b: WordType) -> WordType {
        <Self as ExecTrait<bool>>::exec(a, b) as WordType
    }
}

pub(super) struct ExecSignedGreatEqual {}
impl ExecTrait<bool> for ExecSignedGreatEqual {
    fn exec(a: WordType, b: WordType) -> bool {
        a.cast_signed() >= b.cast_signed()
    }
}

pub(super) struct ExecUnsignedGreatEqual {}
impl ExecTrait<bool> for ExecUnsignedGreatEqual {
    fn exec(a: WordType, b: WordType) -> bool {
        a >= b
    }
}

pub(super) struct ExecEqual {}
impl ExecTrait<bool> for ExecEqual {
    fn exec(a: WordType, b: WordType) -> bool {
        a == b
    }
}

pub(super) struct ExecNotEqual {}
impl ExecTrait<bool> for ExecNotEqual {
    fn exec(a: WordType, b: WordType) -> bool {
        a != b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INT_MIN: WordType = 0x8000_0000;
    const NEG_ONE: WordType = WordType::MAX;

    #[test]
    fn test_division_edge_cases() {
        assert_eq!(ExecDivSigned::exec(7, 0), NEG_ONE);
        assert_eq!(ExecDivUnsigned::exec(7, 0), 0xFFFF_FFFF);
        assert_eq!(ExecDivSigned::exec(INT_MIN, NEG_ONE), INT_MIN);
        assert_eq!(ExecRemSigned::exec(7, 0), 7);
        assert_eq!(ExecRemUnsigned::exec(7, 0), 7);
        assert_eq!(ExecRemSigned::exec(INT_MIN, NEG_ONE), 0);

        assert_eq!(ExecDivSigned::exec((-7i32) as WordType, 2), (-3i32) as WordType);
        assert_eq!(ExecRemSigned::exec((-7i32) as WordType, 2), NEG_ONE);
    }

    #[test]
    fn test_mul_high() {
        assert_eq!(ExecMulHighUnsigned::exec(NEG_ONE, NEG_ONE), 0xFFFF_FFFE);
        assert_eq!(ExecMulHighSigned::exec(NEG_ONE, NEG_ONE), 0);
        assert_eq!(ExecMulHighSignedUnsigned::exec(NEG_ONE, NEG_ONE), NEG_ONE);
        assert_eq!(ExecMulHighSigned::exec(INT_MIN, INT_MIN), 0x4000_0000);
        assert_eq!(ExecMulHighSignedUnsigned::exec(INT_MIN, 2), NEG_ONE);
        assert_eq!(ExecMulLow::exec(0x1234_5678, 0x10), 0x2345_6780);
    }

    #[test]
    fn test_shift_uses_low_five_bits() {
        assert_eq!(ExecSLL::exec(1, 33), 2);
        assert_eq!(ExecSRL::exec(INT_MIN, 0x21), 0x4000_0000);
        assert_eq!(ExecSRA::exec(INT_MIN, 0x21), 0xC000_0000);
    }

    #[test]
    fn test_compare() {
        assert!(<ExecSignedLess as ExecTrait<bool>>::exec(NEG_ONE, 0));
        assert!(!<ExecUnsignedLess as ExecTrait<bool>>::exec(NEG_ONE, 0));
        assert!(ExecSignedGreatEqual::exec(0, NEG_ONE));
        assert!(!ExecUnsignedGreatEqual::exec(0, NEG_ONE));
        assert_eq!(<ExecSignedLess as ExecTrait<WordType>>::exec(NEG_ONE, 0), 1);
    }
}
