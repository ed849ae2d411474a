use std::collections::HashMap;

use bitflags::bitflags;
use phf::phf_map;

use crate::config::arch_config::WordType;

#[rustfmt::skip]
#[allow(non_upper_case_globals, unused)]
pub mod csr_index {
    use crate::config::arch_config::WordType;
    pub const mstatus   : WordType  = 0x300;    // interrupt enables and previous privilege
    pub const mie       : WordType  = 0x304;    // machine interrupt enable
    pub const mtvec     : WordType  = 0x305;    // trap vector base
    pub const mscratch  : WordType  = 0x340;    // scratch for trap handlers
    pub const mepc      : WordType  = 0x341;    // trap return address
    pub const mcause    : WordType  = 0x342;    // trap cause
    pub const mtval     : WordType  = 0x343;    // faulting address or instruction
    pub const mip       : WordType  = 0x344;    // machine interrupt pending
}

/// CSR names, only used to make logs readable.
pub const CSR_NAME: phf::Map<WordType, &'static str> = phf_map! {
    0x300u32 => "mstatus",
    0x304u32 => "mie",
    0x305u32 => "mtvec",
    0x340u32 => "mscratch",
    0x341u32 => "mepc",
    0x342u32 => "mcause",
    0x343u32 => "mtval",
    0x344u32 => "mip",
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Mstatus: WordType {
        const UIE  = 1 << 0;
        const SIE  = 1 << 1;
        const MIE  = 1 << 3;
        const UPIE = 1 << 4;
        const SPIE = 1 << 5;
        const MPIE = 1 << 7;
        const SPP  = 1 << 8;
        const MPP  = 0b11 << 11;
        const FS   = 0b11 << 13;
        const MPRV = 1 << 17;
        const SUM  = 1 << 18;
        const MXR  = 1 << 19;
    }
}

bitflags! {
    /// Bit layout shared by `mie` and `mip`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Mip: WordType {
        const USIP = 1 << 0;
        const SSIP = 1 << 1;
        const MSIP = 1 << 3;
        const UTIP = 1 << 4;
        const STIP = 1 << 5;
        const MTIP = 1 << 7;
        const SEIP = 1 << 9;
        const MEIP = 1 << 11;
    }
}

const MSTATUS_WRITE_MASK: WordType = Mstatus::UIE.bits()
    | Mstatus::SIE.bits()
    | Mstatus::MIE.bits()
    | Mstatus::UPIE.bits()
    | Mstatus::SPIE.bits()
    | Mstatus::MPIE.bits()
    | Mstatus::SPP.bits()
    | Mstatus::MPP.bits()
    | Mstatus::MPRV.bits()
    | Mstatus::SUM.bits()
    | Mstatus::MXR.bits();

const MIE_WRITE_MASK: WordType = Mip::MSIP.bits()
    | Mip::MTIP.bits()
    | Mip::SSIP.bits()
    | Mip::STIP.bits()
    | Mip::SEIP.bits();

const MIP_WRITE_MASK: WordType = Mip::SSIP.bits() | Mip::STIP.bits();

/// (address, reset value, write mask)
#[rustfmt::skip]
const CSR_REG_TABLE: &[(WordType, WordType, WordType)] = &[
    (csr_index::mstatus,  0, MSTATUS_WRITE_MASK),
    (csr_index::mie,      0, MIE_WRITE_MASK),
    (csr_index::mtvec,    0, !0b11),
    (csr_index::mscratch, 0, !0),
    (csr_index::mepc,     0, !0b1),
    (csr_index::mcause,   0, !0),
    (csr_index::mtval,    0, !0),
    (csr_index::mip,      0, MIP_WRITE_MASK),
];

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrError {
    #[error("csr {0:#05x} does not exist")]
    Unknown(WordType),
    #[error("csr {0:#05x} is read-only")]
    ReadOnly(WordType),
}

/// Write `value` to the bits specified by `mask`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CsrWriteOp {
    mask: WordType,
}

impl CsrWriteOp {
    #[inline]
    fn new(mask: WordType) -> CsrWriteOp {
        CsrWriteOp { mask }
    }

    #[inline]
    fn apply(&self, target: &mut WordType, value: WordType) {
        *target = self.get_new_value(*target, value);
    }

    #[inline]
    fn get_new_value(&self, old_value: WordType, value: WordType) -> WordType {
        (old_value & !self.mask) | (value & self.mask)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct CsrReg {
    value: WordType,
    write_op: CsrWriteOp,
}

impl CsrReg {
    fn new(value: WordType, mask: WordType) -> CsrReg {
        CsrReg {
            value,
            write_op: CsrWriteOp::new(mask),
        }
    }

    fn write(&mut self, new_value: WordType) {
        self.write_op.apply(&mut self.value, new_value);
    }

    /// Write directly without the mask.
    fn write_directly(&mut self, new_value: WordType) {
        self.value = new_value;
    }
}

#[inline]
fn is_read_only(addr: WordType) -> bool {
    (addr & 0xC00) == 0xC00
}

pub fn csr_name(addr: WordType) -> &'static str {
    CSR_NAME.get(&addr).copied().unwrap_or("unknown")
}

pub struct CsrRegFile {
    table: HashMap<WordType, CsrReg>,
}

impl Default for CsrRegFile {
    fn default() -> Self {
        Self::new()
    }
}

impl CsrRegFile {
    pub fn new() -> Self {
        Self::from(CSR_REG_TABLE)
    }

    pub fn from(csr_table: &[(WordType, WordType, WordType)]) -> Self {
        let mut table = HashMap::new();
        for (addr, default_value, mask) in csr_table.iter() {
            table.insert(*addr, CsrReg::new(*default_value, *mask));
        }

        Self { table }
    }

    /// Read as the guest does. `will_write` announces that the instruction will write the
    /// register back, which read-only registers refuse.
    pub fn read(&self, addr: WordType, will_write: bool) -> Result<WordType, CsrError> {
        if will_write && is_read_only(addr) {
            return Err(CsrError::ReadOnly(addr));
        }

        self.table
            .get(&addr)
            .map(|reg| reg.value)
            .ok_or(CsrError::Unknown(addr))
    }

    /// Write as the guest does, keeping every bit outside the register's write mask.
    pub fn write(&mut self, addr: WordType, data: WordType) -> Result<(), CsrError> {
        if is_read_only(addr) {
            return Err(CsrError::ReadOnly(addr));
        }

        let reg = self.table.get_mut(&addr).ok_or(CsrError::Unknown(addr))?;
        reg.write(data);
        log::trace!("csr {} <- {:#010x}", csr_name(addr), reg.value);
        Ok(())
    }

    pub fn read_directly(&self, addr: WordType) -> Option<WordType> {
        self.table.get(&addr).map(|reg| reg.value)
    }

    /// Write directly without any check or mask.
    #[must_use]
    pub fn write_directly(&mut self, addr: WordType, data: WordType) -> Option<()> {
        let reg = self.table.get_mut(&addr)?;
        reg.write_directly(data);
        Some(())
    }

    pub fn mstatus(&self) -> Mstatus {
        Mstatus::from_bits_retain(self.read_directly(csr_index::mstatus).unwrap_or(0))
    }

    pub fn set_mstatus(&mut self, value: Mstatus) {
        let written = self.write_directly(csr_index::mstatus, value.bits());
        debug_assert!(written.is_some(), "mstatus is always present");
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rw_by_addr() {
        let mut reg = CsrRegFile::new();
        reg.write(csr_index::mcause, 3).unwrap();
        reg.write(csr_index::mscratch, 0x1234_5678).unwrap();

        assert_eq!(reg.read(csr_index::mcause, false).unwrap(), 3);
        assert_eq!(reg.read(csr_index::mscratch, true).unwrap(), 0x1234_5678);
    }

    #[test]
    fn test_write_mask() {
        let mut reg = CsrRegFile::new();

        reg.write(csr_index::mtvec, 0x8000_0103).unwrap();
        assert_eq!(reg.read(csr_index::mtvec, false).unwrap(), 0x8000_0100);

        reg.write(csr_index::mepc, 0x1235).unwrap();
        assert_eq!(reg.read(csr_index::mepc, false).unwrap(), 0x1234);

        reg.write(csr_index::mip, !0).unwrap();
        assert_eq!(
            reg.read(csr_index::mip, false).unwrap(),
            (Mip::SSIP | Mip::STIP).bits()
        );

        reg.write(csr_index::mstatus, !0).unwrap();
        let mstatus = reg.mstatus();
        assert!(mstatus.contains(Mstatus::MIE | Mstatus::MPIE | Mstatus::MPP));
        assert!(!mstatus.intersects(Mstatus::FS));
    }

    #[test]
    fn test_masked_bits_preserved() {
        let mut reg = CsrRegFile::new();
        reg.write_directly(csr_index::mip, Mip::MTIP.bits()).unwrap();

        reg.write(csr_index::mip, Mip::SSIP.bits()).unwrap();
        assert_eq!(
            reg.read(csr_index::mip, false).unwrap(),
            (Mip::MTIP | Mip::SSIP).bits()
        );

        reg.write(csr_index::mip, 0).unwrap();
        assert_eq!(reg.read(csr_index::mip, false).unwrap(), Mip::MTIP.bits());
    }

    #[test]
    fn test_unknown_and_read_only() {
        let mut reg = CsrRegFile::new();
        assert_eq!(reg.read(0x7c0, false), Err(CsrError::Unknown(0x7c0)));
        assert_eq!(reg.write(0x7c0, 1), Err(CsrError::Unknown(0x7c0)));

        assert_eq!(reg.read(0xf14, true), Err(CsrError::ReadOnly(0xf14)));
        assert_eq!(reg.read(0xf14, false), Err(CsrError::Unknown(0xf14)));
        assert_eq!(reg.write(0xc00, 1), Err(CsrError::ReadOnly(0xc00)));
    }

    #[test]
    fn test_csr_name() {
        assert_eq!(csr_name(csr_index::mepc), "mepc");
        assert_eq!(csr_name(0x123), "unknown");
    }
}
