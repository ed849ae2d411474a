use std::fmt::Display;

use crate::{
    config::arch_config::WordType,
    isa::{
        riscv::instruction::{InstrFormat, RVInstrInfo, rv32i_table::*},
        utils::ISABuilder,
    },
};

mod funct_decoder;
mod mask_decoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeInstr(pub RiscvInstr, pub RVInstrInfo);

impl Display for DecodeInstr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}, {:?}", self.0, self.1)
    }
}

pub trait DecoderTrait {
    fn from_isa(instrs: &[RVInstrDesc]) -> Self;

    /// `None` is the only way an encoding is reported as illegal.
    fn decode(&self, instr: u32) -> Option<DecodeInstr>;
}

pub struct Decoder {
    funct3_decoder: funct_decoder::Decoder,
    mask_decoder: mask_decoder::MaskDecoder,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        let isa = ISABuilder::new()
            .add(TABLE_RV32I)
            .add(TABLE_RV32M)
            .add(TABLE_RVZICSR)
            .add(TABLE_RVSYSTEM)
            .build();
        Self::from_isa(&isa)
    }
}

impl DecoderTrait for Decoder {
    fn from_isa(instrs: &[RVInstrDesc]) -> Self {
        Self {
            funct3_decoder: funct_decoder::Decoder::from_isa(instrs),
            mask_decoder: mask_decoder::MaskDecoder::from_isa(instrs),
        }
    }

    fn decode(&self, instr: u32) -> Option<DecodeInstr> {
        self.mask_decoder
            .decode(instr)
            .or_else(|| self.funct3_decoder.decode(instr))
    }
}

/// `len` bits of `raw` starting at bit `lo`, shifted down to bit 0.
#[inline(always)]
const fn bits(raw: u32, lo: u32, len: u32) -> u32 {
    (raw >> lo) & ((1 << len) - 1)
}

fn decode_info(raw: u32, instr: RiscvInstr, fmt: InstrFormat) -> RVInstrInfo {
    let rd = bits(raw, 7, 5) as u8;
    let rs1 = bits(raw, 15, 5) as u8;
    let rs2 = bits(raw, 20, 5) as u8;

    let imm: WordType = match fmt {
        InstrFormat::R | InstrFormat::None => 0,
        // SRAI keeps funct7 in the upper immediate bits.
        InstrFormat::I if instr == RiscvInstr::SRAI => bits(raw, 20, 5),
        InstrFormat::I => bits(raw, 20, 12),
        InstrFormat::S => bits(raw, 25, 7) << 5 | bits(raw, 7, 5),
        InstrFormat::U => raw & !0xFFF,
        InstrFormat::B => {
            bits(raw, 31, 1) << 12
                | bits(raw, 7, 1) << 11
                | bits(raw, 25, 6) << 5
                | bits(raw, 8, 4) << 1
        }
        InstrFormat::J => {
            bits(raw, 31, 1) << 20
                | bits(raw, 12, 8) << 12
                | bits(raw, 20, 1) << 11
                | bits(raw, 21, 10) << 1
        }
    };

    match fmt {
        InstrFormat::R => RVInstrInfo::R { rd, rs1, rs2 },
        InstrFormat::I => RVInstrInfo::I { rd, rs1, imm },
        InstrFormat::S => RVInstrInfo::S { rs1, rs2, imm },
        InstrFormat::U => RVInstrInfo::U { rd, imm },
        InstrFormat::B => RVInstrInfo::B { rs1, rs2, imm },
        InstrFormat::J => RVInstrInfo::J { rd, imm },
        InstrFormat::None => RVInstrInfo::None,
    }
}
