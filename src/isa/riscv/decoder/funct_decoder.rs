use smallvec::SmallVec;

use crate::isa::riscv::{
    decoder::{DecodeInstr, DecoderTrait, decode_info},
    instruction::{
        InstrFormat,
        rv32i_table::{RVInstrDesc, RiscvInstr},
    },
};

/// Which fields beyond the opcode pick an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Selector {
    #[default]
    Unused,
    Opcode,
    Funct3,
    Funct3Funct7,
}

impl Selector {
    fn for_format(format: InstrFormat) -> Self {
        match format {
            InstrFormat::R => Selector::Funct3Funct7,
            InstrFormat::I | InstrFormat::S | InstrFormat::B => Selector::Funct3,
            InstrFormat::U | InstrFormat::J | InstrFormat::None => Selector::Opcode,
        }
    }

    #[inline]
    fn key(self, funct3: u8, funct7: u8) -> (u8, u8) {
        match self {
            Selector::Unused | Selector::Opcode => (0, 0),
            Selector::Funct3 => (funct3, 0),
            Selector::Funct3Funct7 => (funct3, funct7),
        }
    }
}

type Candidate = ((u8, u8), RiscvInstr, InstrFormat);

/// Everything sharing one major opcode. No opcode has more than 8 funct variants here.
#[derive(Debug, Clone, Default)]
struct OpcodeEntry {
    selector: Selector,
    candidates: SmallVec<[Candidate; 8]>,
}

/// Decodes by opcode, then funct3, then funct7, as far as the format needs.
pub(super) struct Decoder {
    table: Vec<OpcodeEntry>,
}

impl DecoderTrait for Decoder {
    fn from_isa(instrs: &[RVInstrDesc]) -> Self {
        let mut table = vec![OpcodeEntry::default(); 1 << 7];

        for desc in instrs.iter().filter(|desc| !desc.use_mask) {
            let entry = &mut table[desc.opcode as usize];
            let selector = Selector::for_format(desc.format);
            debug_assert!(
                entry.selector == Selector::Unused || entry.selector == selector,
                "{} mixes formats under opcode {:#x}",
                desc.instr.name(),
                desc.opcode
            );

            entry.selector = selector;
            entry.candidates.push((
                selector.key(desc.funct3, desc.funct7),
                desc.instr,
                desc.format,
            ));
        }

        log::debug!(
            "funct decoder covers {} instructions",
            table.iter().map(|entry| entry.candidates.len()).sum::<usize>()
        );

        Decoder { table }
    }

    fn decode(&self, raw_instr: u32) -> Option<DecodeInstr> {
        let opcode = (raw_instr & 0x7F) as usize;
        let funct3 = ((raw_instr >> 12) & 0b111) as u8;
        let funct7 = (raw_instr >> 25) as u8;

        let entry = &self.table[opcode];
        if entry.selector == Selector::Unused {
            return None;
        }

        let key = entry.selector.key(funct3, funct7);
        let &(_, instr, format) = entry.candidates.iter().find(|(k, _, _)| *k == key)?;

        Some(DecodeInstr(instr, decode_info(raw_instr, instr, format)))
    }
}
