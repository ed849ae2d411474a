pub(super) mod exec_function;
pub mod exec_mapping;
pub mod rv32i_table;

use crate::{
    config::arch_config::WordType,
    isa::riscv::{executor::RV32CPU, trap::Exception},
};

type ExecFn = fn(RVInstrInfo, &mut RV32CPU) -> Result<(), Exception>;

/// Operands of a decoded instruction. `imm` holds the raw reassembled immediate, already
/// positioned (B/J offsets keep bit 0 clear, U keeps the low 12 bits clear) but not sign
/// extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RVInstrInfo {
    None,
    R { rs1: u8, rs2: u8, rd: u8 },
    I { rs1: u8, rd: u8, imm: WordType },
    S { rs1: u8, rs2: u8, imm: WordType },
    B { rs1: u8, rs2: u8, imm: WordType },
    U { rd: u8, imm: WordType },
    J { rd: u8, imm: WordType },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrFormat {
    None,
    R,
    I,
    S,
    B,
    U,
    J,
}

/// Declares the instruction enum plus one `RVInstrDesc` table per ISA extension.
#[macro_export]
macro_rules! define_riscv_isa {
    ( $tot_instr_name:ident,
        $( $isa_name:ident, $isa_table_name:ident, {$(
                $name:ident {
                    opcode: $opcode:literal,
                    funct3: $funct3:literal,
                    funct7: $funct7:literal,
                    format: $fmt:expr,
                    mask: $mask:literal,
                    key: $key:literal,
                    use_mask: $use_mask:literal,
                }),* $(,)?
            }
        ),* $(,)?
    ) => {

        $crate::define_instr_enum!($tot_instr_name, $($($name,)*)*);

        impl $tot_instr_name {
            pub fn isa_name(&self) -> &'static str {
                match self {
                    $(
                        $(
                            $tot_instr_name::$name => stringify!($isa_name),
                        )*
                    )*
                }
            }
        }

        #[derive(Debug, Clone)]
        pub struct RVInstrDesc {
            pub opcode: u8,
            pub funct3: u8,
            pub funct7: u8,
            pub instr: $tot_instr_name,
            pub format: InstrFormat,
            pub mask: u32,
            pub key: u32,
            pub use_mask: bool,
        }

        $(
            pub const $isa_table_name: &[RVInstrDesc] = &[
                $(
                    RVInstrDesc {
                        opcode: $opcode,
                        funct3: $funct3,
                        funct7: $funct7,
                        instr: $tot_instr_name::$name,
                        format: $fmt,
                        mask: $mask,
                        key: $key,
                        use_mask: $use_mask,
                    }
                ),*
            ];
        )*
    };
}
