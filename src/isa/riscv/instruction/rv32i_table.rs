use crate::{define_riscv_isa, isa::riscv::instruction::InstrFormat};

// Entries decoded by `mask`/`key` carry reserved bits the funct fields cannot express.
define_riscv_isa!(
    RiscvInstr,
    RV32I, TABLE_RV32I, {
        LUI {
            opcode: 0b0110111,
            funct3: 0b000,
            funct7: 0b0000000,
            format: InstrFormat::U,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        AUIPC {
            opcode: 0b0010111,
            funct3: 0b000,
            funct7: 0b0000000,
            format: InstrFormat::U,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        JAL {
            opcode: 0b1101111,
            funct3: 0b000,
            funct7: 0b0000000,
            format: InstrFormat::J,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        JALR {
            opcode: 0b1100111,
            funct3: 0b000,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        BEQ {
            opcode: 0b1100011,
            funct3: 0b000,
            funct7: 0b0000000,
            format: InstrFormat::B,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        BNE {
            opcode: 0b1100011,
            funct3: 0b001,
            funct7: 0b0000000,
            format: InstrFormat::B,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        BLT {
            opcode: 0b1100011,
            funct3: 0b100,
            funct7: 0b0000000,
            format: InstrFormat::B,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        BGE {
            opcode: 0b1100011,
            funct3: 0b101,
            funct7: 0b0000000,
            format: InstrFormat::B,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        BLTU {
            opcode: 0b1100011,
            funct3: 0b110,
            funct7: 0b0000000,
            format: InstrFormat::B,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        BGEU {
            opcode: 0b1100011,
            funct3: 0b111,
            funct7: 0b0000000,
            format: InstrFormat::B,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        LB {
            opcode: 0b0000011,
            funct3: 0b000,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        LH {
            opcode: 0b0000011,
            funct3: 0b001,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        LW {
            opcode: 0b0000011,
            funct3: 0b010,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        LBU {
            opcode: 0b0000011,
            funct3: 0b100,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        LHU {
            opcode: 0b0000011,
            funct3: 0b101,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        SB {
            opcode: 0b0100011,
            funct3: 0b000,
            funct7: 0b0000000,
            format: InstrFormat::S,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        SH {
            opcode: 0b0100011,
            funct3: 0b001,
            funct7: 0b0000000,
            format: InstrFormat::S,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        SW {
            opcode: 0b0100011,
            funct3: 0b010,
            funct7: 0b0000000,
            format: InstrFormat::S,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        ADDI {
            opcode: 0b0010011,
            funct3: 0b000,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        SLTI {
            opcode: 0b0010011,
            funct3: 0b010,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        SLTIU {
            opcode: 0b0010011,
            funct3: 0b011,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        XORI {
            opcode: 0b0010011,
            funct3: 0b100,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        ORI {
            opcode: 0b0010011,
            funct3: 0b110,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        ANDI {
            opcode: 0b0010011,
            funct3: 0b111,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        SLLI {
            opcode: 0b0010011,
            funct3: 0b001,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0xfe00707f,
            key: 0x00001013,
            use_mask: true,
        },
        SRLI {
            opcode: 0b0010011,
            funct3: 0b101,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0xfe00707f,
            key: 0x00005013,
            use_mask: true,
        },
        SRAI {
            opcode: 0b0010011,
            funct3: 0b101,
            funct7: 0b0100000,
            format: InstrFormat::I,
            mask: 0xfe00707f,
            key: 0x40005013,
            use_mask: true,
        },
        ADD {
            opcode: 0b0110011,
            funct3: 0b000,
            funct7: 0b0000000,
            format: InstrFormat::R,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        SUB {
            opcode: 0b0110011,
            funct3: 0b000,
            funct7: 0b0100000,
            format: InstrFormat::R,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        SLL {
            opcode: 0b0110011,
            funct3: 0b001,
            funct7: 0b0000000,
            format: InstrFormat::R,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        SLT {
            opcode: 0b0110011,
            funct3: 0b010,
            funct7: 0b0000000,
            format: InstrFormat::R,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        SLTU {
            opcode: 0b0110011,
            funct3: 0b011,
            funct7: 0b0000000,
            format: InstrFormat::R,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        XOR {
            opcode: 0b0110011,
            funct3: 0b100,
            funct7: 0b0000000,
            format: InstrFormat::R,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        SRL {
            opcode: 0b0110011,
            funct3: 0b101,
            funct7: 0b0000000,
            format: InstrFormat::R,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        SRA {
            opcode: 0b0110011,
            funct3: 0b101,
            funct7: 0b0100000,
            format: InstrFormat::R,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        OR {
            opcode: 0b0110011,
            funct3: 0b110,
            funct7: 0b0000000,
            format: InstrFormat::R,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        AND {
            opcode: 0b0110011,
            funct3: 0b111,
            funct7: 0b0000000,
            format: InstrFormat::R,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
    },
    RV32M, TABLE_RV32M, {
        MUL {
            opcode: 0b0110011,
            funct3: 0b000,
            funct7: 0b0000001,
            format: InstrFormat::R,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        MULH {
            opcode: 0b0110011,
            funct3: 0b001,
            funct7: 0b0000001,
            format: InstrFormat::R,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        MULHSU {
            opcode: 0b0110011,
            funct3: 0b010,
            funct7: 0b0000001,
            format: InstrFormat::R,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        MULHU {
            opcode: 0b0110011,
            funct3: 0b011,
            funct7: 0b0000001,
            format: InstrFormat::R,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        DIV {
            opcode: 0b0110011,
            funct3: 0b100,
            funct7: 0b0000001,
            format: InstrFormat::R,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        DIVU {
            opcode: 0b0110011,
            funct3: 0b101,
            funct7: 0b0000001,
            format: InstrFormat::R,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        REM {
            opcode: 0b0110011,
            funct3: 0b110,
            funct7: 0b0000001,
            format: InstrFormat::R,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        REMU {
            opcode: 0b0110011,
            funct3: 0b111,
            funct7: 0b0000001,
            format: InstrFormat::R,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
    },
    RVZICSR, TABLE_RVZICSR, {
        CSRRW {
            opcode: 0b1110011,
            funct3: 0b001,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        CSRRS {
            opcode: 0b1110011,
            funct3: 0b010,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        CSRRC {
            opcode: 0b1110011,
            funct3: 0b011,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        CSRRWI {
            opcode: 0b1110011,
            funct3: 0b101,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        CSRRSI {
            opcode: 0b1110011,
            funct3: 0b110,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
        CSRRCI {
            opcode: 0b1110011,
            funct3: 0b111,
            funct7: 0b0000000,
            format: InstrFormat::I,
            mask: 0x00000000,
            key: 0x00000000,
            use_mask: false,
        },
    },
    RVSYSTEM, TABLE_RVSYSTEM, {
        ECALL {
            opcode: 0b1110011,
            funct3: 0b000,
            funct7: 0b0000000,
            format: InstrFormat::None,
            mask: 0xffffffff,
            key: 0x00000073,
            use_mask: true,
        },
        EBREAK {
            opcode: 0b1110011,
            funct3: 0b000,
            funct7: 0b0000000,
            format: InstrFormat::None,
            mask: 0xffffffff,
            key: 0x00100073,
            use_mask: true,
        },
        MRET {
            opcode: 0b1110011,
            funct3: 0b000,
            funct7: 0b0011000,
            format: InstrFormat::None,
            mask: 0xffffffff,
            key: 0x30200073,
            use_mask: true,
        },
        WFI {
            opcode: 0b1110011,
            funct3: 0b000,
            funct7: 0b0001000,
            format: InstrFormat::None,
            mask: 0xfff07fff,
            key: 0x10500073,
            use_mask: true,
        },
    },
);
