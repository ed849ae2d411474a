use std::{
    fmt::Debug,
    ops::{Index, IndexMut},
};

use crate::config::arch_config::{REG_NAME, REGFILE_CNT, WordType};

/// ABI names of the general-purpose registers. They index the same slots as the raw numbers.
#[allow(unused)]
pub mod abi {
    pub const ZERO: u8 = 0;
    pub const RA: u8 = 1;
    pub const SP: u8 = 2;
    pub const GP: u8 = 3;
    pub const TP: u8 = 4;
    pub const T0: u8 = 5;
    pub const T1: u8 = 6;
    pub const T2: u8 = 7;
    pub const FP: u8 = 8;
    pub const S0: u8 = FP;
    pub const S1: u8 = 9;

    seq_macro::seq!(N in 0..=7 {
        pub const A~N: u8 = 10 + N;
    });

    seq_macro::seq!(N in 2..=11 {
        pub const S~N: u8 = 16 + N;
    });

    seq_macro::seq!(N in 3..=6 {
        pub const T~N: u8 = 25 + N;
    });

    /// Register number gdb uses for the program counter.
    pub const PC: u8 = 32;
}

pub struct RegFile {
    data: [WordType; REGFILE_CNT],
}

impl Index<usize> for RegFile {
    type Output = WordType;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<usize> for RegFile {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl Debug for RegFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "reg_file {{")?;
        for (i, val) in self.data.iter().enumerate() {
            if i % 8 == 0 {
                write!(f, "  ")?;
            }

            write!(f, "{:>6}: 0x{:08x}  ", REG_NAME[i], val)?;

            if i % 8 == 7 {
                writeln!(f)?;
            }
        }

        write!(f, "}}")
    }
}

impl Default for RegFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegFile {
    pub fn new() -> Self {
        Self {
            data: [0; REGFILE_CNT],
        }
    }

    pub fn read(&self, id1: u8, id2: u8) -> (WordType, WordType) {
        (self.data[id1 as usize], self.data[id2 as usize])
    }

    /// id == 0 will be ignored, if an instruction do not need to WriteBack, set id = 0.
    pub fn write(&mut self, id: u8, data: WordType) {
        if id == 0u8 {
            return;
        }

        self.data[id as usize] = data
    }

    pub fn as_slice(&self) -> &[WordType; REGFILE_CNT] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abi_aliases() {
        assert_eq!(abi::A0, 10);
        assert_eq!(abi::A7, 17);
        assert_eq!(abi::S2, 18);
        assert_eq!(abi::S11, 27);
        assert_eq!(abi::T3, 28);
        assert_eq!(abi::T6, 31);
        assert_eq!(REG_NAME[abi::FP as usize], "s0/fp");
        assert_eq!(REG_NAME[abi::T6 as usize], "t6");
    }

    #[test]
    fn test_write_zero_ignored() {
        let mut regs = RegFile::new();
        regs.write(0, 0xdead);
        regs.write(abi::SP, 0x1000);
        assert_eq!(regs.read(0, abi::SP), (0, 0x1000));
    }
}
