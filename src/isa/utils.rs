/// Concatenates instruction tables into one ISA description.
pub struct ISABuilder<Desc: Clone> {
    tables: Vec<Desc>,
}

impl<Desc: Clone> Default for ISABuilder<Desc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Desc: Clone> ISABuilder<Desc> {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    pub fn add(mut self, table: &[Desc]) -> Self {
        self.tables.extend_from_slice(table);
        self
    }

    pub fn build(self) -> Vec<Desc> {
        self.tables
    }
}

#[macro_export]
macro_rules! define_instr_enum {
    ($isa_name:ident, $($name:ident),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $isa_name {
            $($name),*
        }

        impl $isa_name {
            pub fn name(&self) -> &'static str {
                match self {
                    $($isa_name::$name => stringify!($name)),*
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeMask {
    pub key: u32,
    pub mask: u32,
}

impl DecodeMask {
    pub fn matches(&self, instr: u32) -> bool {
        (instr & self.mask) == self.key
    }
}

/// Build a mask from a bit pattern written MSB first. `?` is a don't-care bit, any other
/// character except `0`/`1` is ignored, so fields can be spaced out.
#[cfg(test)]
pub fn create_decode_mask(pattern: &'static str) -> DecodeMask {
    let bits = pattern.chars().filter(|ch| matches!(ch, '0' | '1' | '?'));
    let width = bits.clone().count();
    assert!(
        width <= 32 && width % 8 == 0,
        "decode pattern {:?} is {} bits wide",
        pattern,
        width
    );

    bits.fold(DecodeMask { key: 0, mask: 0 }, |acc, ch| DecodeMask {
        key: (acc.key << 1) | (ch == '1') as u32,
        mask: (acc.mask << 1) | (ch != '?') as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_decode_mask() {
        let mask = create_decode_mask("0001000 00101 ????? 000 00000 1110011");
        assert_eq!(mask.mask, 0xfff0_7fff);
        assert_eq!(mask.key, 0x1050_0073);
        assert!(mask.matches(0x1050_0073));
        assert!(mask.matches(0x105f_8073));
        assert!(!mask.matches(0x1050_00f3));
    }
}
