use std::{
    io,
    path::{Path, PathBuf},
};

use crate::{
    config::{EmulatorConfig, arch_config::WordType},
    cpu::abi,
    isa::{DebugTarget, riscv::executor::RV32CPU},
};

/// `ecall; ret`, placed after the image so a guest can call the host bridge by jumping here.
pub const HOST_TRAMPOLINE: [u8; 8] = [0x73, 0x00, 0x00, 0x00, 0x67, 0x80, 0x00, 0x00];

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("cannot read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("image of {len} bytes at {offset:#x} does not fit into {mem_size} bytes of memory")]
    TooLarge {
        len: usize,
        offset: WordType,
        mem_size: usize,
    },
}

pub fn read_image(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Copy a raw binary into memory at `offset`.
pub fn load_bin(cpu: &mut RV32CPU, image: &[u8], offset: WordType) -> Result<(), LoadError> {
    cpu.load(image, offset).map_err(|_| LoadError::TooLarge {
        len: image.len(),
        offset,
        mem_size: cpu.mem_size(),
    })
}

/// Load `image` and set the core up to run it.
///
/// The host trampoline goes to the first 4-byte boundary after the image. Execution starts
/// at 0 with `sp` and `fp` at the top of guest memory and `a0` holding the trampoline
/// address, which is also returned.
pub fn bootstrap(
    cpu: &mut RV32CPU,
    image: &[u8],
    config: &EmulatorConfig,
) -> Result<WordType, LoadError> {
    let too_large = || LoadError::TooLarge {
        len: image.len(),
        offset: config.load_offset,
        mem_size: config.guest_mem_size(),
    };

    let end = (config.load_offset as usize)
        .checked_add(image.len())
        .ok_or_else(too_large)?;
    if end > config.guest_mem_size() {
        return Err(too_large());
    }
    let trampoline = WordType::try_from(end.next_multiple_of(4)).map_err(|_| too_large())?;

    load_bin(cpu, image, config.load_offset)?;
    load_bin(cpu, &HOST_TRAMPOLINE, trampoline)?;

    let top = WordType::try_from(config.guest_mem_size()).map_err(|_| too_large())?;
    cpu.write_pc(0);
    cpu.write_reg(abi::SP, top);
    cpu.write_reg(abi::FP, top);
    cpu.write_reg(abi::A0, trampoline);

    log::info!(
        "loaded {} bytes at {:#x}, host trampoline at {:#x}, stack top {:#x}",
        image.len(),
        config.load_offset,
        trampoline,
        top
    );
    Ok(trampoline)
}
