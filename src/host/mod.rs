//! Host capability bridge for guests running with [`EnvCallMode::Host`].
//!
//! The selector is in `a0`, arguments in `a1..a4`, and the result goes back into `a0`.
//! Guest buffers are resolved to borrowed views before the host sees them, so a bad
//! pointer turns into `-1` without reaching the host.
//!
//! [`EnvCallMode::Host`]: crate::config::EnvCallMode::Host

use std::io;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{
    config::arch_config::WordType, cpu::abi, device::MemError, isa::DebugTarget,
};

mod std_host;

pub use std_host::StdHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum HostCall {
    Open = 0x00,
    Close = 0x04,
    Read = 0x08,
    Write = 0x0c,
    Seek = 0x10,
    Poll = 0x14,
}

/// Open flags, Linux values.
pub mod open_flags {
    pub const O_RDONLY: u32 = 0;
    pub const O_WRONLY: u32 = 1;
    pub const O_RDWR: u32 = 2;
    pub const O_ACCMODE: u32 = 3;
    pub const O_CREAT: u32 = 0x40;
    pub const O_TRUNC: u32 = 0x200;
    pub const O_APPEND: u32 = 0x400;
}

pub mod poll_events {
    pub const POLLIN: i16 = 0x001;
    pub const POLLOUT: i16 = 0x004;
    pub const POLLNVAL: i16 = 0x020;
}

#[derive(thiserror::Error, Debug)]
pub enum HostError {
    #[error("unknown host call {0:#x}")]
    UnknownCall(WordType),
    #[error("guest buffer: {0}")]
    Mem(#[from] MemError),
    #[error("bad file descriptor {0}")]
    BadFd(i32),
    #[error("invalid argument")]
    InvalidArgument,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// One 8-byte `struct pollfd` entry in guest memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollFd {
    pub fd: i32,
    pub events: i16,
    pub revents: i16,
}

impl PollFd {
    pub const SIZE: usize = 8;

    pub fn from_le_slice(raw: &[u8]) -> Self {
        Self {
            fd: i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]),
            events: i16::from_le_bytes([raw[4], raw[5]]),
            revents: i16::from_le_bytes([raw[6], raw[7]]),
        }
    }

    pub fn write_le_slice(&self, raw: &mut [u8]) {
        raw[0..4].copy_from_slice(&self.fd.to_le_bytes());
        raw[4..6].copy_from_slice(&self.events.to_le_bytes());
        raw[6..8].copy_from_slice(&self.revents.to_le_bytes());
    }
}

/// File-like services a guest can request through `ecall`.
pub trait HostCapability {
    fn open(&mut self, path: &[u8], flags: u32, mode: u32) -> Result<i32, HostError>;
    fn close(&mut self, fd: i32) -> Result<(), HostError>;
    fn read(&mut self, fd: i32, buf: &mut [u8]) -> Result<usize, HostError>;
    fn write(&mut self, fd: i32, buf: &[u8]) -> Result<usize, HostError>;
    /// Move to `offset` relative to `whence` (0 start, 1 current, 2 end) and return the new
    /// position. A target beyond `max_offset` fails with the position left untouched.
    fn seek(
        &mut self,
        fd: i32,
        offset: i32,
        whence: u32,
        max_offset: u64,
    ) -> Result<u64, HostError>;
    /// Fill in `revents` and return how many entries have any.
    fn poll(&mut self, fds: &mut [PollFd], timeout: i32) -> Result<usize, HostError>;
}

fn to_result(value: usize) -> Result<i32, HostError> {
    i32::try_from(value).map_err(|_| HostError::InvalidArgument)
}

fn host_call<T, H>(target: &mut T, host: &mut H, selector: WordType) -> Result<i32, HostError>
where
    T: DebugTarget,
    H: HostCapability + ?Sized,
{
    let a1 = target.read_reg(abi::A1);
    let a2 = target.read_reg(abi::A2);
    let a3 = target.read_reg(abi::A3);
    let a4 = target.read_reg(abi::A4);

    let call = HostCall::try_from(selector).map_err(|_| HostError::UnknownCall(selector))?;
    log::debug!("host call {:?}: a1 {:#x}, a2 {:#x}, a3 {:#x}, a4 {:#x}", call, a1, a2, a3, a4);

    match call {
        HostCall::Open => {
            let path = target.view(a1, a4 as usize)?;
            host.open(path, a2, a3)
        }
        HostCall::Close => host.close(a1 as i32).map(|_| 0),
        HostCall::Read => {
            let buf = target.view_mut(a2, a3 as usize)?;
            to_result(host.read(a1 as i32, buf)?)
        }
        HostCall::Write => {
            let buf = target.view(a2, a3 as usize)?;
            to_result(host.write(a1 as i32, buf)?)
        }
        HostCall::Seek => {
            let offset = host.seek(a1 as i32, a2 as i32, a3, i32::MAX as u64)?;
            i32::try_from(offset).map_err(|_| HostError::InvalidArgument)
        }
        HostCall::Poll => {
            let len = (a2 as usize)
                .checked_mul(PollFd::SIZE)
                .ok_or(HostError::InvalidArgument)?;
            let raw = target.view_mut(a1, len)?;
            let mut fds: Vec<PollFd> = raw
                .chunks_exact(PollFd::SIZE)
                .map(PollFd::from_le_slice)
                .collect();

            let ready = host.poll(&mut fds, a3 as i32)?;
            for (entry, fd) in raw.chunks_exact_mut(PollFd::SIZE).zip(&fds) {
                fd.write_le_slice(entry);
            }
            to_result(ready)
        }
    }
}

/// Serve the host call described by the guest registers and store the result in `a0`.
///
/// Any failure is reported to the guest as `-1`.
pub fn dispatch_host_call<T, H>(target: &mut T, host: &mut H)
where
    T: DebugTarget,
    H: HostCapability + ?Sized,
{
    let selector = target.read_reg(abi::A0);
    let result = host_call(target, host, selector).unwrap_or_else(|err| {
        log::warn!("host call {:#x} failed: {}", selector, err);
        -1
    });
    target.write_reg(abi::A0, result as WordType);
}
