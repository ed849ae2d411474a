//! GDB remote serial protocol stub.
//!
//! The stub owns its channel and packet buffers. A session runs synchronously on the
//! caller's thread: the guest is frozen from [`GdbStub::handle_exception`] entry until the
//! debugger sends `c`.

use std::io;

use crate::{
    config::{
        arch_config::{REGFILE_CNT, WordType},
        stub_config::{BUFMAX, INTERRUPT_BYTE, STOP_SIGNAL},
    },
    cpu::abi,
    isa::{DebugTarget, riscv::csr_reg::csr_index},
    utils::{hex_value, parse_hex_prefix},
};

pub mod channel;
pub mod packet;
mod tcp;

pub use channel::{DebugChannel, SimulatedChannel, SimulatedClient, simulated_pair};
pub use tcp::TcpChannel;
use packet::PacketBuffer;

/// Largest `m` reply, in memory bytes.
const MAX_READ_BYTES: usize = (BUFMAX - 1) / 2;

/// A command the stub understood but could not carry out. Reported as `Exx`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    #[error("malformed memory read")]
    BadReadSyntax,
    #[error("malformed memory write")]
    BadWriteSyntax,
    #[error("memory range {addr:#x}+{len:#x} is out of bounds")]
    OutOfRange { addr: WordType, len: WordType },
}

impl CommandError {
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::BadReadSyntax => "E01",
            CommandError::BadWriteSyntax => "E02",
            CommandError::OutOfRange { .. } => "E03",
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DebugError {
    #[error("debug channel failed: {0}")]
    Channel(#[from] io::Error),
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    HaltReason,
    Query(&'a [u8]),
    SetThread,
    ReadRegisters,
    WriteRegisters,
    ReadMemory {
        addr: WordType,
        len: WordType,
    },
    WriteMemory {
        addr: WordType,
        len: WordType,
        data: &'a [u8],
    },
    Continue,
    Kill,
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Reply,
    Resume,
}

/// `addr,len` with at least one digit on each side. Returns what follows `len`.
fn parse_addr_len(args: &[u8]) -> Option<(WordType, WordType, &[u8])> {
    let (addr, digits) = parse_hex_prefix(args);
    if digits == 0 {
        return None;
    }
    let rest = args[digits..].strip_prefix(b",")?;
    let (len, digits) = parse_hex_prefix(rest);
    if digits == 0 {
        return None;
    }
    Some((addr, len, &rest[digits..]))
}

impl<'a> Command<'a> {
    fn parse(payload: &'a [u8]) -> Result<Self, CommandError> {
        let Some((&cmd, args)) = payload.split_first() else {
            return Ok(Command::Unsupported);
        };

        Ok(match cmd {
            b'?' => Command::HaltReason,
            b'q' => Command::Query(args),
            b'H' => Command::SetThread,
            b'g' => Command::ReadRegisters,
            b'G' => Command::WriteRegisters,
            b'm' => {
                let (addr, len, _) = parse_addr_len(args).ok_or(CommandError::BadReadSyntax)?;
                Command::ReadMemory { addr, len }
            }
            b'M' => {
                let (addr, len, rest) =
                    parse_addr_len(args).ok_or(CommandError::BadWriteSyntax)?;
                let data = rest.strip_prefix(b":").ok_or(CommandError::BadWriteSyntax)?;
                Command::WriteMemory { addr, len, data }
            }
            // The resume address is not honored.
            b'c' => Command::Continue,
            b'k' => Command::Kill,
            _ => Command::Unsupported,
        })
    }

    fn execute<T: DebugTarget>(
        self,
        target: &mut T,
        out: &mut PacketBuffer,
    ) -> Result<Flow, CommandError> {
        match self {
            Command::HaltReason => {
                out.push(b'S');
                out.push_hex(&[STOP_SIGNAL]);
            }
            Command::Query(query) => {
                if query.starts_with(b"Su") {
                    out.push_str("PacketSize=1024");
                } else if query.starts_with(b"Sy") {
                    out.push_str("OK");
                }
            }
            Command::SetThread | Command::WriteRegisters => out.push_str("OK"),
            Command::ReadRegisters => {
                for idx in 0..REGFILE_CNT as u8 {
                    out.push_hex(&target.read_reg(idx).to_le_bytes());
                }
                out.push_hex(&target.read_pc().to_le_bytes());
            }
            Command::ReadMemory { addr, len } => {
                let bytes = target
                    .view(addr, len as usize)
                    .map_err(|_| CommandError::OutOfRange { addr, len })?;
                out.push_hex(&bytes[..bytes.len().min(MAX_READ_BYTES)]);
            }
            Command::WriteMemory { addr, len, data } => {
                let dst = target
                    .view_mut(addr, len as usize)
                    .map_err(|_| CommandError::OutOfRange { addr, len })?;
                let hex = data
                    .get(..dst.len() * 2)
                    .ok_or(CommandError::BadWriteSyntax)?;
                if !hex.iter().all(|&ch| hex_value(ch).is_some()) {
                    return Err(CommandError::BadWriteSyntax);
                }
                for (byte, pair) in dst.iter_mut().zip(hex.chunks_exact(2)) {
                    let hi = hex_value(pair[0]).unwrap_or_default();
                    let lo = hex_value(pair[1]).unwrap_or_default();
                    *byte = (hi << 4) | lo;
                }
                out.push_str("OK");
            }
            Command::Continue => return Ok(Flow::Resume),
            Command::Kill | Command::Unsupported => {}
        }
        Ok(Flow::Reply)
    }
}

/// `T05` followed by fp, sp and pc, each as 4 little-endian bytes in hex.
fn report_stop<T: DebugTarget>(target: &T, trapped: bool, out: &mut PacketBuffer) {
    let pc = if trapped {
        target
            .read_csr(csr_index::mepc)
            .unwrap_or_else(|| target.read_pc())
    } else {
        target.read_pc()
    };

    out.push(b'T');
    out.push_hex(&[STOP_SIGNAL]);
    for (regno, value) in [
        (abi::FP, target.read_reg(abi::FP)),
        (abi::SP, target.read_reg(abi::SP)),
        (abi::PC, pc),
    ] {
        out.push_hex(&[regno]);
        out.push(b':');
        out.push_hex(&value.to_le_bytes());
        out.push(b';');
    }
}

pub struct GdbStub<C: DebugChannel> {
    channel: C,
    in_buf: [u8; BUFMAX],
    out_buf: PacketBuffer,
}

impl<C: DebugChannel> GdbStub<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            in_buf: [0; BUFMAX],
            out_buf: PacketBuffer::new(),
        }
    }

    /// Check for the attention byte without blocking. Other bytes are dropped.
    pub fn poll_interrupt(&mut self) -> Result<bool, DebugError> {
        Ok(self.channel.poll_char()? == Some(INTERRUPT_BYTE))
    }

    /// Run a debug session until the debugger resumes the guest.
    ///
    /// `trapped` tells whether a trap caused the stop, in which case the reported pc
    /// is `mepc`.
    pub fn handle_exception<T: DebugTarget>(
        &mut self,
        target: &mut T,
        trapped: bool,
    ) -> Result<(), DebugError> {
        log::debug!(
            "debug session entered at pc {:#010x}, trapped: {}",
            target.read_pc(),
            trapped
        );

        self.out_buf.clear();
        report_stop(target, trapped, &mut self.out_buf);
        packet::write_packet(&mut self.channel, self.out_buf.as_slice())?;

        loop {
            let range = packet::read_packet(&mut self.channel, &mut self.in_buf)?;
            let payload = &self.in_buf[range];

            self.out_buf.clear();
            let flow = Command::parse(payload)
                .and_then(|command| command.execute(target, &mut self.out_buf))
                .unwrap_or_else(|err| {
                    log::warn!("gdb command failed: {}", err);
                    self.out_buf.clear();
                    self.out_buf.push_str(err.code());
                    Flow::Reply
                });

            if flow == Flow::Resume {
                log::debug!("debug session resumed at pc {:#010x}", target.read_pc());
                return Ok(());
            }
            packet::write_packet(&mut self.channel, self.out_buf.as_slice())?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::riscv::{
        executor::RV32CPU,
        trap::{Exception, Trap},
    };

    const MEM_SIZE: usize = 0x100;

    /// Split the stub's output into packet payloads, dropping acks.
    fn replies(out: &[u8]) -> Vec<String> {
        let mut result = Vec::new();
        let mut iter = out.iter().copied();
        while let Some(ch) = iter.next() {
            if ch != b'$' {
                continue;
            }
            let payload: Vec<u8> = iter.by_ref().take_while(|&ch| ch != b'#').collect();
            iter.next();
            iter.next();
            result.push(String::from_utf8(payload).unwrap());
        }
        result
    }

    /// Run one session answering `packets` then `c`. Returns the stop report and each reply.
    fn run_session(cpu: &mut RV32CPU, trapped: bool, packets: &[&str]) -> Vec<String> {
        let (channel, client) = simulated_pair();
        let mut stub = GdbStub::new(channel);

        client.send_input_data(*b"+");
        for packet in packets {
            client.send_packet(packet);
            client.send_input_data(*b"+");
        }
        client.send_packet("c");

        stub.handle_exception(cpu, trapped).unwrap();
        replies(&client.receive_output_data())
    }

    fn test_cpu() -> RV32CPU {
        let mut cpu = RV32CPU::new(MEM_SIZE);
        cpu.write_reg(abi::SP, 0x100);
        cpu.write_reg(abi::FP, 0xF0);
        cpu.write_pc(0x40);
        cpu
    }

    #[test]
    fn test_stop_report_uses_live_pc() {
        let mut cpu = test_cpu();
        let out = run_session(&mut cpu, false, &[]);
        assert_eq!(out, ["T0508:f0000000;02:00010000;20:40000000;"]);
    }

    #[test]
    fn test_stop_report_uses_mepc_after_trap() {
        let mut cpu = test_cpu();
        cpu.raise(Trap::Exception(Exception::Breakpoint), 0);
        assert_eq!(cpu.read_pc(), 0);

        let out = run_session(&mut cpu, true, &[]);
        assert_eq!(out[0], "T0508:f0000000;02:00010000;20:40000000;");
    }

    #[test]
    fn test_simple_replies() {
        let mut cpu = test_cpu();
        let out = run_session(
            &mut cpu,
            false,
            &["?", "qSupported:xmlRegisters=i386", "qSymbol::", "qC", "Hg0", "G00", "k", "vCont?", ""],
        );
        assert_eq!(
            &out[1..],
            ["S05", "PacketSize=1024", "OK", "", "OK", "OK", "", "", ""]
        );
    }

    #[test]
    fn test_read_registers() {
        let mut cpu = test_cpu();
        cpu.write_reg(abi::A0, 0x1234_5678);
        let out = run_session(&mut cpu, false, &["g"]);

        let regs = &out[1];
        assert_eq!(regs.len(), 33 * 8);
        assert_eq!(&regs[..8], "00000000");
        assert_eq!(&regs[abi::SP as usize * 8..][..8], "00010000");
        assert_eq!(&regs[abi::A0 as usize * 8..][..8], "78563412");
        assert_eq!(&regs[32 * 8..], "40000000");
    }

    #[test]
    fn test_write_registers_is_ignored() {
        let mut cpu = test_cpu();
        let out = run_session(&mut cpu, false, &["1".repeat(264).as_str()]);
        assert_eq!(out[1], "");
        let out = run_session(&mut cpu, false, &[format!("G{}", "1".repeat(264)).as_str()]);
        assert_eq!(out[1], "OK");
        assert_eq!(cpu.read_reg(abi::RA), 0);
    }

    #[test]
    fn test_read_memory() {
        let mut cpu = test_cpu();
        cpu.write_mem::<u32>(0x10, 0x0000_0093).unwrap();
        let out = run_session(
            &mut cpu,
            false,
            &["m10,4", "mff,1", "m100,0", "mff,2", "m0", "m,4", "m10,", "mzz,4"],
        );
        assert_eq!(
            &out[1..],
            ["93000000", "00", "", "E03", "E01", "E01", "E01", "E01"]
        );
    }

    #[test]
    fn test_read_memory_reply_is_capped() {
        let mut cpu = test_cpu();
        let out = run_session(&mut cpu, false, &["m0,100", "m0,101"]);
        assert_eq!(out[1].len(), MAX_READ_BYTES.min(MEM_SIZE) * 2);
        assert_eq!(out[2], "E03");

        let mut big = RV32CPU::new(0x1000);
        let out = run_session(&mut big, false, &["m0,1000"]);
        assert_eq!(out[1].len(), MAX_READ_BYTES * 2);
    }

    #[test]
    fn test_write_memory() {
        let mut cpu = test_cpu();
        let out = run_session(&mut cpu, false, &["M20,4:efbeadde", "M24,2:AbCdFF", "m20,6"]);
        assert_eq!(&out[1..], ["OK", "OK", "efbeaddeabcd"]);
        assert_eq!(cpu.read_mem::<u32>(0x20).unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn test_write_memory_errors_leave_memory_untouched() {
        let mut cpu = test_cpu();
        let out = run_session(
            &mut cpu,
            false,
            &["M30,4", "M30,4:0102", "M30,2:01zz", "M,2:0102", "Mff,2:0102", "M30;2:0102"],
        );
        assert_eq!(&out[1..], ["E02", "E02", "E02", "E02", "E03", "E02"]);
        assert!(cpu.view(0, MEM_SIZE).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(
            Command::parse(b"m1f,4"),
            Ok(Command::ReadMemory { addr: 0x1f, len: 4 })
        );
        assert_eq!(
            Command::parse(b"M0,1:aa"),
            Ok(Command::WriteMemory {
                addr: 0,
                len: 1,
                data: b"aa"
            })
        );
        assert_eq!(Command::parse(b"c100"), Ok(Command::Continue));
        assert_eq!(Command::parse(b"m1f"), Err(CommandError::BadReadSyntax));
        assert_eq!(CommandError::BadWriteSyntax.code(), "E02");
        assert_eq!(
            CommandError::OutOfRange { addr: 0, len: 1 }.code(),
            "E03"
        );
    }

    #[test]
    fn test_poll_interrupt() {
        let (channel, client) = simulated_pair();
        let mut stub = GdbStub::new(channel);

        assert!(!stub.poll_interrupt().unwrap());
        client.send_input_data([b'x', INTERRUPT_BYTE]);
        assert!(!stub.poll_interrupt().unwrap());
        assert!(stub.poll_interrupt().unwrap());
    }

    #[test]
    fn test_lost_channel_ends_session() {
        let (channel, client) = simulated_pair();
        let mut stub = GdbStub::new(channel);
        let mut cpu = test_cpu();

        client.send_input_data(*b"+");
        client.send_packet("?");
        drop(client);

        let err = stub.handle_exception(&mut cpu, false).unwrap_err();
        assert!(matches!(err, DebugError::Channel(_)));
    }

    #[test]
    fn test_bad_checksum_is_retried() {
        let (channel, client) = simulated_pair();
        let mut stub = GdbStub::new(channel);
        let mut cpu = test_cpu();

        client.send_input_data(*b"+$?#00");
        client.send_packet("?");
        client.send_input_data(*b"+");
        client.send_packet("c");
        stub.handle_exception(&mut cpu, false).unwrap();

        let out = client.receive_output_data();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("-+$S05#b8"), "{}", text);
    }

    #[test]
    fn test_corrupted_writes_change_nothing() {
        let (channel, client) = simulated_pair();
        let mut stub = GdbStub::new(channel);
        let mut cpu = test_cpu();

        client.send_input_data(*b"+");
        client.send_input_data(*b"$M0,4:deadbeef#00");
        client.send_input_data(format!("$G{}#00", "ab".repeat(33 * 4)).into_bytes());
        client.send_input_data(*b"$P20=efbeadde#00");
        client.send_packet("m0,4");
        client.send_input_data(*b"+");
        client.send_packet("c");
        stub.handle_exception(&mut cpu, false).unwrap();

        let text = String::from_utf8(client.receive_output_data()).unwrap();
        assert!(text.contains("---+$00000000#80"), "{}", text);
        assert_eq!(cpu.read_mem::<u32>(0).unwrap(), 0);
        assert_eq!(cpu.read_pc(), 0x40);
        assert_eq!(cpu.read_reg(abi::SP), 0x100);
        assert_eq!(cpu.read_reg(abi::FP), 0xF0);
    }
}
