//! `$payload#hh` framing of the remote serial protocol.

use std::{io, ops::Range};

use crate::{
    config::stub_config::BUFMAX,
    debugger::channel::DebugChannel,
    utils::{HEX_CHARS, hex_value},
};

/// Byte sum modulo 256.
pub fn checksum(payload: &[u8]) -> u8 {
    payload.iter().fold(0u8, |sum, &ch| sum.wrapping_add(ch))
}

/// Frame a payload for the wire.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let sum = checksum(payload);
    let mut out = Vec::with_capacity(payload.len() + 4);
    out.push(b'$');
    out.extend_from_slice(payload);
    out.push(b'#');
    out.push(HEX_CHARS[(sum >> 4) as usize]);
    out.push(HEX_CHARS[(sum & 0xf) as usize]);
    out
}

/// Receive the next packet with a valid checksum into `buf`.
///
/// Returns the payload range inside `buf`, sequence id stripped. Bytes beyond
/// `BUFMAX - 1` are dropped from the payload but still count towards the checksum.
pub fn read_packet<C>(channel: &mut C, buf: &mut [u8; BUFMAX]) -> io::Result<Range<usize>>
where
    C: DebugChannel + ?Sized,
{
    'packet: loop {
        while channel.get_char()? != b'$' {}

        'body: loop {
            let mut count = 0;
            let mut sum = 0u8;
            loop {
                match channel.get_char()? {
                    b'$' => continue 'body,
                    b'#' => break,
                    ch => {
                        sum = sum.wrapping_add(ch);
                        if count < BUFMAX - 1 {
                            buf[count] = ch;
                            count += 1;
                        }
                    }
                }
            }

            let hi = hex_value(channel.get_char()?);
            let lo = hex_value(channel.get_char()?);
            let expected = match (hi, lo) {
                (Some(hi), Some(lo)) => Some((hi << 4) | lo),
                _ => None,
            };

            if expected != Some(sum) {
                log::warn!(
                    "gdb packet checksum mismatch: computed {:#04x}, got {:?}",
                    sum,
                    expected
                );
                channel.put_char(b'-')?;
                channel.flush()?;
                continue 'packet;
            }

            channel.put_char(b'+')?;
            let payload = if count >= 3 && buf[2] == b':' {
                channel.put_char(buf[0])?;
                channel.put_char(buf[1])?;
                3..count
            } else {
                0..count
            };
            channel.flush()?;

            log::debug!(
                "gdb <- {}",
                String::from_utf8_lossy(&buf[payload.clone()])
            );
            return Ok(payload);
        }
    }
}

/// Send `payload`, retransmitting until the peer answers `+`.
pub fn write_packet<C>(channel: &mut C, payload: &[u8]) -> io::Result<()>
where
    C: DebugChannel + ?Sized,
{
    log::debug!("gdb -> {}", String::from_utf8_lossy(payload));
    let framed = frame(payload);
    loop {
        for &ch in &framed {
            channel.put_char(ch)?;
        }
        channel.flush()?;

        if channel.get_char()? == b'+' {
            return Ok(());
        }
    }
}

/// Fixed-capacity outbound payload. Anything past `BUFMAX - 1` bytes is dropped.
pub struct PacketBuffer {
    data: [u8; BUFMAX],
    len: usize,
}

impl Default for PacketBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketBuffer {
    pub const CAPACITY: usize = BUFMAX - 1;

    pub fn new() -> Self {
        Self {
            data: [0; BUFMAX],
            len: 0,
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn push(&mut self, ch: u8) {
        if self.len < Self::CAPACITY {
            self.data[self.len] = ch;
            self.len += 1;
        }
    }

    pub fn push_str(&mut self, s: &str) {
        s.bytes().for_each(|ch| self.push(ch));
    }

    /// Two lowercase hex digits per byte, high nibble first.
    pub fn push_hex(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(HEX_CHARS[(byte >> 4) as usize]);
            self.push(HEX_CHARS[(byte & 0xf) as usize]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugger::channel::simulated_pair;

    fn read_one(input: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let (mut stub, client) = simulated_pair();
        client.send_input_data(input.iter().copied());
        let mut buf = [0u8; BUFMAX];
        let range = read_packet(&mut stub, &mut buf).unwrap();
        (buf[range].to_vec(), client.receive_output_data())
    }

    #[test]
    fn test_checksum_and_frame() {
        assert_eq!(checksum(b""), 0);
        assert_eq!(checksum(b"OK"), 0x9a);
        assert_eq!(checksum(&[0xff, 0x02]), 0x01);
        assert_eq!(frame(b"S05"), b"$S05#b8");
    }

    #[test]
    fn test_read_plain_packet() {
        let (payload, out) = read_one(b"$?#3f");
        assert_eq!(payload, b"?");
        assert_eq!(out, b"+");
    }

    #[test]
    fn test_read_skips_leading_noise() {
        let (payload, out) = read_one(b"+\x03xx$g#67");
        assert_eq!(payload, b"g");
        assert_eq!(out, b"+");
    }

    #[test]
    fn test_checksum_mismatch_is_nacked() {
        let (payload, out) = read_one(b"$?#00$?#3F");
        assert_eq!(payload, b"?");
        assert_eq!(out, b"-+");
    }

    #[test]
    fn test_non_hex_checksum_is_nacked() {
        let (_, out) = read_one(b"$?#zz$?#3f");
        assert_eq!(out, b"-+");
    }

    #[test]
    fn test_dollar_restarts_packet() {
        let (payload, out) = read_one(b"$abc$?#3f");
        assert_eq!(payload, b"?");
        assert_eq!(out, b"+");
    }

    #[test]
    fn test_sequence_id_is_echoed_and_stripped() {
        let (payload, out) = read_one(&frame(b"1f:m0,4"));
        assert_eq!(payload, b"m0,4");
        assert_eq!(out, b"+1f");
    }

    #[test]
    fn test_oversized_payload_is_truncated() {
        let long = vec![b'a'; BUFMAX + 100];
        let (payload, out) = read_one(&frame(&long));
        assert_eq!(payload.len(), BUFMAX - 1);
        assert_eq!(out, b"+");
    }

    #[test]
    fn test_write_retransmits_until_ack() {
        let (mut stub, client) = simulated_pair();
        client.send_input_data(*b"-x+");
        write_packet(&mut stub, b"OK").unwrap();
        assert_eq!(client.receive_output_data(), b"$OK#9a$OK#9a$OK#9a");
    }

    #[test]
    fn test_packet_buffer_caps_at_capacity() {
        let mut out = PacketBuffer::new();
        out.push_hex(&[0xde, 0xad]);
        assert_eq!(out.as_slice(), b"dead");

        out.clear();
        assert!(out.is_empty());
        for _ in 0..BUFMAX {
            out.push(b'0');
        }
        assert_eq!(out.len(), PacketBuffer::CAPACITY);
    }
}
