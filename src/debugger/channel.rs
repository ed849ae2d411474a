use std::io;

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};

/// Byte transport between the stub and a remote debugger.
pub trait DebugChannel {
    /// Block until a byte arrives.
    fn get_char(&mut self) -> io::Result<u8>;

    /// Return a byte if one is already waiting.
    fn poll_char(&mut self) -> io::Result<Option<u8>>;

    fn put_char(&mut self, ch: u8) -> io::Result<()>;

    /// Push buffered output to the peer. Called once per outbound packet.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<C: DebugChannel + ?Sized> DebugChannel for Box<C> {
    fn get_char(&mut self) -> io::Result<u8> {
        (**self).get_char()
    }

    fn poll_char(&mut self) -> io::Result<Option<u8>> {
        (**self).poll_char()
    }

    fn put_char(&mut self, ch: u8) -> io::Result<()> {
        (**self).put_char(ch)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

fn disconnected() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "debug peer disconnected")
}

/// # SimulatedChannel
/// In-memory channel end held by the stub. Mainly used for tests and embedding.
pub struct SimulatedChannel {
    input_rx: Receiver<u8>,
    output_tx: Sender<u8>,
}

/// The debugger side of a [`SimulatedChannel`].
pub struct SimulatedClient {
    input_tx: Sender<u8>,
    output_rx: Receiver<u8>,
}

/// Create a connected stub/client pair.
pub fn simulated_pair() -> (SimulatedChannel, SimulatedClient) {
    let (input_tx, input_rx) = channel::unbounded();
    let (output_tx, output_rx) = channel::unbounded();
    (
        SimulatedChannel {
            input_rx,
            output_tx,
        },
        SimulatedClient {
            input_tx,
            output_rx,
        },
    )
}

impl DebugChannel for SimulatedChannel {
    fn get_char(&mut self) -> io::Result<u8> {
        self.input_rx.recv().map_err(|_| disconnected())
    }

    fn poll_char(&mut self) -> io::Result<Option<u8>> {
        match self.input_rx.try_recv() {
            Ok(ch) => Ok(Some(ch)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(disconnected()),
        }
    }

    fn put_char(&mut self, ch: u8) -> io::Result<()> {
        self.output_tx.send(ch).map_err(|_| disconnected())
    }
}

impl SimulatedClient {
    pub fn send_input_data<T>(&self, data: T)
    where
        T: IntoIterator<Item = u8>,
    {
        for byte in data.into_iter() {
            let _ = self.input_tx.send(byte);
        }
    }

    /// Frame `payload` as `$payload#hh` and queue it.
    pub fn send_packet(&self, payload: &str) {
        self.send_input_data(super::packet::frame(payload.as_bytes()));
    }

    /// Everything the stub has written so far.
    pub fn receive_output_data(&self) -> Vec<u8> {
        let mut datas = Vec::new();
        while let Ok(data) = self.output_rx.try_recv() {
            datas.push(data);
        }
        datas
    }

    /// Block for the next byte written by the stub, `None` once the stub side is gone.
    pub fn recv_byte(&self) -> Option<u8> {
        self.output_rx.recv().ok()
    }

    /// Block for the next well-formed packet and return its payload. Acknowledges it with `+`.
    pub fn recv_packet(&self) -> Option<String> {
        loop {
            while self.recv_byte()? != b'$' {}
            let mut payload = Vec::new();
            loop {
                match self.recv_byte()? {
                    b'#' => break,
                    ch => payload.push(ch),
                }
            }
            let hi = crate::utils::hex_value(self.recv_byte()?);
            let lo = crate::utils::hex_value(self.recv_byte()?);
            let received = match (hi, lo) {
                (Some(hi), Some(lo)) => Some((hi << 4) | lo),
                _ => None,
            };
            if received == Some(super::packet::checksum(&payload)) {
                let _ = self.input_tx.send(b'+');
                return String::from_utf8(payload).ok();
            }
            let _ = self.input_tx.send(b'-');
        }
    }

    /// Close the client side. The stub sees a broken channel on its next read.
    pub fn disconnect(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_pair_bytes() {
        let (mut stub, client) = simulated_pair();
        assert_eq!(stub.poll_char().unwrap(), None);

        client.send_input_data(*b"ab");
        assert_eq!(stub.poll_char().unwrap(), Some(b'a'));
        assert_eq!(stub.get_char().unwrap(), b'b');

        stub.put_char(b'x').unwrap();
        stub.put_char(b'y').unwrap();
        assert_eq!(client.receive_output_data(), b"xy");
    }

    #[test]
    fn test_disconnect_is_an_error() {
        let (mut stub, client) = simulated_pair();
        client.disconnect();
        assert_eq!(
            stub.get_char().unwrap_err().kind(),
            io::ErrorKind::BrokenPipe
        );
        assert!(stub.poll_char().is_err());
        assert!(stub.put_char(b'+').is_err());
    }

    #[test]
    fn test_client_acks_good_packet() {
        let (mut stub, client) = simulated_pair();
        for &b in b"junk$OK#9a" {
            stub.put_char(b).unwrap();
        }
        assert_eq!(client.recv_packet().as_deref(), Some("OK"));
        assert_eq!(stub.get_char().unwrap(), b'+');
    }
}
