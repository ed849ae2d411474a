use std::{
    io::{self, BufWriter, Read, Write},
    net::{TcpListener, TcpStream, ToSocketAddrs},
    thread,
};

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};

use crate::debugger::channel::DebugChannel;

/// A debugger connected over TCP.
///
/// A reader thread drains the socket into a channel so that polling for the attention
/// byte does not touch the socket.
pub struct TcpChannel {
    input_rx: Receiver<u8>,
    writer: BufWriter<TcpStream>,
}

fn pump(mut stream: TcpStream, sender: Sender<u8>) {
    let mut buf = [0u8; 256];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                for &byte in &buf[..n] {
                    if sender.send(byte).is_err() {
                        return;
                    }
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                log::warn!("debugger connection read failed: {}", err);
                break;
            }
        }
    }
    log::info!("debugger connection closed");
}

impl TcpChannel {
    /// Listen on `addr` and block until one debugger connects.
    pub fn accept<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        log::info!("waiting for a debugger on {}", listener.local_addr()?);
        let (stream, _) = listener.accept()?;
        Self::from_stream(stream)
    }

    pub fn from_stream(stream: TcpStream) -> io::Result<Self> {
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        let reader = stream.try_clone()?;

        let (sender, input_rx) = channel::unbounded();
        thread::Builder::new()
            .name("gdb-reader".into())
            .spawn(move || pump(reader, sender))?;

        log::info!("debugger connected from {}", peer);
        Ok(Self {
            input_rx,
            writer: BufWriter::new(stream),
        })
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::ConnectionAborted, "debugger connection closed")
}

impl DebugChannel for TcpChannel {
    fn get_char(&mut self) -> io::Result<u8> {
        self.input_rx.recv().map_err(|_| closed())
    }

    fn poll_char(&mut self) -> io::Result<Option<u8>> {
        match self.input_rx.try_recv() {
            Ok(ch) => Ok(Some(ch)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(closed()),
        }
    }

    fn put_char(&mut self, ch: u8) -> io::Result<()> {
        self.writer.write_all(&[ch])
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
