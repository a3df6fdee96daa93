use std::io;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use native_tls::TlsStream;
use tracing::debug;

use common::err::decode_error::ReError;
use common::err::CResult;

use crate::conn::connection_options::ConnectionOptions;
use crate::{MAX_BODY_LENGTH, PACKET_HEADER_SIZE};

/// MySQL packet framing over TCP or TLS: 3 byte length, 1 byte sequence, payload.
#[derive(Debug)]
pub struct PacketChannel {
    stream: ChannelStream,
}

impl PacketChannel {
    pub fn new(options: &ConnectionOptions) -> CResult<Self> {
        let address = options.address();
        let mut last_err = None;

        for addr in address.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, options.connect_timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(non_zero(options.read_timeout))?;
                    stream.set_write_timeout(non_zero(options.write_timeout))?;
                    stream.set_nodelay(true)?;
                    debug!("connected to {}", addr);
                    return Ok(Self::from_tcp(stream));
                }
                Err(err) => last_err = Some(err),
            }
        }

        Err(match last_err {
            Some(err) => ReError::IoError(err),
            None => ReError::ConnectionError(format!("{} resolves to no address", address)),
        })
    }

    pub fn from_tcp(stream: TcpStream) -> Self {
        Self {
            stream: ChannelStream::Plain(stream),
        }
    }

    pub fn is_ssl(&self) -> bool {
        matches!(self.stream, ChannelStream::Secure(_))
    }

    pub fn set_read_timeout(&self, timeout: Duration) -> CResult<()> {
        self.stream.tcp().set_read_timeout(non_zero(timeout))?;
        Ok(())
    }

    /// A second handle on the socket. Shutting it down makes a blocked read return.
    pub fn try_clone_tcp(&self) -> CResult<TcpStream> {
        Ok(self.stream.tcp().try_clone()?)
    }

    /// One logical packet. Payloads of 16M - 1 bytes continue in the next frame.
    pub fn read_packet(&mut self) -> CResult<(Vec<u8>, u8)> {
        let mut packet = Vec::new();
        loop {
            let mut header_buffer = [0; PACKET_HEADER_SIZE];
            self.stream.read_exact(&mut header_buffer)?;
            let packet_size = (&header_buffer[0..3]).read_u24::<LittleEndian>()? as usize;
            let seq_num = header_buffer[3];

            let start = packet.len();
            packet.resize(start + packet_size, 0);
            self.stream.read_exact(&mut packet[start..])?;

            if packet_size < MAX_BODY_LENGTH {
                return Ok((packet, seq_num));
            }
        }
    }

    pub fn write_packet(&mut self, packet: &[u8], mut seq_num: u8) -> CResult<()> {
        let mut chunks = packet.chunks(MAX_BODY_LENGTH).peekable();
        if chunks.peek().is_none() {
            self.write_frame(&[], seq_num)?;
        }
        let mut last_len = 0;
        for chunk in chunks {
            self.write_frame(chunk, seq_num)?;
            seq_num = seq_num.wrapping_add(1);
            last_len = chunk.len();
        }
        if last_len == MAX_BODY_LENGTH {
            self.write_frame(&[], seq_num)?;
        }
        self.stream.flush()?;
        Ok(())
    }

    fn write_frame(&mut self, payload: &[u8], seq_num: u8) -> CResult<()> {
        self.stream.write_u24::<LittleEndian>(payload.len() as u32)?;
        self.stream.write_u8(seq_num)?;
        self.stream.write_all(payload)?;
        Ok(())
    }

    /// TLS over the current socket, after the SSLRequest has been sent.
    pub fn upgrade_to_ssl(self, options: &ConnectionOptions) -> CResult<Self> {
        let connector = match &options.ssl_opts {
            Some(ssl_opts) => ssl_opts.connector()?,
            None => return Err(ReError::ConfigurationError(String::from("TLS requested without ssl options"))),
        };

        match self.stream {
            ChannelStream::Plain(tcp) => {
                let tls = connector
                    .connect(&options.hostname, tcp)
                    .map_err(|e| ReError::ConnectionError(format!("TLS handshake with {} failed: {}", options.address(), e)))?;
                debug!("connection to {} upgraded to TLS", options.address());
                Ok(PacketChannel {
                    stream: ChannelStream::Secure(Box::new(tls)),
                })
            }
            ChannelStream::Secure(_) => Ok(self),
        }
    }

    pub fn shutdown(&mut self) -> CResult<()> {
        self.stream.shutdown()?;
        Ok(())
    }
}

fn non_zero(timeout: Duration) -> Option<Duration> {
    if timeout.is_zero() {
        None
    } else {
        Some(timeout)
    }
}

trait Socket: Read + Write {}

impl<T: Read + Write> Socket for T {}

#[derive(Debug)]
enum ChannelStream {
    Plain(TcpStream),
    Secure(Box<TlsStream<TcpStream>>),
}

impl ChannelStream {
    fn tcp(&self) -> &TcpStream {
        match self {
            ChannelStream::Plain(stream) => stream,
            ChannelStream::Secure(stream) => stream.get_ref(),
        }
    }

    fn socket(&mut self) -> &mut dyn Socket {
        match self {
            ChannelStream::Plain(stream) => stream,
            ChannelStream::Secure(stream) => stream.as_mut(),
        }
    }

    fn shutdown(&mut self) -> io::Result<()> {
        match self {
            ChannelStream::Plain(stream) => stream.shutdown(Shutdown::Both),
            ChannelStream::Secure(stream) => stream.shutdown(),
        }
    }
}

impl Write for ChannelStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.socket().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.socket().flush()
    }
}

impl Read for ChannelStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.socket().read(buf)
    }
}
