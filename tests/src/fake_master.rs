use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use connection::declar::capability_flags::CLIENT_BASIC_FLAGS;

use crate::event_builder::packet;

const OK: [u8; 7] = [0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00];
const EOF: [u8; 5] = [0xFE, 0x00, 0x00, 0x02, 0x00];

/// What the master does on one connection after the dump request.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub events: Vec<Vec<u8>>,
    /// drop the connection once the events are sent
    pub close_after: bool,
}

/// Speaks just enough of the server protocol for a replica:
/// handshake, COM_REGISTER_SLAVE, the checksum queries and the dump.
pub struct FakeMaster {
    listener: TcpListener,
}

impl FakeMaster {
    pub fn bind() -> io::Result<FakeMaster> {
        Ok(FakeMaster {
            listener: TcpListener::bind("127.0.0.1:0")?,
        })
    }

    pub fn port(&self) -> io::Result<u16> {
        Ok(self.listener.local_addr()?.port())
    }

    /// Serves one connection per session in order. Yields the dump requests received.
    pub fn serve(self, sessions: Vec<Session>) -> JoinHandle<Vec<Vec<u8>>> {
        thread::spawn(move || {
            let mut dumps = Vec::new();
            for session in &sessions {
                let stream = match self.listener.accept() {
                    Ok((stream, _)) => stream,
                    Err(_) => break,
                };
                let _ = serve_one(stream, session, &mut dumps);
            }
            dumps
        })
    }
}

fn serve_one(stream: TcpStream, session: &Session, dumps: &mut Vec<Vec<u8>>) -> io::Result<()> {
    let mut wire = Wire { stream };
    wire.write(0, &handshake())?;
    let (_auth, seq) = wire.read()?;
    wire.write(seq.wrapping_add(1), &OK)?;

    loop {
        let (command, _) = match wire.read() {
            Ok(p) => p,
            Err(_) => return Ok(()),
        };
        match command.first() {
            // COM_REGISTER_SLAVE
            Some(0x15) => wire.write(1, &OK)?,
            // COM_QUERY
            Some(0x03) => {
                let sql = String::from_utf8_lossy(&command[1..]).to_string();
                if sql.starts_with("SET ") {
                    wire.write(1, &OK)?;
                } else if sql == "SELECT @master_binlog_checksum" {
                    wire.write_result_set("@master_binlog_checksum", "CRC32")?;
                } else {
                    wire.write(1, &error_packet(1064, &format!("unexpected statement: {}", sql)))?;
                }
            }
            // COM_BINLOG_DUMP, COM_BINLOG_DUMP_GTID
            Some(0x12) | Some(0x1e) => {
                dumps.push(command.clone());
                let mut seq = 1u8;
                for event in &session.events {
                    wire.write(seq, &packet(event))?;
                    seq = seq.wrapping_add(1);
                }
                if session.close_after {
                    return Ok(());
                }
            }
            // COM_QUIT and anything else ends the session
            _ => return Ok(()),
        }
    }
}

/// Binlog offset of a COM_BINLOG_DUMP request.
pub fn dump_position(dump: &[u8]) -> u32 {
    (&dump[1..5]).read_u32::<LittleEndian>().unwrap_or_default()
}

/// File name of a COM_BINLOG_DUMP request.
pub fn dump_file(dump: &[u8]) -> String {
    String::from_utf8_lossy(&dump[11..]).to_string()
}

fn handshake() -> Vec<u8> {
    let caps = CLIENT_BASIC_FLAGS;
    let mut p = vec![10u8];
    p.extend_from_slice(b"5.7.44-log\0");
    p.extend_from_slice(&7u32.to_le_bytes());
    p.extend_from_slice(b"abcdefgh");
    p.push(0);
    p.extend_from_slice(&((caps & 0xFFFF) as u16).to_le_bytes());
    p.push(45);
    p.extend_from_slice(&2u16.to_le_bytes());
    p.extend_from_slice(&((caps >> 16) as u16).to_le_bytes());
    p.push(21);
    p.extend_from_slice(&[0u8; 10]);
    p.extend_from_slice(b"ijklmnopqrst\0");
    p.extend_from_slice(b"mysql_native_password\0");
    p
}

fn error_packet(code: u16, message: &str) -> Vec<u8> {
    let mut p = vec![0xFF];
    p.extend_from_slice(&code.to_le_bytes());
    p.extend_from_slice(b"#42000");
    p.extend_from_slice(message.as_bytes());
    p
}

fn len_enc_str(buf: &mut Vec<u8>, s: &str) {
    buf.push(s.len() as u8);
    buf.extend_from_slice(s.as_bytes());
}

struct Wire {
    stream: TcpStream,
}

impl Wire {
    fn read(&mut self) -> io::Result<(Vec<u8>, u8)> {
        let len = self.stream.read_u24::<LittleEndian>()? as usize;
        let seq = self.stream.read_u8()?;
        let mut payload = vec![0u8; len];
        self.stream.read_exact(&mut payload)?;
        Ok((payload, seq))
    }

    fn write(&mut self, seq: u8, payload: &[u8]) -> io::Result<()> {
        self.stream.write_u24::<LittleEndian>(payload.len() as u32)?;
        self.stream.write_u8(seq)?;
        self.stream.write_all(payload)?;
        self.stream.flush()
    }

    /// One VAR_STRING column, one row, EOF framed.
    fn write_result_set(&mut self, column: &str, value: &str) -> io::Result<()> {
        self.write(1, &[1])?;

        let mut def = Vec::new();
        for s in ["def", "", "", "", column, column] {
            len_enc_str(&mut def, s);
        }
        def.push(0x0c);
        def.extend_from_slice(&45u16.to_le_bytes());
        def.extend_from_slice(&64u32.to_le_bytes());
        def.push(0xFD);
        def.extend_from_slice(&0u16.to_le_bytes());
        def.push(0);
        def.extend_from_slice(&[0, 0]);
        self.write(2, &def)?;
        self.write(3, &EOF)?;

        let mut row = Vec::new();
        len_enc_str(&mut row, value);
        self.write(4, &row)?;
        self.write(5, &EOF)
    }
}
