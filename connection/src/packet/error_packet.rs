use std::fmt;
use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use common::err::CResult;

/// ERR packet without its 0xFF header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPacket {
    pub error_code: u16,
    pub sql_state: String,
    pub error_message: String,
}

impl ErrorPacket {
    pub fn parse(packet: &[u8]) -> CResult<Self> {
        let mut cursor = Cursor::new(packet);

        let error_code = cursor.read_u16::<LittleEndian>()?;

        let mut sql_state = String::new();
        if packet.get(2) == Some(&b'#') && packet.len() >= 8 {
            cursor.set_position(3);
            let mut state = [0u8; 5];
            cursor.read_exact(&mut state)?;
            sql_state = String::from_utf8_lossy(&state).to_string();
        }

        let rest = &packet[cursor.position() as usize..];
        let error_message = String::from_utf8_lossy(rest).to_string();

        Ok(Self {
            error_code,
            sql_state,
            error_message,
        })
    }
}

impl fmt::Display for ErrorPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sql_state.is_empty() {
            write!(f, "ERROR {}: {}", self.error_code, self.error_message)
        } else {
            write!(f, "ERROR {} ({}): {}", self.error_code, self.sql_state, self.error_message)
        }
    }
}
