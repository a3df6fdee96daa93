use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use binlog::utils::read_null_term_string_with_cursor;
use common::err::decode_error::ReError;
use common::err::CResult;

use crate::declar::capability_flags;

const PROTOCOL_VERSION: u8 = 10;

/// Initial Handshake Packet, protocol version 10.
///
/// ref: https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_connection_phase_packets_protocol_handshake_v10.html
#[derive(Debug, Clone)]
pub struct HandshakePacket {
    pub protocol_version: u8,
    pub server_version: String,
    pub connection_id: u32,
    /// both auth-plugin-data parts, without the trailing NUL
    pub scramble: Vec<u8>,
    pub server_capabilities: u32,
    pub server_collation: u8,
    pub status_flags: u16,
    pub auth_plugin_name: String,
}

impl HandshakePacket {
    pub fn parse(packet: &[u8]) -> CResult<Self> {
        let mut cursor = Cursor::new(packet);

        let protocol_version = cursor.read_u8()?;
        if protocol_version != PROTOCOL_VERSION {
            return Err(ReError::ProtocolVersionMismatch(format!(
                "handshake protocol version {}, expected {}",
                protocol_version, PROTOCOL_VERSION
            )));
        }
        let server_version = read_null_term_string_with_cursor(&mut cursor)?;
        let connection_id = cursor.read_u32::<LittleEndian>()?;

        let mut scramble = vec![0u8; 8];
        cursor.read_exact(&mut scramble)?;
        let _filler = cursor.read_u8()?;

        let capabilities_low = cursor.read_u16::<LittleEndian>()? as u32;
        let server_collation = cursor.read_u8()?;
        let status_flags = cursor.read_u16::<LittleEndian>()?;
        let capabilities_high = cursor.read_u16::<LittleEndian>()? as u32;
        let server_capabilities = capabilities_low | (capabilities_high << 16);

        let auth_plugin_data_len = cursor.read_u8()? as usize;
        let mut reserved = [0u8; 10];
        cursor.read_exact(&mut reserved)?;

        if server_capabilities & capability_flags::CLIENT_SECURE_CONNECTION != 0 {
            let len = std::cmp::max(13, auth_plugin_data_len.saturating_sub(8));
            let mut part2 = vec![0u8; len];
            cursor.read_exact(&mut part2)?;
            if part2.last() == Some(&0) {
                part2.pop();
            }
            scramble.extend_from_slice(&part2);
        }

        let mut auth_plugin_name = String::new();
        if server_capabilities & capability_flags::CLIENT_PLUGIN_AUTH != 0 {
            // some servers omit the final NUL
            let rest = &packet[cursor.position() as usize..];
            let end = rest.iter().position(|b| *b == 0).unwrap_or(rest.len());
            auth_plugin_name = String::from_utf8_lossy(&rest[..end]).to_string();
        }

        Ok(Self {
            protocol_version,
            server_version,
            connection_id,
            scramble,
            server_capabilities,
            server_collation,
            status_flags,
            auth_plugin_name,
        })
    }
}
