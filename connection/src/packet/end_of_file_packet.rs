use common::err::decode_error::ReError;
use common::err::CResult;

use crate::declar::status_flags::StatusFlags;
use crate::packet::response_type::ResponseType;

/// EOF_Packet closing the column definitions and the rows of a result set.
#[derive(Debug)]
pub struct EndOfFilePacket {
    pub warnings: u16,
    pub status: StatusFlags,
}

impl EndOfFilePacket {
    pub fn parse(packet: &[u8]) -> CResult<Self> {
        if !EndOfFilePacket::is_eof(packet) || packet.len() < 5 {
            return Err(ReError::ConnectionError(String::from("not an EOF packet")));
        }
        Ok(EndOfFilePacket {
            warnings: u16::from_le_bytes([packet[1], packet[2]]),
            status: StatusFlags::from_bits_retain(u16::from_le_bytes([packet[3], packet[4]])),
        })
    }

    /// A row or a binlog event may also start with 0xFE, an EOF packet is always short.
    pub fn is_eof(packet: &[u8]) -> bool {
        packet.first() == Some(&ResponseType::END_OF_FILE) && packet.len() < 9
    }
}
