use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use binlog::utils::read_len_enc_num;
use common::err::decode_error::ReError;
use common::err::CResult;

use crate::declar::status_flags::StatusFlags;
use crate::packet::response_type::ResponseType;

/// Reply to a statement without a result set.
///
/// Servers before 4.1 stop after the insert id, so every later field is optional.
#[derive(Debug, Default)]
pub struct OkPacket {
    pub affected_rows: u64,
    pub last_insert_id: u64,
    pub status: StatusFlags,
    pub warnings: u16,
    pub info: String,
}

impl OkPacket {
    pub fn parse(packet: &[u8]) -> CResult<Self> {
        if packet.first() != Some(&ResponseType::OK) {
            return Err(ReError::ConnectionError(String::from("not an OK packet")));
        }

        let mut ok = OkPacket::default();
        let mut cursor = Cursor::new(&packet[1..]);
        let left = |c: &Cursor<&[u8]>| c.get_ref().len() - c.position() as usize;

        if left(&cursor) > 0 {
            ok.affected_rows = read_len_enc_num(&mut cursor)?.1;
        }
        if left(&cursor) > 0 {
            ok.last_insert_id = read_len_enc_num(&mut cursor)?.1;
        }
        if left(&cursor) >= 4 {
            ok.status = StatusFlags::from_bits_retain(cursor.read_u16::<LittleEndian>()?);
            ok.warnings = cursor.read_u16::<LittleEndian>()?;
        }

        let rest = &cursor.get_ref()[cursor.position() as usize..];
        ok.info = String::from_utf8_lossy(rest).to_string();
        Ok(ok)
    }
}
