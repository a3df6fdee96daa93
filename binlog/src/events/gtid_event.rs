use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use common::err::decode_error::ReError;
use common::err::CResult;

use crate::events::event_header::BasicEventInfo;
use crate::events::{GTID_EVENT_LEN, LOG_EVENT_HEADER_LEN};

const ENCODED_FLAG_LENGTH: usize = 1;
const ENCODED_SID_LENGTH: usize = 16;

/// GTID_LOG_EVENT: commit flag(1) source uuid(16) transaction number(8)
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct GtidEvent {
    pub flags: u8,
    /// 32 lowercase hex digits, no hyphens
    pub sid: String,
    pub gno: i64,
}

impl GtidEvent {
    pub fn parse(info: &BasicEventInfo) -> CResult<GtidEvent> {
        let min_len = LOG_EVENT_HEADER_LEN + GTID_EVENT_LEN;
        if (info.event_len as usize) < min_len {
            return Err(ReError::CorruptEvent(format!(
                "gtid event of {} bytes, needs {}",
                info.event_len, min_len
            )));
        }

        let body = info.body();
        let sid = hex::encode(&body[ENCODED_FLAG_LENGTH..ENCODED_FLAG_LENGTH + ENCODED_SID_LENGTH]);
        let gno = LittleEndian::read_i64(&body[ENCODED_FLAG_LENGTH + ENCODED_SID_LENGTH..]);

        Ok(GtidEvent {
            flags: body[0],
            sid,
            gno,
        })
    }
}
