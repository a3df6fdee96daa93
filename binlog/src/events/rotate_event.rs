use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use common::err::decode_error::ReError;
use common::err::CResult;

use crate::events::event_header::BasicEventInfo;
use crate::events::{LOG_EVENT_HEADER_LEN, ROTATE_HEADER_LEN};

/// Binlog switch: position(8) + new log file name (rest of the event, no terminator)
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct RotateEvent {
    pub position: u64,
    pub next_binlog: String,
}

impl RotateEvent {
    pub fn parse(info: &BasicEventInfo) -> CResult<RotateEvent> {
        let min_len = LOG_EVENT_HEADER_LEN + ROTATE_HEADER_LEN;
        if (info.event_len as usize) < min_len {
            return Err(ReError::CorruptEvent(format!(
                "rotate event of {} bytes, needs {}",
                info.event_len, min_len
            )));
        }

        let body = info.body();
        let position = LittleEndian::read_u64(&body[0..ROTATE_HEADER_LEN]);
        let next_binlog = String::from_utf8_lossy(&body[ROTATE_HEADER_LEN..]).to_string();

        Ok(RotateEvent {
            position,
            next_binlog,
        })
    }
}
