use byteorder::{ByteOrder, LittleEndian};
use tracing::error;

use common::err::decode_error::ReError;
use common::err::CResult;

use crate::events::event_type::{LogEventType, LOG_EVENT_TYPES};
use crate::events::{
    LOG_EVENT_HEADER_LEN, QUERY_HEADER_LEN, ROTATE_HEADER_LEN, ROWS_HEADER_LEN_V1,
    ROWS_HEADER_LEN_V2, START_V3_HEADER_LEN, ST_COMMON_HEADER_LEN_OFFSET, TABLE_MAP_HEADER_LEN,
    XID_HEADER_LEN,
};

pub const BINLOG_VERSION: u16 = 4;

/// FORMAT_DESCRIPTION_EVENT body: binlog version(2) server version(50) create time(4)
/// common header length(1) then one post-header length per event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDescription<'a> {
    pub binlog_version: u16,
    pub server_version: String,
    pub common_header_len: u8,
    /// post-header lengths indexed by `type - 1`
    pub post_header_lens: &'a [u8],
}

impl<'a> FormatDescription<'a> {
    /// `event_len` must already exclude the checksum descriptor and trailer.
    pub fn parse(buf: &'a [u8], event_len: usize) -> CResult<FormatDescription<'a>> {
        let min_len = LOG_EVENT_HEADER_LEN + ST_COMMON_HEADER_LEN_OFFSET + 1;
        if event_len < min_len || buf.len() < event_len {
            return Err(ReError::TruncatedEvent(format!(
                "format description event of {} bytes, needs {}",
                event_len, min_len
            )));
        }

        let body = &buf[LOG_EVENT_HEADER_LEN..event_len];
        let binlog_version = LittleEndian::read_u16(&body[0..2]);
        let server_version = crate::utils::read_null_term_string(&body[2..START_V3_HEADER_LEN - 4])
            .map(|(_, s)| s)
            .unwrap_or_else(|_| String::from_utf8_lossy(&body[2..START_V3_HEADER_LEN - 4]).to_string());

        Ok(FormatDescription {
            binlog_version,
            server_version,
            common_header_len: body[ST_COMMON_HEADER_LEN_OFFSET],
            post_header_lens: &body[ST_COMMON_HEADER_LEN_OFFSET + 1..],
        })
    }

    pub fn number_of_event_types(&self) -> usize {
        self.post_header_lens.len()
    }

    pub fn post_header_len(&self, event_type: LogEventType) -> Option<u8> {
        let code: u8 = event_type.into();
        if code == 0 {
            return None;
        }
        self.post_header_lens.get(code as usize - 1).copied()
    }

    /// Cross-checks the declared layout against the post-header sizes this reader decodes with.
    pub fn check(&self, master_ge_56: bool) -> CResult<()> {
        if self.binlog_version != BINLOG_VERSION {
            error!("Invalid binlog version: {} != {}", self.binlog_version, BINLOG_VERSION);
            return Err(ReError::ProtocolVersionMismatch(format!(
                "binlog version {} != {}",
                self.binlog_version, BINLOG_VERSION
            )));
        }

        if self.common_header_len as usize != LOG_EVENT_HEADER_LEN {
            error!(
                "Invalid Format_description event: common_header_len {} != {}",
                self.common_header_len, LOG_EVENT_HEADER_LEN
            );
            return Err(ReError::ProtocolVersionMismatch(format!(
                "common header length {} != {}",
                self.common_header_len, LOG_EVENT_HEADER_LEN
            )));
        }

        let n = self.number_of_event_types();
        if n > LOG_EVENT_TYPES {
            error!("Invalid Format_description event: number_of_event_types {} > {}", n, LOG_EVENT_TYPES);
            return Err(ReError::ProtocolVersionMismatch(format!(
                "{} event types declared, {} known",
                n, LOG_EVENT_TYPES
            )));
        }

        let mut expected = vec![
            (LogEventType::XID_EVENT, XID_HEADER_LEN),
            (LogEventType::QUERY_EVENT, QUERY_HEADER_LEN),
            (LogEventType::ROTATE_EVENT, ROTATE_HEADER_LEN),
            (LogEventType::FORMAT_DESCRIPTION_EVENT, START_V3_HEADER_LEN + 1 + n),
            (LogEventType::TABLE_MAP_EVENT, TABLE_MAP_HEADER_LEN),
            (LogEventType::WRITE_ROWS_EVENT_V1, ROWS_HEADER_LEN_V1),
            (LogEventType::UPDATE_ROWS_EVENT_V1, ROWS_HEADER_LEN_V1),
            (LogEventType::DELETE_ROWS_EVENT_V1, ROWS_HEADER_LEN_V1),
        ];
        if master_ge_56 {
            expected.push((LogEventType::WRITE_ROWS_EVENT, ROWS_HEADER_LEN_V2));
            expected.push((LogEventType::UPDATE_ROWS_EVENT, ROWS_HEADER_LEN_V2));
            expected.push((LogEventType::DELETE_ROWS_EVENT, ROWS_HEADER_LEN_V2));
        }

        for (event_type, len) in expected {
            // older masters describe fewer types
            let declared = match self.post_header_len(event_type) {
                Some(l) => l,
                None => continue,
            };
            if declared as usize != len {
                error!(
                    "Invalid Format_description event: event type {:?} len: {} != {}",
                    event_type, declared, len
                );
                return Err(ReError::ProtocolVersionMismatch(format!(
                    "{:?} post-header length {} != {}",
                    event_type, declared, len
                )));
            }
        }

        Ok(())
    }
}
