use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use common::err::decode_error::ReError;
use common::err::CResult;

use crate::events::event_header::BasicEventInfo;
use crate::events::{LOG_EVENT_HEADER_LEN, QUERY_HEADER_LEN};

/// QUERY_EVENT post-header offsets
const Q_THREAD_ID_OFFSET: usize = 0;
const Q_EXEC_TIME_OFFSET: usize = 4;
const Q_DB_LEN_OFFSET: usize = 8;
const Q_ERR_CODE_OFFSET: usize = 9;
const Q_STATUS_VARS_LEN_OFFSET: usize = 11;

///
/// +=====================================+
/// | post   | thread_id         0 : 4    |
/// | header | exec_time         4 : 4    |
/// |        | db_len            8 : 1    |
/// |        | error_code        9 : 2    |
/// |        | status_vars_len  11 : 2    |
/// +=====================================+
/// | body   | status_vars, db, NUL, query|
/// +=====================================+
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct QueryEvent {
    pub thread_id: u32,
    pub exec_time: u32,
    pub error_code: u16,
    pub db_name: String,
    pub query: String,
}

impl QueryEvent {
    pub fn parse(info: &BasicEventInfo) -> CResult<QueryEvent> {
        let event_len = info.event_len as usize;
        let min_len = LOG_EVENT_HEADER_LEN + QUERY_HEADER_LEN;
        if event_len < min_len {
            return Err(ReError::CorruptEvent(format!(
                "query event of {} bytes, needs {}",
                event_len, min_len
            )));
        }

        let body = info.body();
        let thread_id = LittleEndian::read_u32(&body[Q_THREAD_ID_OFFSET..]);
        let exec_time = LittleEndian::read_u32(&body[Q_EXEC_TIME_OFFSET..]);
        let db_len = body[Q_DB_LEN_OFFSET] as usize;
        let error_code = LittleEndian::read_u16(&body[Q_ERR_CODE_OFFSET..]);
        let status_vars_len = LittleEndian::read_u16(&body[Q_STATUS_VARS_LEN_OFFSET..]) as usize;

        let db_start = QUERY_HEADER_LEN + status_vars_len;
        let query_start = db_start + db_len + 1;
        if query_start > body.len() {
            return Err(ReError::CorruptEvent(format!(
                "query event of {} bytes cannot hold {} status bytes and a {} byte db name",
                event_len, status_vars_len, db_len
            )));
        }

        let db_name = String::from_utf8_lossy(&body[db_start..db_start + db_len]).to_string();
        let query = String::from_utf8_lossy(&body[query_start..]).to_string();

        Ok(QueryEvent {
            thread_id,
            exec_time,
            error_code,
            db_name,
            query,
        })
    }
}
