use std::io::Cursor;

use serde::Serialize;

use common::err::decode_error::ReError;
use common::err::CResult;

use crate::events::event_header::BasicEventInfo;
use crate::events::{LOG_EVENT_HEADER_LEN, TABLE_MAP_HEADER_LEN};
use crate::utils::read_len_enc_num;

/// 6 byte little-endian table id shared by TABLE_MAP and rows events.
pub fn read_table_id(buf: &[u8]) -> u64 {
    buf[..6]
        .iter()
        .rev()
        .fold(0u64, |acc, b| (acc << 8) | *b as u64)
}

/// TABLE_MAP_EVENT: binds a connection-scoped table id to `db.table` for the rows events that follow.
///
/// post header: table_id(6) flags(2)
/// body: db_len(1) db NUL tbl_len(1) tbl NUL column_count(lenenc) column_type(column_count) ...
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct TableMapEvent {
    pub table_id: u64,
    pub database_name: String,
    pub table_name: String,
    /// wire type code per column
    pub column_types: Vec<u8>,
}

impl TableMapEvent {
    pub fn parse(info: &BasicEventInfo) -> CResult<TableMapEvent> {
        let min_len = LOG_EVENT_HEADER_LEN + TABLE_MAP_HEADER_LEN + 2;
        if (info.event_len as usize) < min_len {
            return Err(ReError::CorruptEvent(format!(
                "table map event of {} bytes, needs {}",
                info.event_len, min_len
            )));
        }

        let body = info.body();
        let corrupt = || ReError::CorruptEvent(format!("table map event of {} bytes is short", info.event_len));

        let table_id = read_table_id(body);

        let mut pos = TABLE_MAP_HEADER_LEN;
        let db_len = *body.get(pos).ok_or_else(corrupt)? as usize;
        let database_name = body.get(pos + 1..pos + 1 + db_len).ok_or_else(corrupt)?;
        pos += db_len + 2;

        let tbl_len = *body.get(pos).ok_or_else(corrupt)? as usize;
        let table_name = body.get(pos + 1..pos + 1 + tbl_len).ok_or_else(corrupt)?;
        pos += tbl_len + 2;

        let rest = body.get(pos..).ok_or_else(corrupt)?;
        let mut cursor = Cursor::new(rest);
        let (used, width) = read_len_enc_num(&mut cursor).map_err(|_| corrupt())?;
        let end = usize::try_from(width)
            .ok()
            .and_then(|w| used.checked_add(w))
            .ok_or_else(corrupt)?;
        let column_types = rest.get(used..end).ok_or_else(corrupt)?.to_vec();

        Ok(TableMapEvent {
            table_id,
            database_name: String::from_utf8_lossy(database_name).to_string(),
            table_name: String::from_utf8_lossy(table_name).to_string(),
            column_types,
        })
    }
}
