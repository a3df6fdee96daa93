use std::io::Cursor;

use byteorder::{ByteOrder, LittleEndian};

use common::err::decode_error::ReError;
use common::err::CResult;

use crate::events::event_header::BasicEventInfo;
use crate::events::event_type::LogEventType;
use crate::events::table_map_event::read_table_id;
use crate::events::{LOG_EVENT_HEADER_LEN, ROWS_HEADER_LEN_V1, ROWS_HEADER_LEN_V2};
use crate::utils::read_len_enc_num;

/// Offset of the v2 extra-data length inside the post header.
const RW_V_EXTRAINFO_LEN_OFFSET: usize = 8;

/// WRITE/UPDATE/DELETE rows event, v1 and v2.
///
/// post header: table_id(6) flags(2) [extra_data_len(2) v2 only]
/// body: width(lenenc) columns_before_image((width+7)/8) [columns_after_image update only] rows...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowEventInfo<'a> {
    pub table_id: u64,
    pub flags: u16,
    /// number of columns in the table as the master sees it
    pub width: usize,
    pub cols: Vec<u8>,
    /// after-image column bitmap, UPDATE only
    pub cols_ai: Option<Vec<u8>>,
    /// packed row images up to the end of the event
    pub rows: &'a [u8],
}

impl<'a> RowEventInfo<'a> {
    pub fn parse(info: &BasicEventInfo<'a>) -> CResult<RowEventInfo<'a>> {
        let v2 = matches!(
            info.event_type,
            LogEventType::WRITE_ROWS_EVENT | LogEventType::UPDATE_ROWS_EVENT | LogEventType::DELETE_ROWS_EVENT
        );
        let header_len = if v2 { ROWS_HEADER_LEN_V2 } else { ROWS_HEADER_LEN_V1 };

        let min_len = LOG_EVENT_HEADER_LEN + header_len + 2;
        if (info.event_len as usize) < min_len {
            return Err(ReError::CorruptEvent(format!(
                "rows event of {} bytes, needs {}",
                info.event_len, min_len
            )));
        }

        let body = info.body();
        let corrupt = || ReError::CorruptEvent(format!("rows event of {} bytes is short", info.event_len));

        let table_id = read_table_id(body);
        let flags = LittleEndian::read_u16(&body[6..8]);

        let mut pos = header_len;
        if v2 {
            // extra_data_len counts itself
            let extra = LittleEndian::read_u16(&body[RW_V_EXTRAINFO_LEN_OFFSET..]) as usize;
            pos += extra.saturating_sub(2);
        }

        let rest = body.get(pos..).ok_or_else(corrupt)?;
        let mut cursor = Cursor::new(rest);
        let (used, width) = read_len_enc_num(&mut cursor).map_err(|_| corrupt())?;
        // the column count is read off the wire, every offset derived from it is checked
        let width = usize::try_from(width).map_err(|_| corrupt())?;
        let bitmap_len = width.checked_add(7).ok_or_else(corrupt)? / 8;
        pos += used;

        let take_bitmap = |pos: &mut usize| -> CResult<Vec<u8>> {
            let end = pos.checked_add(bitmap_len).ok_or_else(corrupt)?;
            let bitmap = body.get(*pos..end).ok_or_else(corrupt)?.to_vec();
            *pos = end;
            Ok(bitmap)
        };

        let cols = take_bitmap(&mut pos)?;
        let cols_ai = if info.event_type.is_update_rows() {
            Some(take_bitmap(&mut pos)?)
        } else {
            None
        };

        let rows = body.get(pos..).ok_or_else(corrupt)?;

        Ok(RowEventInfo {
            table_id,
            flags,
            width,
            cols,
            cols_ai,
            rows,
        })
    }
}
