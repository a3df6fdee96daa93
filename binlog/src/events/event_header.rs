use nom::{
    number::complete::{le_u16, le_u32, le_u8},
    IResult,
};

use common::err::decode_error::ReError;
use common::err::CResult;

use crate::events::event_type::{LogEventType, ENUM_END_EVENT};
use crate::events::LOG_EVENT_HEADER_LEN;

///  Binlog Event Header, 19 bytes, little endian.
///
/// ```text
///                      [startPos : Len]
/// +=====================================+
/// | event  | timestamp         0 : 4    |
/// | header +----------------------------+
/// |        | event_type        4 : 1    |
/// |        +----------------------------+
/// |        | server_id         5 : 4    |
/// |        +----------------------------+
/// |        | event_length      9 : 4    |
/// |        +----------------------------+
/// |        | next_position    13 : 4    |
/// |        +----------------------------+
/// |        | flags            17 : 2    |
/// +=====================================+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub when: u32,
    pub event_type: u8,
    pub server_id: u32,
    pub event_length: u32,
    pub log_pos: u32,
    pub flags: u16,
}

impl Header {
    pub fn parse_v4_header(input: &[u8]) -> IResult<&[u8], Header> {
        let (i, when) = le_u32(input)?;
        let (i, event_type) = le_u8(i)?;
        let (i, server_id) = le_u32(i)?;
        let (i, event_length) = le_u32(i)?;
        let (i, log_pos) = le_u32(i)?;
        let (i, flags) = le_u16(i)?;

        Ok((
            i,
            Header {
                when,
                event_type,
                server_id,
                event_length,
                log_pos,
                flags,
            },
        ))
    }
}

/// A header that passed validation, borrowing the whole event buffer.
///
/// `event_len` starts as the on-wire length and shrinks once a trailing checksum
/// (or the FORMAT_DESCRIPTION_EVENT checksum descriptor) is accounted for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicEventInfo<'a> {
    pub when: u32,
    pub event_type: LogEventType,
    pub server_id: u32,
    pub event_len: u32,
    pub log_pos: u32,
    pub flags: u16,
    pub buf: &'a [u8],
}

impl<'a> BasicEventInfo<'a> {
    pub fn parse(buf: &'a [u8]) -> CResult<BasicEventInfo<'a>> {
        if buf.len() < LOG_EVENT_HEADER_LEN {
            return Err(ReError::TruncatedEvent(format!(
                "{} bytes, header needs {}",
                buf.len(),
                LOG_EVENT_HEADER_LEN
            )));
        }

        let (_, header) = Header::parse_v4_header(buf)
            .map_err(|e| ReError::TruncatedEvent(e.to_string()))?;

        if header.event_length as usize != buf.len() {
            return Err(ReError::CorruptEvent(format!(
                "event_len {} != buffer length {}",
                header.event_length,
                buf.len()
            )));
        }

        if header.event_type >= ENUM_END_EVENT {
            return Err(ReError::CorruptEvent(format!(
                "event type {} is out of range",
                header.event_type
            )));
        }
        let event_type = LogEventType::from_code(header.event_type).ok_or_else(|| {
            ReError::CorruptEvent(format!("event type {} is out of range", header.event_type))
        })?;

        Ok(BasicEventInfo {
            when: header.when,
            event_type,
            server_id: header.server_id,
            event_len: header.event_length,
            log_pos: header.log_pos,
            flags: header.flags,
            buf,
        })
    }

    /// Bytes after the common header, bounded by the current `event_len`.
    pub fn body(&self) -> &'a [u8] {
        let end = (self.event_len as usize).min(self.buf.len());
        if end <= LOG_EVENT_HEADER_LEN {
            return &[];
        }
        &self.buf[LOG_EVENT_HEADER_LEN..end]
    }
}
