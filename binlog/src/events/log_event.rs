use byteorder::{ByteOrder, LittleEndian};
use tracing::{error, trace, warn};

use common::err::decode_error::ReError;
use common::err::CResult;

use crate::events::checksum_type::{ChecksumType, BINLOG_CHECKSUM_ALG_DESC_LEN, BINLOG_CHECKSUM_LEN};
use crate::events::event_header::BasicEventInfo;
use crate::events::event_type::{EventDisposition, LogEventType};
use crate::events::format_description::FormatDescription;
use crate::events::LOG_EVENT_HEADER_LEN;
use crate::stats::EventStat;

const SUSPICIOUS_EVENT_SIZE: usize = 3 * 1024 * 1024;

/// Validates one raw event (without the leading OK byte of the dump packet) and classifies it.
///
/// A FORMAT_DESCRIPTION_EVENT from a 5.6+ master updates `checksum` before the trailer is verified,
/// so the description event itself is checked with the algorithm it announces.
pub fn read_log_event<'a>(
    buf: &'a [u8],
    master_ge_56: bool,
    checksum: &mut ChecksumType,
    stats: &dyn EventStat,
) -> CResult<(BasicEventInfo<'a>, EventDisposition)> {
    let mut info = BasicEventInfo::parse(buf)?;
    let wire_len = buf.len();

    if master_ge_56 && info.event_type == LogEventType::FORMAT_DESCRIPTION_EVENT {
        let tail = BINLOG_CHECKSUM_LEN + BINLOG_CHECKSUM_ALG_DESC_LEN;
        if wire_len < LOG_EVENT_HEADER_LEN + tail {
            return Err(ReError::TruncatedEvent(format!(
                "format description event of {} bytes has no checksum descriptor",
                wire_len
            )));
        }
        if let Some(alg) = ChecksumType::from_code(buf[wire_len - tail]) {
            *checksum = alg;
        }
    }

    if checksum.is_enabled() {
        if wire_len < LOG_EVENT_HEADER_LEN + BINLOG_CHECKSUM_LEN {
            return Err(ReError::TruncatedEvent(format!(
                "event of {} bytes has no room for a checksum",
                wire_len
            )));
        }
        let split = wire_len - BINLOG_CHECKSUM_LEN;
        let incoming = LittleEndian::read_u32(&buf[split..]);
        let computed = crc32fast::hash(&buf[..split]);
        if incoming != computed {
            error!("CRC32 check failed: incoming ({}) != computed ({})", incoming, computed);
            return Err(ReError::ChecksumMismatch { incoming, computed });
        }
        info.event_len -= BINLOG_CHECKSUM_LEN as u32;
    }

    if info.event_type.is_timed() {
        stats.tick(info.when);
    }

    let disposition = info.event_type.disposition();
    match info.event_type {
        LogEventType::FORMAT_DESCRIPTION_EVENT => {
            let fde_len = if master_ge_56 {
                wire_len - (BINLOG_CHECKSUM_ALG_DESC_LEN + BINLOG_CHECKSUM_LEN)
            } else {
                info.event_len as usize
            };
            let fd = FormatDescription::parse(buf, fde_len)?;
            fd.check(master_ge_56)?;
            trace!("format description from server {}", fd.server_version);

            stats.tick_format_description();
        }
        LogEventType::QUERY_EVENT => stats.tick_query(),
        LogEventType::ROTATE_EVENT => stats.tick_rotate(),
        LogEventType::XID_EVENT => stats.tick_xid(),
        _ => match disposition {
            EventDisposition::Proceed => {}
            EventDisposition::Ignore => stats.tick_other(),
            EventDisposition::Unknown => {
                error!("Unknown event code: {}", u8::from(info.event_type));
                stats.tick_other();
            }
        },
    }

    if disposition == EventDisposition::Proceed && wire_len > SUSPICIOUS_EVENT_SIZE {
        warn!("event size {} > 3MB! Maybe a corrupted event!", wire_len);
    }

    Ok((info, disposition))
}
