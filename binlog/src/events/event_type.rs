use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::Serialize;

/// One past the highest event type code this reader knows.
pub const ENUM_END_EVENT: u8 = 43;

/// Number of known event types, i.e. post-header lengths a current FORMAT_DESCRIPTION_EVENT may carry.
pub const LOG_EVENT_TYPES: usize = (ENUM_END_EVENT - 1) as usize;

///
/// @see https://dev.mysql.com/doc/dev/mysql-server/latest/namespacemysql_1_1binlog_1_1event.html
///
#[allow(non_camel_case_types)]
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum LogEventType {
    UNKNOWN_EVENT = 0,

    /// This is sent only by MySQL <=4.x
    START_EVENT_V3 = 1,

    /// A statement: DDL and the BEGIN/COMMIT of transactions come through here
    QUERY_EVENT = 2,
    STOP_EVENT = 3,
    /// The binlog switches to a new file
    ROTATE_EVENT = 4,
    INTVAR_EVENT = 5,
    LOAD_EVENT = 6,
    SLAVE_EVENT = 7,
    CREATE_FILE_EVENT = 8,
    APPEND_BLOCK_EVENT = 9,
    EXEC_LOAD_EVENT = 10,
    DELETE_FILE_EVENT = 11,
    NEW_LOAD_EVENT = 12,
    RAND_EVENT = 13,
    USER_VAR_EVENT = 14,

    /// First event of every binlog file, describes the format of what follows
    FORMAT_DESCRIPTION_EVENT = 15,

    /// Commit event
    XID_EVENT = 16,
    BEGIN_LOAD_QUERY_EVENT = 17,
    EXECUTE_LOAD_QUERY_EVENT = 18,

    /// Precedes the rows events and describes the table they decode against.
    TABLE_MAP_EVENT = 19,

    /// The PRE_GA event numbers were used for 5.1.0 to 5.1.15 and are therefore obsolete.
    PRE_GA_WRITE_ROWS_EVENT = 20,
    PRE_GA_UPDATE_ROWS_EVENT = 21,
    PRE_GA_DELETE_ROWS_EVENT = 22,

    WRITE_ROWS_EVENT_V1 = 23,
    UPDATE_ROWS_EVENT_V1 = 24,
    DELETE_ROWS_EVENT_V1 = 25,

    INCIDENT_EVENT = 26,

    /// Heartbeat sent while the master is idle, never written to the binlog
    HEARTBEAT_LOG_EVENT = 27,
    IGNORABLE_LOG_EVENT = 28,
    ROWS_QUERY_LOG_EVENT = 29,

    /// Version 2 of the Row events
    WRITE_ROWS_EVENT = 30,
    UPDATE_ROWS_EVENT = 31,
    DELETE_ROWS_EVENT = 32,

    GTID_LOG_EVENT = 33,
    ANONYMOUS_GTID_LOG_EVENT = 34,
    PREVIOUS_GTIDS_LOG_EVENT = 35,
    TRANSACTION_CONTEXT_EVENT = 36,
    VIEW_CHANGE_EVENT = 37,
    XA_PREPARE_LOG_EVENT = 38,
    PARTIAL_UPDATE_ROWS_EVENT = 39,
    TRANSACTION_PAYLOAD_EVENT = 40,
    HEARTBEAT_LOG_EVENT_V2 = 41,
    GTID_TAGGED_LOG_EVENT = 42,
}

/// What the stream controller does with a decoded header.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EventDisposition {
    /// The event drives position tracking or row delivery.
    Proceed,
    /// Recognized but carries nothing for this consumer.
    Ignore,
    /// Code outside the known table.
    Unknown,
}

impl LogEventType {
    pub fn from_code(code: u8) -> Option<LogEventType> {
        LogEventType::try_from(code).ok()
    }

    pub fn disposition(&self) -> EventDisposition {
        match self {
            LogEventType::FORMAT_DESCRIPTION_EVENT
            | LogEventType::QUERY_EVENT
            | LogEventType::ROTATE_EVENT
            | LogEventType::XID_EVENT
            | LogEventType::TABLE_MAP_EVENT
            | LogEventType::GTID_LOG_EVENT => EventDisposition::Proceed,
            t if t.is_rows_event() => EventDisposition::Proceed,
            LogEventType::UNKNOWN_EVENT => EventDisposition::Unknown,
            _ => EventDisposition::Ignore,
        }
    }

    /// tick(when) is not reported for events the master synthesizes outside a transaction.
    pub fn is_timed(&self) -> bool {
        !matches!(
            self,
            LogEventType::FORMAT_DESCRIPTION_EVENT
                | LogEventType::ROTATE_EVENT
                | LogEventType::HEARTBEAT_LOG_EVENT
                | LogEventType::PREVIOUS_GTIDS_LOG_EVENT
        )
    }

    pub fn is_rows_event(&self) -> bool {
        self.is_write_rows() || self.is_update_rows() || self.is_delete_rows()
    }

    pub fn is_write_rows(&self) -> bool {
        matches!(self, LogEventType::WRITE_ROWS_EVENT_V1 | LogEventType::WRITE_ROWS_EVENT)
    }

    pub fn is_update_rows(&self) -> bool {
        matches!(self, LogEventType::UPDATE_ROWS_EVENT_V1 | LogEventType::UPDATE_ROWS_EVENT)
    }

    pub fn is_delete_rows(&self) -> bool {
        matches!(self, LogEventType::DELETE_ROWS_EVENT_V1 | LogEventType::DELETE_ROWS_EVENT)
    }
}
