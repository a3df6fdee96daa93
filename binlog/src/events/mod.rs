pub mod event_type;
pub mod event_header;
pub mod checksum_type;
pub mod format_description;
pub mod rotate_event;
pub mod query_event;
pub mod table_map_event;
pub mod rows_event;
pub mod gtid_event;
pub mod log_event;

/// Length of the header common to every event
pub const LOG_EVENT_HEADER_LEN: usize = 19;

/// event-specific post-header sizes
pub const QUERY_HEADER_LEN: usize = 4 + 4 + 1 + 2 + 2;
pub const ROTATE_HEADER_LEN: usize = 8;
pub const TABLE_MAP_HEADER_LEN: usize = 8;
pub const ROWS_HEADER_LEN_V1: usize = 8;
pub const ROWS_HEADER_LEN_V2: usize = 10;
pub const XID_HEADER_LEN: usize = 0;

/// binlog version(2) + server version(50) + create timestamp(4)
pub const START_V3_HEADER_LEN: usize = 2 + 50 + 4;
pub const ST_COMMON_HEADER_LEN_OFFSET: usize = START_V3_HEADER_LEN;

/// commit flag(1) + sid(16) + gno(8)
pub const GTID_EVENT_LEN: usize = 1 + 16 + 8;

/// TIMESTAMP/DATETIME/TIME use the new storage format from 5.6.4
pub const MYSQL_TEMPORAL_NEW_STORAGE_VERSION: u32 = 50604;
/// From 5.6.0 FORMAT_DESCRIPTION_EVENT carries the checksum algorithm and rows events use the v2 header
pub const MYSQL_CHECKSUM_VERSION: u32 = 50600;
