use std::collections::BTreeSet;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use binlog::events::checksum_type::ChecksumType;
use binlog::position::position::Position;
use binlog::processor::master_info::parse_master_version;
use common::err::decode_error::ReError;
use common::err::CResult;

use crate::conn::connection::IConnection;

const SELECT_VERSION: &str = "SELECT VERSION()";
const SHOW_BINLOG_FORMAT: &str = "SHOW GLOBAL VARIABLES LIKE 'binlog_format'";
const SHOW_GTID_MODE: &str = "SHOW GLOBAL VARIABLES LIKE 'gtid_mode'";
const SHOW_SLAVE_HOSTS: &str = "SHOW SLAVE HOSTS";
const SHOW_MASTER_STATUS: &str = "SHOW MASTER STATUS";
const SET_MASTER_BINLOG_CHECKSUM: &str = "SET @master_binlog_checksum= @@global.binlog_checksum";
const SELECT_MASTER_BINLOG_CHECKSUM: &str = "SELECT @master_binlog_checksum";

/// Servers before 5.6.2 know no `binlog_checksum`.
const ER_UNKNOWN_SYSTEM_VARIABLE: u16 = 1193;

/// Columns of the `SHOW MASTER STATUS` result
/// |File|Position|Binlog_Do_DB|Binlog_Ignore_DB|Executed_Gtid_Set|
/// |----|--------|------------|----------------|-----------------|
/// |binlog.001375|15093139|   |                |                 |
const MASTER_STATUS_FILE: &str = "File";
const MASTER_STATUS_POSITION: &str = "Position";
const MASTER_STATUS_GTID: &str = "Executed_Gtid_Set";

/// Result of `SHOW VARIABLES`
/// |Variable_name|Value|
/// |-------------|-----|
/// |binlog_format|  ROW|
const SHOW_VARIABLES_VALUE: &str = "Value";

/// `major * 10000 + minor * 100 + patch` of the master.
pub fn master_version(conn: &mut dyn IConnection) -> CResult<u32> {
    let rs = conn.query(SELECT_VERSION)?;
    let text = rs
        .value_at(0, 0)
        .ok_or_else(|| ReError::ConfigurationError("could not SELECT VERSION()".to_string()))?;
    let version = parse_master_version(text)?;
    info!("master version {} ({})", text, version);
    Ok(version)
}

/// Row events only exist with `binlog_format = ROW`.
pub fn check_binlog_format(conn: &mut dyn IConnection) -> CResult<()> {
    let rs = conn.query(SHOW_BINLOG_FORMAT)?;
    if rs.len() != 1 {
        return Err(ReError::ConfigurationError(format!("Could not {}", SHOW_BINLOG_FORMAT)));
    }
    match rs.get(0, SHOW_VARIABLES_VALUE)? {
        Some("ROW") => Ok(()),
        other => Err(ReError::ConfigurationError(format!(
            "got invalid binlog format: {}",
            other.unwrap_or("NULL")
        ))),
    }
}

/// `gtid_mode = ON`. Servers without the variable report false.
pub fn gtid_mode(conn: &mut dyn IConnection) -> CResult<bool> {
    let rs = conn.query(SHOW_GTID_MODE)?;
    if rs.len() != 1 {
        return Ok(false);
    }
    Ok(rs.get(0, SHOW_VARIABLES_VALUE)? == Some("ON"))
}

/// Current time XOR pid << 16, the starting point of `generate_slave_id`.
pub fn slave_id_seed() -> u32 {
    let now = Utc::now().timestamp() as u32;
    now ^ (std::process::id() << 16)
}

/// First id from `seed` on that no replica listed by `SHOW SLAVE HOSTS` uses.
pub fn generate_slave_id(conn: &mut dyn IConnection, seed: u32) -> CResult<u32> {
    let rs = conn.query(SHOW_SLAVE_HOSTS)?;

    let mut server_ids = BTreeSet::new();
    for id in rs.column_values("Server_id")? {
        server_ids.insert(id.trim().parse::<u32>()?);
    }

    let mut server_id = seed;
    while server_ids.contains(&server_id) {
        server_id = server_id.wrapping_add(1);
    }
    debug!("Generated server_id = {}", server_id);
    Ok(server_id)
}

/// End of the master's binlog, with the executed GTID set when the server has one.
pub fn last_binlog_pos(conn: &mut dyn IConnection) -> CResult<Position> {
    let rs = conn.query(SHOW_MASTER_STATUS)?;
    if rs.len() != 1 {
        return Err(ReError::ConfigurationError(
            "SHOW MASTER STATUS returned no row, is binary logging enabled?".to_string(),
        ));
    }

    let file = rs.get(0, MASTER_STATUS_FILE)?.unwrap_or_default();
    let pos = rs.get(0, MASTER_STATUS_POSITION)?.unwrap_or("0").parse::<u64>()?;

    let mut position = Position::new(file, pos);
    if rs.column_index(MASTER_STATUS_GTID).is_some() {
        if let Some(gtid) = rs.get(0, MASTER_STATUS_GTID)? {
            position.parse_gtid(gtid)?;
        }
    }
    Ok(position)
}

/// Ask the master for a heartbeat event when the log is idle this long.
pub fn set_master_heartbeat(conn: &mut dyn IConnection, period: Duration) -> CResult<()> {
    let nanoseconds = period.as_nanos();
    conn.execute(&format!("SET @master_heartbeat_period= {}", nanoseconds))
}

/// Declares the checksum this replica understands and reads back the one the master uses.
///
/// When replication starts, the fake ROTATE comes before the FORMAT_DESCRIPTION,
/// so the trailer length must be known in advance.
pub fn checksum_handshake(conn: &mut dyn IConnection) -> CResult<ChecksumType> {
    match conn.execute(SET_MASTER_BINLOG_CHECKSUM) {
        Ok(()) => {}
        Err(e) if e.mysql_code() == Some(ER_UNKNOWN_SYSTEM_VARIABLE) => {
            debug!("master has no binlog_checksum, assuming none");
            return Ok(ChecksumType::None);
        }
        Err(e) => return Err(e),
    }

    let rs = conn.query(SELECT_MASTER_BINLOG_CHECKSUM)?;
    let checksum = match rs.value_at(0, 0) {
        Some(name) => ChecksumType::from_name(name)?,
        None => ChecksumType::None,
    };
    debug!("Success doing checksum handshake: {:?}", checksum);
    Ok(checksum)
}
