use common::err::decode_error::ReError;
use common::err::CResult;

use crate::events::checksum_type::ChecksumType;
use crate::events::{MYSQL_CHECKSUM_VERSION, MYSQL_TEMPORAL_NEW_STORAGE_VERSION};
use crate::position::position::Position;

/// Oldest master that writes usable row events, 5.1.23.
pub const MIN_MASTER_VERSION: u32 = 50123;

/// What is known about the master for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterInfo {
    /// major * 10000 + minor * 100 + patch
    pub master_version: u32,
    /// TIMESTAMP/DATETIME/TIME use the pre 5.6.4 layout
    pub is_old_storage: bool,
    /// `gtid_mode` reported ON by the master
    pub gtid_mode: bool,
    pub checksum: ChecksumType,
    /// position of the last processed event, ahead of the committed one inside a transaction
    pub position: Position,
}

impl Default for MasterInfo {
    fn default() -> Self {
        MasterInfo {
            master_version: 0,
            is_old_storage: true,
            gtid_mode: false,
            checksum: ChecksumType::None,
            position: Position::default(),
        }
    }
}

impl MasterInfo {
    pub fn set_master_version(&mut self, version: u32) {
        self.master_version = version;
        self.is_old_storage = version < MYSQL_TEMPORAL_NEW_STORAGE_VERSION;
    }

    pub fn master_ge_56(&self) -> bool {
        self.master_version >= MYSQL_CHECKSUM_VERSION
    }
}

/// `SELECT VERSION()` text such as `5.7.44-log` or `10.6.12-MariaDB` to its numeric form.
pub fn parse_master_version(text: &str) -> CResult<u32> {
    let bad = || ReError::ConfigurationError(format!("could not parse master version '{}'", text));

    let mut nums = text.splitn(3, '.').map(|part| {
        let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse::<u32>().map_err(|_| bad())
    });
    let major = nums.next().ok_or_else(bad)??;
    let minor = nums.next().ok_or_else(bad)??;
    let patch = nums.next().ok_or_else(bad)??;

    let version = major * 10000 + minor * 100 + patch;
    if version < MIN_MASTER_VERSION {
        return Err(ReError::ConfigurationError(format!(
            "master version {} is older than 5.1.23, row events cannot be read",
            text
        )));
    }
    Ok(version)
}
