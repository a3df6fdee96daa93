use serde::Serialize;

use common::err::decode_error::ReError;
use common::err::CResult;

/// checksum_alg size, 1 byte
pub const BINLOG_CHECKSUM_ALG_DESC_LEN: usize = 1;

/// checksum size, 4 byte
pub const BINLOG_CHECKSUM_LEN: usize = 4;

/// Events are without checksum though its generator
pub const BINLOG_CHECKSUM_ALG_OFF: u8 = 0;
/// CRC32 of zlib algorithm.
pub const BINLOG_CHECKSUM_ALG_CRC32: u8 = 1;

/// Checksum algorithm the master appends to every event.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy, Default)]
#[repr(u8)]
pub enum ChecksumType {
    #[default]
    None = BINLOG_CHECKSUM_ALG_OFF,
    Crc32 = BINLOG_CHECKSUM_ALG_CRC32,
}

impl ChecksumType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            BINLOG_CHECKSUM_ALG_OFF => Some(ChecksumType::None),
            BINLOG_CHECKSUM_ALG_CRC32 => Some(ChecksumType::Crc32),
            _ => None,
        }
    }

    /// Value of `@master_binlog_checksum` as the server reports it.
    pub fn from_name(name: &str) -> CResult<Self> {
        match name {
            "NONE" => Ok(ChecksumType::None),
            "CRC32" => Ok(ChecksumType::Crc32),
            _ => Err(ReError::ConfigurationError(format!(
                "The master checksum type is not supported: {}",
                name
            ))),
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self == ChecksumType::Crc32
    }
}
