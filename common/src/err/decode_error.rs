use std::io;
use std::num::ParseIntError;
use std::str::Utf8Error;
use std::string::FromUtf8Error;

use hex::FromHexError;
use thiserror::Error;

/// Error classes the stream controller reacts to.
///
/// - `Transport` / `Protocol`: drop the connection and reconnect from the last committed position.
/// - `Schema` / `Decode` / `Callback`: abandon the current event, keep streaming.
/// - `Configuration`: stop and report to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Transport,
    Protocol,
    Schema,
    Decode,
    Configuration,
    Callback,
}

#[derive(Debug, Error)]
pub enum ReError {
    #[error("io error: {0}")]
    IoError(#[from] io::Error),

    #[error("utf8 error: {0}")]
    Utf8Error(#[from] Utf8Error),

    #[error("utf8 error: {0}")]
    FromUtf8Error(#[from] FromUtf8Error),

    #[error("hex error: {0}")]
    FromHexError(#[from] FromHexError),

    #[error("parse int error: {0}")]
    ParseIntError(#[from] ParseIntError),

    #[error("connection error: {0}")]
    ConnectionError(String),

    ///////////////////////////////////////////////////
    // binlog protocol
    ///////////////////////////////////////////////////
    /// Event is too short for the common header
    #[error("truncated event: {0}")]
    TruncatedEvent(String),

    #[error("corrupt event: {0}")]
    CorruptEvent(String),

    #[error("checksum mismatch: incoming {incoming:#010x} != computed {computed:#010x}")]
    ChecksumMismatch { incoming: u32, computed: u32 },

    #[error("protocol version mismatch: {0}")]
    ProtocolVersionMismatch(String),

    ///////////////////////////////////////////////////
    // schema and row decoding
    ///////////////////////////////////////////////////
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("malformed value: {0}")]
    MalformedValue(String),

    #[error("unsupported precision: {0}")]
    UnsupportedPrecision(String),

    #[error("invalid field spec: {0}")]
    InvalidFieldSpec(String),

    #[error("malformed gtid text: {0}")]
    MalformedGtidText(String),

    ///////////////////////////////////////////////////
    // setup
    ///////////////////////////////////////////////////
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error("config file parse error: {0}")]
    ConfigFileParseErr(String),

    #[error("mysql error {code}: {message}")]
    MysqlQueryErr { code: u16, message: String },

    #[error("callback error: {0}")]
    CallbackError(String),

    #[error("{0}")]
    String(String),
}

impl ReError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ReError::IoError(_) | ReError::ConnectionError(_) | ReError::MysqlQueryErr { .. } => {
                ErrorClass::Transport
            }
            ReError::TruncatedEvent(_)
            | ReError::CorruptEvent(_)
            | ReError::ChecksumMismatch { .. }
            | ReError::ProtocolVersionMismatch(_) => ErrorClass::Protocol,
            ReError::SchemaMismatch(_) | ReError::TableNotFound(_) => ErrorClass::Schema,
            ReError::Utf8Error(_)
            | ReError::FromUtf8Error(_)
            | ReError::FromHexError(_)
            | ReError::ParseIntError(_)
            | ReError::MalformedValue(_)
            | ReError::UnsupportedPrecision(_)
            | ReError::InvalidFieldSpec(_)
            | ReError::MalformedGtidText(_)
            | ReError::String(_) => ErrorClass::Decode,
            ReError::ConfigurationError(_) | ReError::ConfigFileParseErr(_) => {
                ErrorClass::Configuration
            }
            ReError::CallbackError(_) => ErrorClass::Callback,
        }
    }

    /// Transport and protocol failures end the current connection.
    pub fn requires_reconnect(&self) -> bool {
        matches!(self.class(), ErrorClass::Transport | ErrorClass::Protocol)
    }

    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Configuration
    }

    /// Server error code, when the error came back in an ERR packet.
    pub fn mysql_code(&self) -> Option<u16> {
        match self {
            ReError::MysqlQueryErr { code, .. } => Some(*code),
            _ => None,
        }
    }
}
