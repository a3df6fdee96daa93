use std::fs;
use std::path::Path;

pub use crate::config::config::{BaseConfig, BinlogConfig, RepConfig, SslConfig, TableConfig};
use crate::err::decode_error::ReError;
use crate::err::CResult;

pub mod config;

pub fn read_config<P: AsRef<Path>>(path: P) -> CResult<RepConfig> {
    let s = fs::read_to_string(path.as_ref())?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> CResult<RepConfig> {
    toml::from_str(s).map_err(|e| ReError::ConfigFileParseErr(e.to_string()))
}
