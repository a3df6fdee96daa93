use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use common::config::{BinlogConfig, TableConfig};
use common::err::decode_error::ReError;
use common::err::CResult;

/// Output format of the row changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Format {
    Json,
    Yaml,
    /// one JSON object per line
    Line,
}

impl TryFrom<&str> for Format {
    type Error = ReError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" => Ok(Format::Yaml),
            "line" => Ok(Format::Line),
            other => Err(ReError::ConfigurationError(format!("unknown output format '{}'", other))),
        }
    }
}

#[derive(Parser, Serialize, Debug, Clone)]
#[command(name = "binlog-cli")]
#[command(version)]
// about with no value takes the crate description, without it the doc comment
#[command(about = "Streams MySQL row changes from the binlog")]
#[command(long_about = None)]
pub struct CliArgs {
    /// Path of the config file to load
    #[arg(short, long, help = "Path to loaded configuration file", value_name = "FILE")]
    pub config: Option<PathBuf>,

    ///////////////////////////////////////////////////
    // Cli Options //
    ///////////////////////////////////////////////////
    #[arg(short, long, help = "enable debug mode", default_value_t = false)]
    pub debug: bool,

    #[arg(short, long, help = "output format: [json | yaml | line]", default_value = "line")]
    pub format: String,

    ///////////////////////////////////////////////////
    // Binlog Options //
    ///////////////////////////////////////////////////
    #[arg(long = "host", help = "mysql host", value_name = "host")]
    pub host: Option<String>,

    #[arg(long = "port", help = "mysql port", value_name = "port")]
    pub port: Option<u16>,

    #[arg(short, long = "username", help = "mysql username", value_name = "username")]
    pub username: Option<String>,

    #[arg(short, long = "password", help = "mysql password", value_name = "password")]
    pub password: Option<String>,

    #[arg(long = "table", help = "table to follow as db.table, repeatable", value_name = "db.table")]
    pub tables: Vec<String>,

    #[arg(long = "gtid", help = "dump by GTID set", default_value_t = false)]
    pub gtid: bool,

    #[arg(long = "position-file", help = "JSON file holding the committed position", value_name = "FILE")]
    pub position_file: Option<String>,
}

impl CliArgs {
    pub fn format(&self) -> CResult<Format> {
        Format::try_from(self.format.as_str())
    }

    /// Command line values win over the configuration file.
    pub fn merge(&self, binlog_config: &mut BinlogConfig) -> CResult<()> {
        if self.host.is_some() {
            binlog_config.set_host(self.host.clone());
        }
        if self.port.is_some() {
            binlog_config.set_port(self.port);
        }
        if let Some(username) = &self.username {
            binlog_config.username = username.clone();
        }
        if let Some(password) = &self.password {
            binlog_config.password = password.clone();
        }
        if self.gtid {
            binlog_config.gtid_mode = true;
        }
        if self.position_file.is_some() {
            binlog_config.position_file = self.position_file.clone();
        }

        for name in &self.tables {
            let table = parse_table(name)?;
            if !binlog_config.tables.contains(&table) {
                binlog_config.tables.push(table);
            }
        }
        Ok(())
    }
}

/// `db.table`, all event kinds.
fn parse_table(name: &str) -> CResult<TableConfig> {
    match name.split_once('.') {
        Some((db, tbl)) if !db.is_empty() && !tbl.is_empty() => Ok(TableConfig {
            database: db.to_string(),
            table: tbl.to_string(),
            events: Vec::new(),
        }),
        _ => Err(ReError::ConfigurationError(format!(
            "table '{}' must be given as db.table",
            name
        ))),
    }
}
