use serde::{Deserialize, Serialize};

/// Root of the TOML configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepConfig {
    pub base: BaseConfig,
    pub binlog: BinlogConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    /// Log directory, stdout when empty
    pub log_dir: Option<String>,
}

impl BaseConfig {
    pub fn get_log_dir(&self) -> Option<String> {
        self.log_dir.clone()
    }
}

/// Binlog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BinlogConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: String,
    pub password: String,

    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,

    /// Fixed pause between reconnect attempts.
    pub connect_retry_secs: u64,

    /// Interval of the master heartbeat, 0 leaves it unset
    pub heartbeat_interval_ms: u64,

    /// Request the dump by GTID set instead of file/offset.
    pub gtid_mode: bool,

    /// Host name reported by COM_REGISTER_SLAVE.
    pub report_host: Option<String>,

    /// binlog file, e.g. mysql-bin.000005
    pub file: Option<String>,
    /// Start position within the binlog file
    pub position: Option<u64>,
    pub gtid: Option<String>,

    pub stop_file: Option<String>,
    pub stop_position: Option<u64>,
    pub stop_gtid: Option<String>,

    /// JSON file holding the last committed position.
    pub position_file: Option<String>,

    pub ssl: Option<SslConfig>,

    pub tables: Vec<TableConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    /// .der or .pem, a pem file may hold several certificates
    pub root_cert_path: Option<String>,
    pub pkcs12_path: Option<String>,
    pub pkcs12_password: Option<String>,
    pub skip_domain_validation: bool,
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TableConfig {
    pub database: String,
    pub table: String,

    /// insert / update / delete. Empty means all kinds.
    pub events: Vec<String>,
}

impl Default for BinlogConfig {
    fn default() -> Self {
        BinlogConfig {
            host: Some("127.0.0.1".to_string()),
            port: Some(3306),
            username: "root".to_string(),
            password: String::new(),
            connect_timeout_ms: 10_000,
            read_timeout_ms: 60_000,
            write_timeout_ms: 10_000,
            connect_retry_secs: 10,
            heartbeat_interval_ms: 0,
            gtid_mode: false,
            report_host: None,
            file: None,
            position: None,
            gtid: None,
            stop_file: None,
            stop_position: None,
            stop_gtid: None,
            position_file: None,
            ssl: None,
            tables: Vec::new(),
        }
    }
}

impl BinlogConfig {
    pub fn get_host(&self) -> String {
        self.host.clone().unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn get_port(&self) -> u16 {
        self.port.unwrap_or(3306)
    }

    pub fn set_host(&mut self, host: Option<String>) {
        self.host = host;
    }

    pub fn set_port(&mut self, port: Option<u16>) {
        self.port = port;
    }

    pub fn has_start_position(&self) -> bool {
        self.gtid.as_ref().map_or(false, |g| !g.trim().is_empty())
            || (self.file.as_ref().map_or(false, |f| !f.is_empty()) && self.position.unwrap_or(0) > 0)
    }

    pub fn has_stop_position(&self) -> bool {
        self.stop_gtid.as_ref().map_or(false, |g| !g.trim().is_empty())
            || self.stop_file.as_ref().map_or(false, |f| !f.is_empty())
    }
}
