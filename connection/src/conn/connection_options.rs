use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use native_tls::{Certificate, Identity, TlsConnector};

use common::config::{BinlogConfig, SslConfig};
use common::err::decode_error::ReError;
use common::err::CResult;

/// Settings used to connect to MySQL/MariaDB.
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// Port number to connect. Defaults to 3306.
    pub port: u16,

    /// Hostname to connect. Defaults to "127.0.0.1".
    pub hostname: String,

    /// A database user which is used to register as a database slave.
    /// The user needs to have `REPLICATION SLAVE`, `REPLICATION CLIENT` privileges.
    pub username: String,

    /// The password of the user which is used to connect.
    pub password: String,

    /// Default database name specified in Handshake connection.
    /// Has nothing to do with filtering events by database name.
    pub database: Option<String>,

    pub connect_timeout: Duration,

    /// Blocking reads give up after this long. Streaming raises it above the heartbeat period.
    pub read_timeout: Duration,

    pub write_timeout: Duration,

    /// Driver will require SSL connection if this option isn't `None` (default to `None`).
    pub ssl_opts: Option<SslOpts>,
}

impl Default for ConnectionOptions {
    fn default() -> ConnectionOptions {
        ConnectionOptions {
            port: 3306,
            hostname: String::from("127.0.0.1"),
            username: String::new(),
            password: String::new(),
            database: None,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(60),
            write_timeout: Duration::from_secs(10),
            ssl_opts: None,
        }
    }
}

impl ConnectionOptions {
    pub fn new(hostname: &str, port: u16, username: &str, password: &str) -> ConnectionOptions {
        ConnectionOptions {
            hostname: hostname.to_string(),
            port,
            username: username.to_string(),
            password: password.to_string(),
            ..ConnectionOptions::default()
        }
    }

    pub fn from_config(config: &BinlogConfig) -> ConnectionOptions {
        let mut opts = ConnectionOptions::new(&config.get_host(), config.get_port(), &config.username, &config.password);
        opts.connect_timeout = Duration::from_millis(config.connect_timeout_ms);
        opts.read_timeout = Duration::from_millis(config.read_timeout_ms);
        opts.write_timeout = Duration::from_millis(config.write_timeout_ms);
        opts.ssl_opts = config.ssl.as_ref().map(SslOpts::from_config);
        opts
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}

/// TLS settings from the `[binlog.ssl]` section. Present means the connection must be encrypted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SslOpts {
    /// .der, or .pem holding one or more certificates
    pub root_cert_path: Option<PathBuf>,
    pub client_identity: Option<ClientIdentity>,
    /// Skip server domain validation
    pub skip_domain_validation: bool,
    /// Accept invalid certificates
    pub accept_invalid_certs: bool,
}

impl SslOpts {
    pub fn from_config(config: &SslConfig) -> SslOpts {
        SslOpts {
            root_cert_path: config.root_cert_path.as_ref().map(PathBuf::from),
            client_identity: config.pkcs12_path.as_ref().map(|path| ClientIdentity {
                pkcs12_path: PathBuf::from(path),
                password: config.pkcs12_password.clone(),
            }),
            skip_domain_validation: config.skip_domain_validation,
            accept_invalid_certs: config.accept_invalid_certs,
        }
    }

    pub(crate) fn connector(&self) -> CResult<TlsConnector> {
        let mut builder = TlsConnector::builder();
        if let Some(path) = &self.root_cert_path {
            for cert in load_root_certs(path)? {
                builder.add_root_certificate(cert);
            }
        }
        if let Some(identity) = &self.client_identity {
            builder.identity(identity.load()?);
        }
        builder
            .danger_accept_invalid_hostnames(self.skip_domain_validation)
            .danger_accept_invalid_certs(self.accept_invalid_certs);

        builder
            .build()
            .map_err(|e| ReError::ConfigurationError(format!("Can not build tls connector: {}", e)))
    }
}

fn load_root_certs(path: &Path) -> CResult<Vec<Certificate>> {
    let data = fs::read(path)?;
    if let Ok(cert) = Certificate::from_der(&data) {
        return Ok(vec![cert]);
    }

    let bad_cert = |e: String| ReError::ConfigurationError(format!("Can not load {}: {}", path.display(), e));
    let pems = pem::parse_many(&data).map_err(|e| bad_cert(e.to_string()))?;
    if pems.is_empty() {
        return Err(bad_cert(String::from("neither DER nor PEM")));
    }
    pems.iter()
        .map(|p| Certificate::from_pem(pem::encode(p).as_bytes()).map_err(|e| bad_cert(e.to_string())))
        .collect()
}

/// PKCS#12 archive presented as the client certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub pkcs12_path: PathBuf,
    pub password: Option<String>,
}

impl ClientIdentity {
    fn load(&self) -> CResult<Identity> {
        let der = fs::read(&self.pkcs12_path)?;
        Identity::from_pkcs12(&der, self.password.as_deref().unwrap_or_default()).map_err(|e| {
            ReError::ConfigurationError(format!("Can not load identity {}: {}", self.pkcs12_path.display(), e))
        })
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;
    use std::time::Duration;

    use common::config::{BinlogConfig, SslConfig};

    use crate::conn::connection_options::ConnectionOptions;

    #[test]
    fn from_binlog_config() {
        let mut config = BinlogConfig::default();
        config.username = "repl".to_string();
        config.password = "secret".to_string();
        config.set_port(Some(3307));
        config.read_timeout_ms = 1500;

        let opts = ConnectionOptions::from_config(&config);
        assert_eq!(opts.address(), "127.0.0.1:3307");
        assert_eq!(opts.username, "repl");
        assert_eq!(opts.read_timeout, Duration::from_millis(1500));
        assert!(opts.ssl_opts.is_none());
    }

    #[test]
    fn ssl_section_enables_tls() {
        let mut config = BinlogConfig::default();
        config.ssl = Some(SslConfig {
            root_cert_path: Some("/etc/mysql/ca.pem".to_string()),
            pkcs12_path: Some("/etc/mysql/client.p12".to_string()),
            pkcs12_password: Some("pw".to_string()),
            skip_domain_validation: true,
            accept_invalid_certs: false,
        });

        let ssl = ConnectionOptions::from_config(&config).ssl_opts.unwrap();
        assert!(ssl.skip_domain_validation);
        assert!(!ssl.accept_invalid_certs);
        assert_eq!(ssl.root_cert_path, Some(PathBuf::from("/etc/mysql/ca.pem")));
        let identity = ssl.client_identity.clone().unwrap();
        assert_eq!(identity.password.as_deref(), Some("pw"));
        // neither file exists
        assert!(ssl.connector().is_err());
    }
}
