use crate::bytes::{encrypt_password, write_null_term_string};
use crate::commands::ssl_request_command::response_header;
use crate::conn::connection_options::ConnectionOptions;
use crate::declar::auth_plugin_names::AuthPlugin;
use crate::declar::capability_flags;

/// HandshakeResponse41, the login packet.
///
/// Over TLS it is sent again after the SSLRequest, with the same header.
#[derive(Debug)]
pub struct AuthenticateCommand {
    pub client_capabilities: u32,
    client_collation: u8,
    username: String,
    database: Option<String>,
    /// scrambled password, empty for an empty password
    auth_response: Vec<u8>,
    auth_plugin: AuthPlugin,
}

impl AuthenticateCommand {
    pub fn new(options: &ConnectionOptions, scramble: &[u8], auth_plugin: AuthPlugin, client_collation: u8) -> Self {
        let mut client_capabilities = capability_flags::CLIENT_BASIC_FLAGS;
        if options.database.is_some() {
            client_capabilities |= capability_flags::CLIENT_CONNECT_WITH_DB;
        }
        if options.ssl_opts.is_some() {
            client_capabilities |= capability_flags::CLIENT_SSL;
        }

        AuthenticateCommand {
            client_capabilities,
            client_collation,
            username: options.username.clone(),
            database: options.database.clone(),
            auth_response: encrypt_password(&options.password, scramble, &auth_plugin),
            auth_plugin,
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = response_header(self.client_capabilities, self.client_collation);
        write_null_term_string(&mut buf, &self.username);

        // CLIENT_SECURE_CONNECTION: one length byte, scrambles are 20 or 32 bytes
        buf.push(self.auth_response.len() as u8);
        buf.extend_from_slice(&self.auth_response);

        if let Some(database) = &self.database {
            write_null_term_string(&mut buf, database);
        }
        write_null_term_string(&mut buf, self.auth_plugin.name());
        buf
    }
}
