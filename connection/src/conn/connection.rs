use std::net::TcpStream;
use std::time::Duration;

use openssl::rsa::{Padding, Rsa};
use tracing::{debug, info, instrument, trace};

use binlog::utils::read_len_enc_num_with_slice;
use common::err::decode_error::ReError;
use common::err::CResult;

use crate::bytes::{encrypt_password, xor};
use crate::commands::authenticate_command::AuthenticateCommand;
use crate::commands::query_command::QueryCommand;
use crate::commands::quit_command::QuitCommand;
use crate::commands::ssl_request_command::SslRequestCommand;
use crate::conn::connection_options::ConnectionOptions;
use crate::conn::packet_channel::PacketChannel;
use crate::conn::query_result::QueryResult;
use crate::declar::auth_plugin_names::{AuthPlugin, CACHING_SHA2_PASSWORD};
use crate::declar::capability_flags;
use crate::packet::auth_switch_packet::AuthPluginSwitchPacket;
use crate::packet::check_error_packet;
use crate::packet::end_of_file_packet::EndOfFilePacket;
use crate::packet::handshake_packet::HandshakePacket;
use crate::packet::ok_packet::OkPacket;
use crate::packet::response_type::ResponseType;
use crate::packet::result_set_column_packet::ResultSetColumnPacket;
use crate::packet::result_set_row_packet::ResultSetRowPacket;
use crate::{NULL_TERMINATOR, UTF8_MB4_GENERAL_CI};

/// What the schema catalog and the stream controller need from a server connection.
pub trait IConnection: Send {
    fn try_connect(&mut self) -> CResult<()>;

    fn is_connected(&self) -> bool;

    /// Statement returning a result set.
    fn query(&mut self, sql: &str) -> CResult<QueryResult>;

    /// Statement answered by an OK packet.
    fn execute(&mut self, sql: &str) -> CResult<()>;
}

/// Synchronous MySQL client connection: handshake, authentication and the text protocol.
#[derive(Debug)]
pub struct Connection {
    pub options: ConnectionOptions,

    channel: Option<PacketChannel>,

    server_version: String,
}

impl IConnection for Connection {
    #[instrument(skip(self), fields(address = %self.options.address()))]
    fn try_connect(&mut self) -> CResult<()> {
        self.close();

        let mut channel = PacketChannel::new(&self.options)?;
        let (packet, seq_num) = channel.read_packet()?;
        check_error_packet(&packet, "Initial handshake error.")?;
        let handshake = HandshakePacket::parse(&packet)?;

        let channel = self.authenticate(channel, &handshake, seq_num.wrapping_add(1))?;
        info!(
            "connected, server version {}, connection id {}",
            handshake.server_version, handshake.connection_id
        );

        self.server_version = handshake.server_version;
        self.channel = Some(channel);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    #[instrument(skip(self))]
    fn query(&mut self, sql: &str) -> CResult<QueryResult> {
        let command = QueryCommand::new(sql);
        self.write_command(&command.serialize()?)?;
        self.read_result_set()
    }

    #[instrument(skip(self))]
    fn execute(&mut self, sql: &str) -> CResult<()> {
        let command = QueryCommand::new(sql);
        self.write_command(&command.serialize()?)?;
        let packet = self.read_packet()?;
        check_error_packet(&packet, "Execute error.")?;
        if packet[0] == ResponseType::OK {
            let ok = OkPacket::parse(&packet)?;
            if ok.warnings > 0 {
                debug!("{} warnings after: {}", ok.warnings, sql);
            }
            trace!("status {:?}, info: {}", ok.status, ok.info);
            return Ok(());
        }
        if EndOfFilePacket::is_eof(&packet) {
            return Ok(());
        }
        // a statement that answered with rows, drain them
        self.read_result_set_from(packet).map(|_| ())
    }
}

impl Connection {
    pub fn new(options: ConnectionOptions) -> Self {
        Self {
            options,
            channel: None,
            server_version: String::new(),
        }
    }

    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    fn channel(&mut self) -> CResult<&mut PacketChannel> {
        self.channel
            .as_mut()
            .ok_or_else(|| ReError::ConnectionError(String::from("channel not found")))
    }

    /// New command, sequence restarts at 0. A failed write drops the channel.
    pub fn write_command(&mut self, payload: &[u8]) -> CResult<()> {
        let rs = self.channel()?.write_packet(payload, 0);
        if rs.is_err() {
            self.channel = None;
        }
        rs
    }

    /// Next packet payload. A failed read drops the channel.
    pub fn read_packet(&mut self) -> CResult<Vec<u8>> {
        let rs = self.channel()?.read_packet();
        match rs {
            Ok((packet, _)) if packet.is_empty() => {
                self.channel = None;
                Err(ReError::ConnectionError(String::from("empty packet")))
            }
            Ok((packet, _)) => Ok(packet),
            Err(e) => {
                self.channel = None;
                Err(e)
            }
        }
    }

    pub fn set_read_timeout(&mut self, timeout: Duration) -> CResult<()> {
        self.channel()?.set_read_timeout(timeout)
    }

    pub fn try_clone_stream(&mut self) -> CResult<TcpStream> {
        self.channel()?.try_clone_tcp()
    }

    /// COM_QUIT without waiting for the reply, then closes the socket.
    pub fn quit(&mut self) {
        if let Some(channel) = self.channel.as_mut() {
            let _ = channel.write_packet(&QuitCommand {}.serialize(), 0);
        }
        self.close();
    }

    pub fn close(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            let _ = channel.shutdown();
        }
    }

    fn read_result_set(&mut self) -> CResult<QueryResult> {
        let packet = self.read_packet()?;
        check_error_packet(&packet, "Query error.")?;
        if packet[0] == ResponseType::OK {
            return Ok(QueryResult::default());
        }
        self.read_result_set_from(packet)
    }

    /// `first` holds the column count.
    fn read_result_set_from(&mut self, first: Vec<u8>) -> CResult<QueryResult> {
        let column_count = read_len_enc_num_with_slice(&first)?.1 as usize;

        let mut columns = Vec::with_capacity(column_count);
        for _ in 0..column_count {
            let packet = self.read_packet()?;
            columns.push(ResultSetColumnPacket::parse(&packet)?.name);
        }

        let packet = self.read_packet()?;
        if !EndOfFilePacket::is_eof(&packet) {
            return Err(ReError::ConnectionError(String::from(
                "Expected EOF after column definitions.",
            )));
        }

        let mut rows = Vec::new();
        loop {
            let packet = self.read_packet()?;
            check_error_packet(&packet, "Query result set error.")?;
            if EndOfFilePacket::is_eof(&packet) {
                if let Ok(eof) = EndOfFilePacket::parse(&packet) {
                    if eof.warnings > 0 {
                        debug!("result set closed with {} warnings", eof.warnings);
                    }
                }
                break;
            }
            rows.push(ResultSetRowPacket::parse(&packet)?.cells);
        }
        debug!("result set: {} columns, {} rows", columns.len(), rows.len());

        Ok(QueryResult::new(columns, rows))
    }

    fn authenticate(
        &self,
        mut channel: PacketChannel,
        handshake: &HandshakePacket,
        mut seq_num: u8,
    ) -> CResult<PacketChannel> {
        let auth_plugin = self.get_auth_plugin(&handshake.auth_plugin_name)?;
        let auth_command =
            AuthenticateCommand::new(&self.options, &handshake.scramble, auth_plugin, UTF8_MB4_GENERAL_CI);

        let mut use_ssl = false;
        if self.options.ssl_opts.is_some() {
            let ssl_available = (handshake.server_capabilities & capability_flags::CLIENT_SSL) != 0;
            if !ssl_available {
                return Err(ReError::ConfigurationError(
                    "The server doesn't support SSL encryption".to_string(),
                ));
            }
            let ssl_command = SslRequestCommand::new(auth_command.client_capabilities, UTF8_MB4_GENERAL_CI);
            channel.write_packet(&ssl_command.serialize(), seq_num)?;
            seq_num = seq_num.wrapping_add(1);
            channel = channel.upgrade_to_ssl(&self.options)?;
            use_ssl = true;
        }

        channel.write_packet(&auth_command.serialize(), seq_num)?;
        let (packet, seq_num) = channel.read_packet()?;
        check_error_packet(&packet, "Authentication error.")?;

        match packet.first() {
            Some(&ResponseType::OK) => {}
            Some(&ResponseType::AUTH_PLUGIN_SWITCH) => {
                let switch_packet = AuthPluginSwitchPacket::parse(&packet[1..])?;
                self.handle_auth_plugin_switch(&mut channel, switch_packet, seq_num.wrapping_add(1), use_ssl)?;
            }
            _ => {
                self.authenticate_sha_256(
                    &mut channel,
                    &packet,
                    &handshake.scramble,
                    seq_num.wrapping_add(1),
                    use_ssl,
                )?;
            }
        }
        Ok(channel)
    }

    fn handle_auth_plugin_switch(
        &self,
        channel: &mut PacketChannel,
        switch_packet: AuthPluginSwitchPacket,
        seq_num: u8,
        use_ssl: bool,
    ) -> CResult<()> {
        debug!("auth plugin switch to {}", switch_packet.auth_plugin_name);
        let auth_plugin = self.get_auth_plugin(&switch_packet.auth_plugin_name)?;
        let token = encrypt_password(&self.options.password, &switch_packet.auth_plugin_data, &auth_plugin);
        channel.write_packet(&token, seq_num)?;
        let (packet, seq_num) = channel.read_packet()?;
        check_error_packet(&packet, "Authentication switch error.")?;

        if switch_packet.auth_plugin_name == CACHING_SHA2_PASSWORD && packet.first() != Some(&ResponseType::OK) {
            self.authenticate_sha_256(
                channel,
                &packet,
                &switch_packet.auth_plugin_data,
                seq_num.wrapping_add(1),
                use_ssl,
            )?;
        }
        Ok(())
    }

    /// caching_sha2_password after the scrambled password was sent.
    ///
    /// ref: https://dev.mysql.com/doc/dev/mysql-server/latest/page_caching_sha2_authentication_exchanges.html
    fn authenticate_sha_256(
        &self,
        channel: &mut PacketChannel,
        packet: &[u8],
        scramble: &[u8],
        seq_num: u8,
        use_ssl: bool,
    ) -> CResult<()> {
        if packet.len() < 2 || packet[0] != ResponseType::AUTH_MORE_DATA {
            return Err(ReError::ConnectionError(format!(
                "Unexpected authentication response {:?}",
                packet.first()
            )));
        }

        // fast auth success, the OK packet follows
        if packet[1] == 0x03 {
            let (packet, _) = channel.read_packet()?;
            check_error_packet(&packet, "Authentication error.")?;
            return Ok(());
        }

        let mut password = self.options.password.as_bytes().to_vec();
        password.push(NULL_TERMINATOR);

        // Send clear password if ssl is used.
        if use_ssl {
            channel.write_packet(&password, seq_num)?;
            let (packet, _seq_num) = channel.read_packet()?;
            check_error_packet(&packet, "Sending clear password error.")?;
            return Ok(());
        }

        // Request public key.
        channel.write_packet(&[0x02], seq_num)?;
        let (packet, seq_num) = channel.read_packet()?;
        check_error_packet(&packet, "Requesting caching_sha2_password public key.")?;

        // Extract public key.
        let public_key = &packet[1..];
        let encrypted_password = xor(&password, scramble);

        let rsa = Rsa::public_key_from_pem(public_key)
            .map_err(|e| ReError::ConnectionError(format!("load public_key error: {}", e)))?;
        let mut encrypted_body = vec![0u8; rsa.size() as usize];
        rsa.public_encrypt(&encrypted_password, &mut encrypted_body, Padding::PKCS1_OAEP)
            .map_err(|e| ReError::ConnectionError(format!("public_encrypt error: {}", e)))?;

        channel.write_packet(&encrypted_body, seq_num.wrapping_add(1))?;

        let (packet, _seq_num) = channel.read_packet()?;
        check_error_packet(&packet, "Authentication error.")?;
        Ok(())
    }

    fn get_auth_plugin(&self, auth_plugin_name: &str) -> CResult<AuthPlugin> {
        // servers without CLIENT_PLUGIN_AUTH only speak the native scheme
        if auth_plugin_name.is_empty() {
            return Ok(AuthPlugin::MySqlNativePassword);
        }
        AuthPlugin::from_name(auth_plugin_name).ok_or_else(|| {
            ReError::ConfigurationError(format!("{} auth plugin is not supported.", auth_plugin_name))
        })
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}
