use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument, trace, warn};

use binlog::position::position::Position;
use binlog::processor::event_processor::{EventOutcome, EventProcessor, XidCallback};
use binlog::processor::master_info::MasterInfo;
use binlog::row::record_set::EventKind;
use binlog::schema::catalog::SchemaCatalog;
use binlog::schema::table::TableCallback;
use binlog::state::ext_state::ExtState;
use binlog::stats::EventStat;
use common::config::BinlogConfig;
use common::err::decode_error::ReError;
use common::err::CResult;

use crate::catalog::MysqlSchemaCatalog;
use crate::commands::dump_binlog_command::DumpBinlogCommand;
use crate::commands::dump_binlog_gtid_command::DumpBinlogGtidCommand;
use crate::commands::register_slave_command::RegisterSlaveCommand;
use crate::conn::configure::{
    check_binlog_format, checksum_handshake, generate_slave_id, gtid_mode, last_binlog_pos, master_version,
    set_master_heartbeat, slave_id_seed,
};
use crate::conn::connection::{Connection, IConnection};
use crate::conn::connection_options::ConnectionOptions;
use crate::packet::check_error_packet;
use crate::packet::end_of_file_packet::EndOfFilePacket;
use crate::packet::response_type::ResponseType;
use crate::slave::shutdown::ShutdownHandle;
use crate::TIMEOUT_LATENCY_DELTA;

/// Replication settings on top of the connection ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlaveOptions {
    /// pause between connection attempts
    pub connect_retry: Duration,
    /// zero leaves the master default
    pub heartbeat_interval: Duration,
    /// COM_REGISTER_SLAVE host, the local host name when `None`
    pub report_host: Option<String>,
    /// dump by GTID set
    pub gtid_mode: bool,
    /// used when no position is stored yet
    pub start_position: Option<Position>,
    /// stream ends at the first commit at or past it
    pub stop_position: Option<Position>,
}

impl Default for SlaveOptions {
    fn default() -> Self {
        SlaveOptions {
            connect_retry: Duration::from_secs(10),
            heartbeat_interval: Duration::ZERO,
            report_host: None,
            gtid_mode: false,
            start_position: None,
            stop_position: None,
        }
    }
}

impl SlaveOptions {
    pub fn from_config(config: &BinlogConfig) -> CResult<SlaveOptions> {
        let start_position = if config.has_start_position() {
            Some(position_of(config.file.as_deref(), config.position, config.gtid.as_deref())?)
        } else {
            None
        };
        let stop_position = if config.has_stop_position() {
            Some(position_of(
                config.stop_file.as_deref(),
                config.stop_position,
                config.stop_gtid.as_deref(),
            )?)
        } else {
            None
        };

        Ok(SlaveOptions {
            connect_retry: Duration::from_secs(config.connect_retry_secs),
            heartbeat_interval: Duration::from_millis(config.heartbeat_interval_ms),
            report_host: config.report_host.clone(),
            gtid_mode: config.gtid_mode,
            start_position,
            stop_position,
        })
    }
}

fn position_of(file: Option<&str>, pos: Option<u64>, gtid: Option<&str>) -> CResult<Position> {
    let mut position = Position::new(file.unwrap_or_default(), pos.unwrap_or(0));
    if let Some(text) = gtid {
        position.parse_gtid(text)?;
    }
    Ok(position)
}

fn local_host_name() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/proc/sys/kernel/hostname").ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Binlog stream controller.
///
/// `init` checks the master and loads the subscribed tables, `get_remote_binlog` then streams
/// until a stop position, a fatal error or `ShutdownHandle::cancel`. Connection loss is retried
/// from the last committed position.
pub struct Slave {
    options: ConnectionOptions,
    slave_options: SlaveOptions,
    processor: EventProcessor,
    server_id: u32,
    gtid_enabled: bool,
    shutdown: ShutdownHandle,
}

impl Slave {
    pub fn new(
        options: ConnectionOptions,
        slave_options: SlaveOptions,
        ext_state: Arc<dyn ExtState>,
        stats: Arc<dyn EventStat>,
    ) -> Self {
        let catalog = Box::new(MysqlSchemaCatalog::new(options.clone()));
        Slave::with_catalog(options, slave_options, catalog, ext_state, stats)
    }

    pub fn with_catalog(
        options: ConnectionOptions,
        slave_options: SlaveOptions,
        catalog: Box<dyn SchemaCatalog>,
        ext_state: Arc<dyn ExtState>,
        stats: Arc<dyn EventStat>,
    ) -> Self {
        Slave {
            options,
            slave_options,
            processor: EventProcessor::new(catalog, ext_state, stats),
            server_id: 0,
            gtid_enabled: false,
            shutdown: ShutdownHandle::new(),
        }
    }

    /// Connection and replication settings from the `[binlog]` section, with its table subscriptions
    /// still to be attached through `set_callback`.
    pub fn from_config(config: &BinlogConfig, ext_state: Arc<dyn ExtState>, stats: Arc<dyn EventStat>) -> CResult<Self> {
        let options = ConnectionOptions::from_config(config);
        let slave_options = SlaveOptions::from_config(config)?;
        Ok(Slave::new(options, slave_options, ext_state, stats))
    }

    pub fn set_callback(&mut self, db_name: &str, tbl_name: &str, callback: TableCallback, filter: EventKind) {
        self.processor.set_callback(db_name, tbl_name, callback, filter);
    }

    pub fn set_xid_callback(&mut self, callback: XidCallback) {
        self.processor.set_xid_callback(callback);
    }

    pub fn server_id(&self) -> u32 {
        self.server_id
    }

    pub fn master_info(&self) -> &MasterInfo {
        self.processor.master_info()
    }

    pub fn processor(&self) -> &EventProcessor {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut EventProcessor {
        &mut self.processor
    }

    pub fn ext_state(&self) -> &Arc<dyn ExtState> {
        self.processor.ext_state()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Stops the stream from the owning thread. Other threads use `shutdown_handle`.
    pub fn close_connection(&self) {
        self.shutdown.cancel();
    }

    #[instrument(skip(self), fields(address = %self.options.address()))]
    pub fn init(&mut self) -> CResult<()> {
        let mut conn = Connection::new(self.options.clone());
        conn.try_connect()?;
        let rs = self.init_with(&mut conn);
        conn.quit();
        rs
    }

    /// Master checks and table loading over an open connection.
    pub fn init_with(&mut self, conn: &mut dyn IConnection) -> CResult<()> {
        let version = master_version(conn)?;
        self.processor.master_info_mut().set_master_version(version);
        check_binlog_format(conn)?;
        let gtid_on = gtid_mode(conn)?;
        self.processor.master_info_mut().gtid_mode = gtid_on;

        self.server_id = generate_slave_id(conn, slave_id_seed())?;

        if self.slave_options.gtid_mode {
            self.enable_gtid(true)?;
        }

        if let Some(start) = self.slave_options.start_position.clone() {
            if self.ext_state().get_master_position()?.is_none() {
                info!("Starting from the configured position {}", start);
                self.ext_state().set_master_position(&start);
            }
        }

        self.processor.create_database_structure()
    }

    /// GTID dump needs `gtid_mode = ON` on the master, known after `init`.
    pub fn enable_gtid(&mut self, enabled: bool) -> CResult<()> {
        if enabled && !self.processor.master_info().gtid_mode {
            return Err(ReError::ConfigurationError(
                "GTID mode requested but gtid_mode is not ON on the master".to_string(),
            ));
        }
        self.gtid_enabled = enabled;
        Ok(())
    }

    pub fn gtid_enabled(&self) -> bool {
        self.gtid_enabled
    }

    /// `SHOW MASTER STATUS` over a short lived connection.
    pub fn get_last_binlog_pos(&self) -> CResult<Position> {
        let mut conn = Connection::new(self.options.clone());
        conn.try_connect()?;
        let rs = last_binlog_pos(&mut conn);
        conn.quit();
        rs
    }

    /// Streams until the stop position, a fatal error, or a cancel.
    #[instrument(skip(self), fields(server_id = self.server_id))]
    pub fn get_remote_binlog(&mut self) -> CResult<()> {
        let rs = self.run_sessions();
        if let Err(e) = &rs {
            error!("binlog stream failed: {}", e);
        }
        warn!("Binlog monitor was stopped. Binlog events are not listened.");
        rs
    }

    fn run_sessions(&mut self) -> CResult<()> {
        while !self.shutdown.is_interrupted() {
            let mut conn = match self.connect_with_retry()? {
                Some(conn) => conn,
                None => break,
            };

            let rs = self.read_events(&mut conn);
            self.shutdown.detach();
            match rs {
                Ok(()) => {
                    conn.quit();
                    break;
                }
                Err(e) if self.shutdown.is_interrupted() => {
                    debug!("stream ended by shutdown: {}", e);
                    conn.close();
                    break;
                }
                Err(e) if e.is_fatal() => {
                    conn.quit();
                    return Err(e);
                }
                Err(e) => {
                    error!("Error reading packet from server: {}, reconnecting", e);
                    self.processor.stats().tick_error();
                    conn.close();
                    self.processor.reset_for_reconnect();
                }
            }
        }
        Ok(())
    }

    /// `None` when interrupted before a session could be opened.
    fn connect_with_retry(&mut self) -> CResult<Option<Connection>> {
        loop {
            if self.shutdown.is_interrupted() {
                return Ok(None);
            }
            self.ext_state().set_connecting();
            match self.open_session() {
                Ok(conn) => return Ok(Some(conn)),
                Err(e) => {
                    self.shutdown.detach();
                    if e.is_fatal() {
                        return Err(e);
                    }
                    error!("Couldn't connect to mysql master {}: {}", self.options.address(), e);
                    if !self.shutdown.sleep(self.slave_options.connect_retry) {
                        return Ok(None);
                    }
                }
            }
        }
    }

    fn stream_options(&self) -> ConnectionOptions {
        let mut options = self.options.clone();
        let heartbeat = self.slave_options.heartbeat_interval;
        if !heartbeat.is_zero() {
            options.read_timeout = options.read_timeout.max(heartbeat + TIMEOUT_LATENCY_DELTA);
        }
        options
    }

    /// Connect, register, negotiate the checksum and send the dump request.
    fn open_session(&mut self) -> CResult<Connection> {
        let mut conn = Connection::new(self.stream_options());
        conn.try_connect()?;
        self.shutdown.attach(conn.try_clone_stream()?);

        self.register_slave_on_master(&mut conn)?;

        let checksum = checksum_handshake(&mut conn)?;
        self.processor.master_info_mut().checksum = checksum;

        let heartbeat = self.slave_options.heartbeat_interval;
        if !heartbeat.is_zero() {
            set_master_heartbeat(&mut conn, heartbeat)?;
        }

        let position = match self.ext_state().get_master_position()? {
            Some(pos) => pos,
            None => {
                info!("There is no saved binlog position, starting from the end of the master log");
                let pos = last_binlog_pos(&mut conn)?;
                self.ext_state().set_master_position(&pos);
                self.ext_state().save_master_position()?;
                pos
            }
        };
        info!("Starting from binlog_pos: {}", position);
        self.processor.set_position(position.clone());

        self.request_dump(&mut conn, &position)?;
        Ok(conn)
    }

    fn register_slave_on_master(&self, conn: &mut Connection) -> CResult<()> {
        let host = self.slave_options.report_host.clone().unwrap_or_else(local_host_name);
        let command = RegisterSlaveCommand::new(self.server_id, &host);
        conn.write_command(&command.serialize()?)?;

        let packet = conn.read_packet()?;
        check_error_packet(&packet, "Unable to register slave.")?;
        debug!("registered as slave {} ({})", self.server_id, host);
        Ok(())
    }

    fn request_dump(&self, conn: &mut Connection, position: &Position) -> CResult<()> {
        let payload = if self.gtid_enabled {
            DumpBinlogGtidCommand::new(self.server_id, position.encode_gtid()?).serialize()?
        } else {
            DumpBinlogCommand::new(self.server_id, &position.log_name, position.log_pos).serialize()?
        };
        conn.write_command(&payload)
    }

    fn reached_stop_position(&self) -> bool {
        self.slave_options
            .stop_position
            .as_ref()
            .map_or(false, |stop| self.processor.position().reached_other_pos(stop))
    }

    /// Event loop of one session. Ok only at the stop position or on shutdown.
    fn read_events(&mut self, conn: &mut Connection) -> CResult<()> {
        let ext_state = self.ext_state().clone();
        let mut count_packet: u64 = 0;

        while !self.shutdown.is_interrupted() {
            ext_state.set_state_processing(false);
            let packet = conn.read_packet()?;
            ext_state.set_state_processing(true);

            count_packet += 1;
            trace!("Got event with length: {} Packet number: {}", packet.len(), count_packet);

            match packet[0] {
                ResponseType::OK => {}
                ResponseType::ERROR => return check_error_packet(&packet, "Error reading packet from server."),
                ResponseType::END_OF_FILE if EndOfFilePacket::is_eof(&packet) => {
                    warn!("read_event(): end of data");
                    continue;
                }
                other => {
                    return Err(ReError::CorruptEvent(format!(
                        "unexpected first byte {:#04x} in binlog packet",
                        other
                    )))
                }
            }

            match self.processor.process_packet(&packet[1..]) {
                Ok(EventOutcome::Committed) => {
                    if let Err(e) = ext_state.save_master_position() {
                        warn!("could not save binlog position: {}", e);
                    }
                    if self.reached_stop_position() {
                        info!("Stop position reached at {}", self.processor.position());
                        return Ok(());
                    }
                }
                Ok(_) => {}
                Err(e) if e.requires_reconnect() || e.is_fatal() => return Err(e),
                Err(e) => {
                    error!("Met exception in get_remote_binlog cycle. Message: {}", e);
                    self.processor.stats().tick_error();
                }
            }
        }
        Ok(())
    }
}
