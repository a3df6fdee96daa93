use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, info, trace};

use common::err::CResult;

use crate::column::{
    MYSQL_TYPE_DATETIME, MYSQL_TYPE_DATETIME2, MYSQL_TYPE_TIME, MYSQL_TYPE_TIME2, MYSQL_TYPE_TIMESTAMP,
    MYSQL_TYPE_TIMESTAMP2,
};
use crate::events::event_header::BasicEventInfo;
use crate::events::event_type::{EventDisposition, LogEventType};
use crate::events::gtid_event::GtidEvent;
use crate::events::log_event::read_log_event;
use crate::events::query_event::QueryEvent;
use crate::events::rotate_event::RotateEvent;
use crate::events::rows_event::RowEventInfo;
use crate::events::table_map_event::TableMapEvent;
use crate::events::MYSQL_TEMPORAL_NEW_STORAGE_VERSION;
use crate::position::position::{Gtid, Position};
use crate::processor::master_info::MasterInfo;
use crate::row::record_set::EventKind;
use crate::row::unpack::apply_row_event;
use crate::schema::catalog::{create_table, SchemaCatalog};
use crate::schema::ddl::check_alter_or_create_query;
use crate::schema::relay_log_info::{RelayLogInfo, TableKey};
use crate::schema::table::TableCallback;
use crate::state::ext_state::ExtState;
use crate::stats::EventStat;

/// Called with the originating server id at every commit boundary.
pub type XidCallback = Arc<dyn Fn(u32) + Send + Sync>;

/// What one binlog event amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// recognized but not processed, or unknown
    Skipped,
    Processed,
    /// XID or a committing QUERY; the position is safe to persist
    Committed,
}

/// Turns raw binlog events into position updates and table callbacks.
///
/// Everything here runs on the streaming thread, one event at a time in log order.
pub struct EventProcessor {
    rli: RelayLogInfo,
    table_order: BTreeSet<TableKey>,
    callbacks: HashMap<TableKey, TableCallback>,
    filters: HashMap<TableKey, EventKind>,
    xid_callback: Option<XidCallback>,

    master_info: MasterInfo,
    /// GTID of the transaction in progress, added to the position at its commit
    gtid_next: Option<Gtid>,

    catalog: Box<dyn SchemaCatalog>,
    ext_state: Arc<dyn ExtState>,
    stats: Arc<dyn EventStat>,
}

impl EventProcessor {
    pub fn new(catalog: Box<dyn SchemaCatalog>, ext_state: Arc<dyn ExtState>, stats: Arc<dyn EventStat>) -> Self {
        EventProcessor {
            rli: RelayLogInfo::new(),
            table_order: BTreeSet::new(),
            callbacks: HashMap::new(),
            filters: HashMap::new(),
            xid_callback: None,
            master_info: MasterInfo::default(),
            gtid_next: None,
            catalog,
            ext_state,
            stats,
        }
    }

    /// Subscribes to the rows of `db_name.tbl_name` whose kind passes `filter`.
    pub fn set_callback(&mut self, db_name: &str, tbl_name: &str, callback: TableCallback, filter: EventKind) {
        let key = (db_name.to_string(), tbl_name.to_string());
        self.table_order.insert(key.clone());
        self.callbacks.insert(key.clone(), callback);
        self.filters.insert(key, filter);
    }

    pub fn set_xid_callback(&mut self, callback: XidCallback) {
        self.xid_callback = Some(callback);
    }

    pub fn table_order(&self) -> &BTreeSet<TableKey> {
        &self.table_order
    }

    pub fn relay_log_info(&self) -> &RelayLogInfo {
        &self.rli
    }

    pub fn master_info(&self) -> &MasterInfo {
        &self.master_info
    }

    pub fn master_info_mut(&mut self) -> &mut MasterInfo {
        &mut self.master_info
    }

    pub fn position(&self) -> &Position {
        &self.master_info.position
    }

    pub fn set_position(&mut self, pos: Position) {
        self.master_info.position = pos;
    }

    pub fn ext_state(&self) -> &Arc<dyn ExtState> {
        &self.ext_state
    }

    pub fn stats(&self) -> &Arc<dyn EventStat> {
        &self.stats
    }

    pub fn catalog_mut(&mut self) -> &mut dyn SchemaCatalog {
        self.catalog.as_mut()
    }

    /// Loads every subscribed table from the catalog and attaches its callback and filter.
    pub fn create_database_structure(&mut self) -> CResult<()> {
        let order: Vec<TableKey> = self.table_order.iter().cloned().collect();
        self.create_tables(&order)
    }

    fn create_tables(&mut self, keys: &[TableKey]) -> CResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        debug!("Start createDatabaseStructure for {} tables", keys.len());

        let collate_map = self.catalog.collate_map()?;
        for (db_name, tbl_name) in keys {
            let mut table = create_table(
                self.catalog.as_mut(),
                db_name,
                tbl_name,
                &collate_map,
                self.master_info.is_old_storage,
            )?;

            let key = (db_name.clone(), tbl_name.clone());
            table.callback = self.callbacks.get(&key).cloned();
            table.filter = self.filters.get(&key).copied().unwrap_or_default();

            self.ext_state.init_table_count(&table.full_name);
            info!("loaded table {} with {} columns", table.full_name, table.column_count());
            self.rli.set_table(table);
        }
        Ok(())
    }

    /// New connection: table ids and the staged GTID belong to the old one.
    pub fn reset_for_reconnect(&mut self) {
        self.rli.clear();
        self.gtid_next = None;
    }

    /// Validates and applies one event, the dump packet without its leading OK byte.
    ///
    /// Protocol errors come from the frame checks and mean the connection must be dropped.
    /// Other errors only abandon this event.
    pub fn process_packet(&mut self, buf: &[u8]) -> CResult<EventOutcome> {
        let master_ge_56 = self.master_info.master_ge_56();
        let (info, disposition) =
            read_log_event(buf, master_ge_56, &mut self.master_info.checksum, self.stats.as_ref())?;

        if disposition != EventDisposition::Proceed {
            trace!("Skipping event {:?}", info.event_type);
            return Ok(EventOutcome::Skipped);
        }

        trace!("Event log position: {}", info.log_pos);
        if info.log_pos != 0 {
            self.master_info.position.log_pos = info.log_pos as u64;
            self.ext_state.set_last_event_time_pos(info.when as i64, info.log_pos as u64);
        }

        let mut outcome = EventOutcome::Processed;

        match info.event_type {
            LogEventType::XID_EVENT => {
                self.commit(info.server_id);
                outcome = EventOutcome::Committed;
            }
            LogEventType::QUERY_EVENT => {
                let qe = QueryEvent::parse(&info)?;
                trace!("Received QUERY_EVENT: {}", qe.query);
                // the position only moves past a DDL once its table is reloaded,
                // a failed reload is replayed after reconnect
                self.check_ddl(&qe)?;
                // BEGIN opens a transaction, anything else on its own commits
                if !qe.query.trim().eq_ignore_ascii_case("BEGIN") {
                    self.commit(info.server_id);
                    outcome = EventOutcome::Committed;
                }
            }
            LogEventType::ROTATE_EVENT => {
                let re = RotateEvent::parse(&info)?;
                info!("Got rotate event to {}:{}", re.next_binlog, re.position);
                self.master_info.position.log_name = re.next_binlog;
                self.master_info.position.log_pos = re.position;
                self.ext_state.set_master_position(&self.master_info.position);
            }
            LogEventType::GTID_LOG_EVENT => {
                if let Some(gtid) = self.gtid_next.take() {
                    self.master_info.position.add_gtid(&gtid);
                    self.ext_state.set_master_position(&self.master_info.position);
                }
                let ge = GtidEvent::parse(&info)?;
                trace!("GTID_NEXT: sid = {}, gno = {}", ge.sid, ge.gno);
                self.gtid_next = Some((ge.sid, ge.gno));
            }
            _ => {}
        }

        self.process_event(&info)?;
        Ok(outcome)
    }

    fn commit(&mut self, server_id: u32) {
        if let Some(gtid) = self.gtid_next.take() {
            self.master_info.position.add_gtid(&gtid);
        }
        self.ext_state.set_master_position(&self.master_info.position);
        trace!("commit, binlog pos: {}", self.master_info.position);

        if let Some(cb) = &self.xid_callback {
            cb(server_id);
        }
    }

    fn process_event(&mut self, info: &BasicEventInfo) -> CResult<()> {
        match info.event_type {
            LogEventType::TABLE_MAP_EVENT => {
                let tme = TableMapEvent::parse(info)?;
                self.apply_table_map(&tme);
            }
            t if t.is_rows_event() => {
                let roi = RowEventInfo::parse(info)?;
                apply_row_event(&self.rli, info, &roi, self.ext_state.as_ref(), self.stats.as_ref())?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Reloads a subscribed table after ALTER TABLE / CREATE TABLE.
    ///
    /// A schema-qualified statement names its table's database, otherwise the
    /// session database of the event applies.
    fn check_ddl(&mut self, qe: &QueryEvent) -> CResult<()> {
        if let Some((db_name, tbl_name)) = check_alter_or_create_query(&qe.query) {
            let key = (db_name.unwrap_or_else(|| qe.db_name.clone()), tbl_name);
            if self.table_order.contains(&key) {
                debug!("Rebuilding database structure for {}.{}", key.0, key.1);
                self.create_tables(&[key])?;
            }
        }
        Ok(())
    }

    fn apply_table_map(&mut self, tme: &TableMapEvent) {
        self.rli
            .set_table_name(tme.table_id, &tme.table_name, &tme.database_name);

        if self.master_info.master_version >= MYSQL_TEMPORAL_NEW_STORAGE_VERSION {
            if let Some(table) = self.rli.get_table_mut(&tme.database_name, &tme.table_name) {
                if table.fields.len() == tme.column_types.len() {
                    for (field, t) in table.fields.iter_mut().zip(tme.column_types.iter()) {
                        match *t {
                            MYSQL_TYPE_TIMESTAMP | MYSQL_TYPE_DATETIME | MYSQL_TYPE_TIME => {
                                field.reset_temporal(true);
                            }
                            MYSQL_TYPE_TIMESTAMP2 | MYSQL_TYPE_DATETIME2 | MYSQL_TYPE_TIME2 => {
                                field.reset_temporal(false);
                            }
                            _ => {}
                        }
                    }
                }
            }
        }

        self.stats
            .process_table_map(tme.table_id, &tme.table_name, &tme.database_name);
    }
}
