use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use binlog::column::collation::{build_collate_map, CollateMap};
use binlog::events::checksum_type::ChecksumType;
use binlog::position::position::Position;
use binlog::processor::event_processor::{EventOutcome, EventProcessor};
use binlog::row::record_set::{EventKind, RecordSet};
use binlog::schema::catalog::{ColumnRow, MemorySchemaCatalog, SchemaCatalog};
use binlog::schema::table::TableCallback;
use binlog::state::ext_state::{DefaultExtState, ExtState};
use binlog::stats::CountingEventStat;
use common::err::decode_error::ReError;
use common::err::CResult;

use crate::event_builder::EventBuilder;

pub const SID: &str = "3e11fa4771ca11e19e33c80aa9429562";
pub const ORDERS_ID: u64 = 70;

/// Catalog the test keeps a handle on, to change a table between DDL events
/// or to take it offline.
#[derive(Debug, Clone, Default)]
pub struct SharedCatalog {
    tables: Arc<Mutex<MemorySchemaCatalog>>,
    offline: Arc<AtomicBool>,
}

impl SharedCatalog {
    pub fn new(catalog: MemorySchemaCatalog) -> Self {
        SharedCatalog {
            tables: Arc::new(Mutex::new(catalog)),
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_columns(&self, db_name: &str, tbl_name: &str, columns: Vec<ColumnRow>) {
        self.lock().set_columns(db_name, tbl_name, columns);
    }

    /// While offline every lookup fails the way a dropped catalog connection does.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> CResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ReError::ConnectionError("catalog connection lost".to_string()));
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, MemorySchemaCatalog> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SchemaCatalog for SharedCatalog {
    fn collate_map(&mut self) -> CResult<CollateMap> {
        self.check_online()?;
        self.lock().collate_map()
    }

    fn columns(&mut self, db_name: &str, tbl_name: &str) -> CResult<Vec<ColumnRow>> {
        self.check_online()?;
        self.lock().columns(db_name, tbl_name)
    }
}

pub fn collations() -> CollateMap {
    build_collate_map(
        vec![
            ("utf8mb4_general_ci".to_string(), "utf8mb4".to_string()),
            ("latin1_swedish_ci".to_string(), "latin1".to_string()),
        ],
        vec![("utf8mb4".to_string(), 4), ("latin1".to_string(), 1)],
    )
}

/// `shop.orders (id int)`.
pub fn orders_catalog() -> SharedCatalog {
    let catalog = SharedCatalog::new(MemorySchemaCatalog::new(collations()));
    catalog.set_columns("shop", "orders", vec![ColumnRow::new("id", "int(11)", None)]);
    catalog
}

/// Collects every delivered row.
pub fn collector(rows: &Arc<Mutex<Vec<RecordSet>>>) -> TableCallback {
    let rows = rows.clone();
    Arc::new(move |rs: &RecordSet| {
        rows.lock().unwrap_or_else(|e| e.into_inner()).push(rs.clone());
        Ok(())
    })
}

/// An event processor subscribed to `shop.orders`, positioned at `mysql-bin.000001:4`.
pub struct Fixture {
    pub processor: EventProcessor,
    pub catalog: SharedCatalog,
    pub ext_state: Arc<DefaultExtState>,
    pub stats: Arc<CountingEventStat>,
    pub rows: Arc<Mutex<Vec<RecordSet>>>,
    pub commits: Arc<Mutex<Vec<u32>>>,
    pub builder: EventBuilder,
}

impl Fixture {
    pub fn new(filter: EventKind) -> Fixture {
        Fixture::with_builder(EventBuilder::new(), 50744, filter)
    }

    pub fn with_builder(builder: EventBuilder, master_version: u32, filter: EventKind) -> Fixture {
        let catalog = orders_catalog();
        let ext_state = Arc::new(DefaultExtState::in_memory());
        let stats = Arc::new(CountingEventStat::new());
        let rows = Arc::new(Mutex::new(Vec::new()));
        let commits = Arc::new(Mutex::new(Vec::new()));

        let mut processor = EventProcessor::new(Box::new(catalog.clone()), ext_state.clone(), stats.clone());
        processor.master_info_mut().set_master_version(master_version);
        processor.master_info_mut().checksum = if builder.checksum {
            ChecksumType::Crc32
        } else {
            ChecksumType::None
        };
        processor.set_position(Position::new("mysql-bin.000001", 4));
        processor.set_callback("shop", "orders", collector(&rows), filter);

        let c = commits.clone();
        processor.set_xid_callback(Arc::new(move |server_id| {
            c.lock().unwrap_or_else(|e| e.into_inner()).push(server_id);
        }));
        processor
            .create_database_structure()
            .expect("shop.orders is in the catalog");

        Fixture {
            processor,
            catalog,
            ext_state,
            stats,
            rows,
            commits,
            builder,
        }
    }

    pub fn feed(&mut self, event: &[u8]) -> CResult<EventOutcome> {
        self.processor.process_packet(event)
    }

    /// Feeds the fake rotate and the format description a new dump starts with.
    pub fn start(&mut self) {
        let rotate = self.builder.rotate("mysql-bin.000001", 4);
        self.feed(&rotate).expect("rotate");
        let fde = self.builder.format_description();
        self.feed(&fde).expect("format description");
    }

    pub fn rows(&self) -> Vec<RecordSet> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn commits(&self) -> usize {
        self.commits.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn committed(&self) -> Option<Position> {
        self.ext_state.get_master_position().expect("memory store")
    }
}
