use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::row::record_set::EventKind;

/// Stats sink fed by the event parser and the row decoder.
///
/// Every method has an empty default, implement only what you count.
pub trait EventStat: Send + Sync {
    /// TABLE_MAP event.
    fn process_table_map(&self, _table_id: u64, _table: &str, _database: &str) {}

    /// Every event except FORMAT_DESCRIPTION, ROTATE, HEARTBEAT and PREVIOUS_GTIDS.
    fn tick(&self, _when: u32) {}

    fn tick_format_description(&self) {}

    fn tick_query(&self) {}

    fn tick_rotate(&self) {}

    fn tick_xid(&self) {}

    /// Events that are recognized but not processed, and unknown codes.
    fn tick_other(&self) {}

    /// Rows event for a table without a registered callback, or filtered out.
    fn tick_modify_event_ignored(&self, _table_id: u64, _kind: EventKind) {}

    /// Rows event whose kind is outside the table's filter. Always followed by `tick_modify_event_ignored`.
    fn tick_modify_event_filtered(&self, _table_id: u64, _kind: EventKind) {}

    fn tick_modify_event_done(&self, _table_id: u64, _kind: EventKind) {}

    fn tick_modify_event_failed(&self, _table_id: u64, _kind: EventKind) {}

    /// One row delivered, with the time spent decoding it and running the callback.
    fn tick_modify_row_done(&self, _table_id: u64, _kind: EventKind, _nanos: u64) {}

    /// An error was caught in the streaming loop.
    fn tick_error(&self) {}
}

#[derive(Debug, Default)]
pub struct NoopEventStat;

impl EventStat for NoopEventStat {}

/// Atomic counters for every tick, used by the command line tool and the tests.
#[derive(Debug, Default)]
pub struct CountingEventStat {
    pub events: AtomicU64,
    pub last_when: AtomicU64,
    pub format_descriptions: AtomicU64,
    pub queries: AtomicU64,
    pub rotates: AtomicU64,
    pub xids: AtomicU64,
    pub others: AtomicU64,
    pub modify_ignored: AtomicU64,
    pub modify_filtered: AtomicU64,
    pub modify_done: AtomicU64,
    pub modify_failed: AtomicU64,
    pub rows_done: AtomicU64,
    pub rows_nanos: AtomicU64,
    pub errors: AtomicU64,

    /// table id -> `db.table` from the last TABLE_MAP
    table_names: Mutex<HashMap<u64, String>>,
}

impl CountingEventStat {
    pub fn new() -> Self {
        CountingEventStat::default()
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    pub fn table_name(&self, table_id: u64) -> Option<String> {
        self.table_names
            .lock()
            .ok()
            .and_then(|m| m.get(&table_id).cloned())
    }

    fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

impl EventStat for CountingEventStat {
    fn process_table_map(&self, table_id: u64, table: &str, database: &str) {
        if let Ok(mut m) = self.table_names.lock() {
            m.insert(table_id, format!("{}.{}", database, table));
        }
    }

    fn tick(&self, when: u32) {
        CountingEventStat::inc(&self.events);
        self.last_when.store(when as u64, Ordering::Relaxed);
    }

    fn tick_format_description(&self) {
        CountingEventStat::inc(&self.format_descriptions);
    }

    fn tick_query(&self) {
        CountingEventStat::inc(&self.queries);
    }

    fn tick_rotate(&self) {
        CountingEventStat::inc(&self.rotates);
    }

    fn tick_xid(&self) {
        CountingEventStat::inc(&self.xids);
    }

    fn tick_other(&self) {
        CountingEventStat::inc(&self.others);
    }

    fn tick_modify_event_ignored(&self, _table_id: u64, _kind: EventKind) {
        CountingEventStat::inc(&self.modify_ignored);
    }

    fn tick_modify_event_filtered(&self, _table_id: u64, _kind: EventKind) {
        CountingEventStat::inc(&self.modify_filtered);
    }

    fn tick_modify_event_done(&self, _table_id: u64, _kind: EventKind) {
        CountingEventStat::inc(&self.modify_done);
    }

    fn tick_modify_event_failed(&self, _table_id: u64, _kind: EventKind) {
        CountingEventStat::inc(&self.modify_failed);
    }

    fn tick_modify_row_done(&self, _table_id: u64, _kind: EventKind, nanos: u64) {
        CountingEventStat::inc(&self.rows_done);
        self.rows_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    fn tick_error(&self) {
        CountingEventStat::inc(&self.errors);
    }
}
