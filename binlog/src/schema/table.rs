use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use common::err::CResult;

use crate::column::field::Field;
use crate::row::record_set::{EventKind, RecordSet};
use crate::state::ext_state::ExtState;

/// User callback for the changed rows of one table.
pub type TableCallback = Arc<dyn Fn(&RecordSet) -> CResult<()> + Send + Sync>;

/// A tracked table: its columns in `SHOW FULL COLUMNS` order, the callback and the event filter.
pub struct Table {
    pub database_name: String,
    pub table_name: String,
    /// `db.table`
    pub full_name: String,
    pub fields: Vec<Field>,

    pub callback: Option<TableCallback>,
    pub filter: EventKind,
}

impl Table {
    pub fn new(database_name: &str, table_name: &str) -> Self {
        Table {
            database_name: database_name.to_string(),
            table_name: table_name.to_string(),
            full_name: format!("{}.{}", database_name, table_name),
            fields: Vec::new(),
            callback: None,
            filter: EventKind::ALL,
        }
    }

    pub fn with_fields(database_name: &str, table_name: &str, fields: Vec<Field>) -> Self {
        let mut t = Table::new(database_name, table_name);
        t.fields = fields;
        t
    }

    pub fn column_count(&self) -> usize {
        self.fields.len()
    }

    pub fn should_process(&self, kind: EventKind) -> bool {
        self.filter.should_process(kind)
    }

    /// Counts the row against the table and hands it to the callback.
    pub fn call_callback(&self, rs: &RecordSet, ext_state: &dyn ExtState) -> CResult<()> {
        ext_state.inc_table_count(&self.full_name);
        ext_state.set_last_filtered_update_time();

        match &self.callback {
            Some(cb) => cb(rs),
            None => Ok(()),
        }
    }
}

impl Debug for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("full_name", &self.full_name)
            .field("fields", &self.fields)
            .field("callback", &self.callback.is_some())
            .field("filter", &self.filter)
            .finish()
    }
}
