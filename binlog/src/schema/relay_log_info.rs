use std::collections::HashMap;

use tracing::debug;

use crate::schema::table::Table;

/// (database, table)
pub type TableKey = (String, String);

/// Tracked tables by name, plus the connection scoped table id -> name mapping
/// learned from TABLE_MAP events.
#[derive(Debug, Default)]
pub struct RelayLogInfo {
    tables: HashMap<TableKey, Table>,
    table_ids: HashMap<u64, TableKey>,
}

impl RelayLogInfo {
    pub fn new() -> Self {
        RelayLogInfo::default()
    }

    /// Replaces any table with the same name.
    pub fn set_table(&mut self, table: Table) {
        let key = (table.database_name.clone(), table.table_name.clone());
        self.tables.insert(key, table);
    }

    pub fn set_table_name(&mut self, table_id: u64, table_name: &str, db_name: &str) {
        self.table_ids
            .insert(table_id, (db_name.to_string(), table_name.to_string()));
    }

    pub fn get_table_name(&self, table_id: u64) -> Option<&TableKey> {
        self.table_ids.get(&table_id)
    }

    pub fn get_table(&self, db_name: &str, table_name: &str) -> Option<&Table> {
        self.tables.get(&(db_name.to_string(), table_name.to_string()))
    }

    pub fn get_table_mut(&mut self, db_name: &str, table_name: &str) -> Option<&mut Table> {
        self.tables.get_mut(&(db_name.to_string(), table_name.to_string()))
    }

    pub fn get_table_by_id(&self, table_id: u64) -> Option<&Table> {
        self.table_ids.get(&table_id).and_then(|key| self.tables.get(key))
    }

    pub fn get_table_by_id_mut(&mut self, table_id: u64) -> Option<&mut Table> {
        match self.table_ids.get(&table_id) {
            Some(key) => self.tables.get_mut(key),
            None => None,
        }
    }

    pub fn table_keys(&self) -> Vec<TableKey> {
        self.tables.keys().cloned().collect()
    }

    /// Forgets the table ids. Must run once per new connection, the server reassigns them.
    pub fn clear(&mut self) {
        debug!("clearing {} table ids", self.table_ids.len());
        self.table_ids.clear();
    }

    /// Drops the tracked tables as well as the ids.
    pub fn clear_tables(&mut self) {
        self.clear();
        self.tables.clear();
    }
}
