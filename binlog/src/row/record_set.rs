use std::collections::BTreeMap;

use bitflags::bitflags;
use serde::Serialize;

use common::err::decode_error::ReError;
use common::err::CResult;

use crate::column::column_value::ColumnValue;

bitflags! {
    /// Row event kinds a table subscribes to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventKind: u8 {
        const INSERT = 1;
        const UPDATE = 1 << 1;
        const DELETE = 1 << 2;
        const ALL = Self::INSERT.bits() | Self::UPDATE.bits() | Self::DELETE.bits();
    }
}

impl Default for EventKind {
    fn default() -> Self {
        EventKind::ALL
    }
}

impl EventKind {
    /// `["insert", "delete"]` -> INSERT | DELETE. An empty list means every kind.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> CResult<EventKind> {
        if names.is_empty() {
            return Ok(EventKind::ALL);
        }

        names.iter().try_fold(EventKind::empty(), |acc, name| {
            let kind = match name.as_ref().trim().to_ascii_lowercase().as_str() {
                "insert" | "write" => EventKind::INSERT,
                "update" => EventKind::UPDATE,
                "delete" => EventKind::DELETE,
                "all" => EventKind::ALL,
                other => {
                    return Err(ReError::ConfigurationError(format!(
                        "unknown event kind '{}'",
                        other
                    )))
                }
            };
            Ok(acc | kind)
        })
    }

    /// The filter passes only when every bit of `kind` is enabled.
    pub fn should_process(&self, kind: EventKind) -> bool {
        self.contains(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TypeEvent {
    Write,
    Update,
    Delete,
}

impl TypeEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            TypeEvent::Write => EventKind::INSERT,
            TypeEvent::Update => EventKind::UPDATE,
            TypeEvent::Delete => EventKind::DELETE,
        }
    }
}

/// column name -> (declared type, value). NULL columns have no entry.
pub type Row = BTreeMap<String, (String, ColumnValue)>;

/// One changed row handed to a table callback.
///
/// `row` holds the after image of WRITE and UPDATE and the only image of DELETE.
/// `old_row` is filled for UPDATE only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSet {
    pub row: Row,
    pub old_row: Row,
    pub when: u32,
    pub tbl_name: String,
    pub db_name: String,
    pub type_event: TypeEvent,
    pub master_id: u32,
}

impl RecordSet {
    pub fn new(type_event: TypeEvent, db_name: &str, tbl_name: &str, when: u32, master_id: u32) -> Self {
        RecordSet {
            row: Row::new(),
            old_row: Row::new(),
            when,
            tbl_name: tbl_name.to_string(),
            db_name: db_name.to_string(),
            type_event,
            master_id,
        }
    }

    /// Value of `column` in `row`, `None` when the column is NULL or not in the image.
    pub fn value(&self, column: &str) -> Option<&ColumnValue> {
        self.row.get(column).map(|(_, v)| v)
    }

    pub fn old_value(&self, column: &str) -> Option<&ColumnValue> {
        self.old_row.get(column).map(|(_, v)| v)
    }

    pub fn to_json(&self) -> CResult<String> {
        serde_json::to_string(self).map_err(|e| ReError::String(e.to_string()))
    }
}
