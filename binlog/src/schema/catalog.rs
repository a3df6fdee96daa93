use std::collections::HashMap;

use tracing::debug;

use common::err::decode_error::ReError;
use common::err::CResult;

use crate::column::collation::CollateMap;
use crate::column::field::Field;
use crate::schema::table::Table;

/// One row of `SHOW FULL COLUMNS FROM tbl IN db`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
    pub field: String,
    pub column_type: String,
    pub nullable: bool,
    pub collation: Option<String>,
}

impl ColumnRow {
    pub fn new(field: &str, column_type: &str, collation: Option<&str>) -> Self {
        ColumnRow {
            field: field.to_string(),
            column_type: column_type.to_string(),
            nullable: true,
            collation: collation.map(|c| c.to_string()),
        }
    }
}

/// Where table definitions come from. The live implementation queries the master.
pub trait SchemaCatalog: Send {
    /// Every collation the server knows, with its max bytes per character.
    fn collate_map(&mut self) -> CResult<CollateMap>;

    /// Columns of `db.tbl` in declaration order.
    fn columns(&mut self, db_name: &str, tbl_name: &str) -> CResult<Vec<ColumnRow>>;
}

/// Builds a table with no callback attached.
pub fn create_table(
    catalog: &mut dyn SchemaCatalog,
    db_name: &str,
    tbl_name: &str,
    collate_map: &CollateMap,
    old_storage: bool,
) -> CResult<Table> {
    let rows = catalog.columns(db_name, tbl_name)?;
    if rows.is_empty() {
        return Err(ReError::TableNotFound(format!("{}.{} has no columns", db_name, tbl_name)));
    }

    let mut fields = Vec::with_capacity(rows.len());
    for row in rows {
        let lower = row.column_type.to_ascii_lowercase();
        let collate = if lower.starts_with("varchar") || lower.starts_with("char") {
            let name = row.collation.as_deref().ok_or_else(|| {
                ReError::InvalidFieldSpec(format!(
                    "{}.{}: no collation for column '{}'",
                    db_name, tbl_name, row.field
                ))
            })?;
            let info = collate_map.get(name).ok_or_else(|| {
                ReError::InvalidFieldSpec(format!(
                    "{}.{}: unknown collation '{}' of column '{}'",
                    db_name, tbl_name, name, row.field
                ))
            })?;
            Some(info)
        } else {
            None
        };

        debug!("{}.{}: column {} {}", db_name, tbl_name, row.field, row.column_type);
        fields.push(Field::new(&row.field, &row.column_type, collate, old_storage)?);
    }

    Ok(Table::with_fields(db_name, tbl_name, fields))
}

/// Catalog backed by a map, for offline use and tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySchemaCatalog {
    pub collations: CollateMap,
    pub tables: HashMap<(String, String), Vec<ColumnRow>>,
}

impl MemorySchemaCatalog {
    pub fn new(collations: CollateMap) -> Self {
        MemorySchemaCatalog {
            collations,
            tables: HashMap::new(),
        }
    }

    pub fn set_columns(&mut self, db_name: &str, tbl_name: &str, columns: Vec<ColumnRow>) {
        self.tables
            .insert((db_name.to_string(), tbl_name.to_string()), columns);
    }
}

impl SchemaCatalog for MemorySchemaCatalog {
    fn collate_map(&mut self) -> CResult<CollateMap> {
        Ok(self.collations.clone())
    }

    fn columns(&mut self, db_name: &str, tbl_name: &str) -> CResult<Vec<ColumnRow>> {
        Ok(self
            .tables
            .get(&(db_name.to_string(), tbl_name.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
