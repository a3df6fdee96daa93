use tracing::debug;

use binlog::column::collation::{build_collate_map, CollateMap};
use binlog::schema::catalog::{ColumnRow, SchemaCatalog};
use common::err::decode_error::ReError;
use common::err::CResult;

use crate::conn::connection::{Connection, IConnection};
use crate::conn::connection_options::ConnectionOptions;

/// Table definitions read from the master over a connection of its own.
///
/// The connection is opened on first use and reopened after a failure.
pub struct MysqlSchemaCatalog<C: IConnection = Connection> {
    conn: C,
}

impl MysqlSchemaCatalog<Connection> {
    pub fn new(options: ConnectionOptions) -> Self {
        MysqlSchemaCatalog::with_connection(Connection::new(options))
    }
}

impl<C: IConnection> MysqlSchemaCatalog<C> {
    pub fn with_connection(conn: C) -> Self {
        MysqlSchemaCatalog { conn }
    }

    fn conn(&mut self) -> CResult<&mut C> {
        if !self.conn.is_connected() {
            self.conn.try_connect()?;
        }
        Ok(&mut self.conn)
    }
}

fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

impl<C: IConnection> SchemaCatalog for MysqlSchemaCatalog<C> {
    fn collate_map(&mut self) -> CResult<CollateMap> {
        let conn = self.conn()?;

        let rs = conn.query("SHOW COLLATION")?;
        let mut collations = Vec::with_capacity(rs.len());
        for i in 0..rs.len() {
            if let (Some(name), Some(charset)) = (rs.get(i, "Collation")?, rs.get(i, "Charset")?) {
                collations.push((name.to_string(), charset.to_string()));
            }
        }

        let rs = conn.query("SHOW CHARACTER SET")?;
        let mut charsets = Vec::with_capacity(rs.len());
        for i in 0..rs.len() {
            if let (Some(charset), Some(maxlen)) = (rs.get(i, "Charset")?, rs.get(i, "Maxlen")?) {
                charsets.push((charset.to_string(), maxlen.trim().parse::<u32>()?));
            }
        }

        let map = build_collate_map(collations, charsets);
        debug!("loaded {} collations", map.len());
        Ok(map)
    }

    fn columns(&mut self, db_name: &str, tbl_name: &str) -> CResult<Vec<ColumnRow>> {
        let sql = format!(
            "SHOW FULL COLUMNS FROM {} IN {}",
            quote_identifier(tbl_name),
            quote_identifier(db_name)
        );
        let rs = match self.conn()?.query(&sql) {
            // ER_NO_SUCH_TABLE, ER_BAD_DB_ERROR
            Err(e) if matches!(e.mysql_code(), Some(1146) | Some(1049)) => {
                return Err(ReError::TableNotFound(format!("{}.{}: {}", db_name, tbl_name, e)))
            }
            rs => rs?,
        };

        let mut rows = Vec::with_capacity(rs.len());
        for i in 0..rs.len() {
            let field = rs.get(i, "Field")?.ok_or_else(|| {
                ReError::InvalidFieldSpec(format!("{}.{}: column {} has no name", db_name, tbl_name, i))
            })?;
            let column_type = rs.get(i, "Type")?.unwrap_or_default();
            let mut row = ColumnRow::new(field, column_type, rs.get(i, "Collation")?);
            row.nullable = rs.get(i, "Null")? == Some("YES");
            rows.push(row);
        }
        Ok(rows)
    }
}
