use common::err::decode_error::ReError;
use common::err::CResult;

/// A text protocol result set, cells looked up by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        QueryResult { columns, rows }
    }

    /// Builds a result from literals, NULL written as `None`.
    pub fn from_rows(columns: &[&str], rows: &[&[Option<&str>]]) -> Self {
        QueryResult {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.map(|s| s.to_string())).collect())
                .collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names compare case-insensitively, `Server_id` and `Server_Id` both exist in the wild.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    /// `None` for a NULL cell or a missing row.
    pub fn get(&self, row: usize, column: &str) -> CResult<Option<&str>> {
        let index = self.column_index(column).ok_or_else(|| {
            ReError::String(format!("result set has no column '{}', got {:?}", column, self.columns))
        })?;
        Ok(self
            .rows
            .get(row)
            .and_then(|r| r.get(index))
            .and_then(|c| c.as_deref()))
    }

    pub fn value_at(&self, row: usize, index: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(index)).and_then(|c| c.as_deref())
    }

    /// Every non NULL value of one column.
    pub fn column_values(&self, column: &str) -> CResult<Vec<&str>> {
        (0..self.rows.len())
            .filter_map(|i| self.get(i, column).transpose())
            .collect()
    }
}
