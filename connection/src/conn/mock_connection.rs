use std::collections::HashMap;

use common::err::decode_error::ReError;
use common::err::CResult;

use crate::conn::connection::IConnection;
use crate::conn::query_result::QueryResult;

/// Canned answers per SQL text. Unknown statements fail like a syntax error.
#[derive(Debug, Default)]
pub struct MockConnection {
    results: HashMap<String, Result<QueryResult, (u16, String)>>,
    pub executed: Vec<String>,
    pub connects: usize,
    connected: bool,
}

impl MockConnection {
    pub fn new() -> Self {
        MockConnection::default()
    }

    pub fn with_result(mut self, sql: &str, rs: QueryResult) -> Self {
        self.results.insert(sql.to_string(), Ok(rs));
        self
    }

    pub fn with_ok(self, sql: &str) -> Self {
        self.with_result(sql, QueryResult::default())
    }

    pub fn with_error(mut self, sql: &str, code: u16, message: &str) -> Self {
        self.results.insert(sql.to_string(), Err((code, message.to_string())));
        self
    }

    fn answer(&mut self, sql: &str) -> CResult<QueryResult> {
        self.executed.push(sql.to_string());
        match self.results.get(sql) {
            Some(Ok(rs)) => Ok(rs.clone()),
            Some(Err((code, message))) => Err(ReError::MysqlQueryErr {
                code: *code,
                message: message.clone(),
            }),
            None => Err(ReError::MysqlQueryErr {
                code: 1064,
                message: format!("unexpected statement: {}", sql),
            }),
        }
    }
}

impl IConnection for MockConnection {
    fn try_connect(&mut self) -> CResult<()> {
        self.connects += 1;
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn query(&mut self, sql: &str) -> CResult<QueryResult> {
        self.answer(sql)
    }

    fn execute(&mut self, sql: &str) -> CResult<()> {
        self.answer(sql).map(|_| ())
    }
}
