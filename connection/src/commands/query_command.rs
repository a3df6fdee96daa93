use std::io;
use std::io::{Cursor, Write};

use byteorder::WriteBytesExt;

use crate::commands::command::CommandType;

/// COM_QUERY
pub struct QueryCommand {
    pub sql: String,
}

impl QueryCommand {
    pub fn new(sql: &str) -> Self {
        Self { sql: sql.to_string() }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, io::Error> {
        let mut vec = Vec::with_capacity(self.sql.len() + 1);
        let mut cursor = Cursor::new(&mut vec);

        cursor.write_u8(CommandType::Query.into())?;
        cursor.write_all(self.sql.as_bytes())?;

        Ok(vec)
    }
}
