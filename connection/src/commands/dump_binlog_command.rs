use std::io;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::commands::command::CommandType;

/// COM_BINLOG_DUMP, resume by file and offset.
#[derive(Debug)]
pub struct DumpBinlogCommand<'a> {
    server_id: u32,
    log_name: &'a str,
    log_pos: u64,
}

impl<'a> DumpBinlogCommand<'a> {
    pub fn new(server_id: u32, log_name: &'a str, log_pos: u64) -> Self {
        DumpBinlogCommand {
            server_id,
            log_name,
            log_pos,
        }
    }

    pub fn serialize(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(11 + self.log_name.len());
        buf.write_u8(CommandType::BinlogDump.into())?;
        // only 4 bytes of offset fit, larger files need the GTID dump
        buf.write_u32::<LittleEndian>(self.log_pos as u32)?;
        // flags: blocking dump
        buf.write_u16::<LittleEndian>(0)?;
        buf.write_u32::<LittleEndian>(self.server_id)?;
        buf.extend_from_slice(self.log_name.as_bytes());
        Ok(buf)
    }
}
