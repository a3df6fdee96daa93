use std::io::{self, Cursor, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::commands::command::CommandType;

/// BINLOG_THROUGH_GTID
pub const DUMP_FLAG_THROUGH_GTID: u16 = 0x04;

/// COM_BINLOG_DUMP_GTID, resume after the executed GTID set.
///
/// The file name is left empty, the master finds the first file holding a transaction outside the set.
pub struct DumpBinlogGtidCommand {
    pub server_id: u32,
    pub flags: u16,
    /// `GtidSet::encode` output
    pub encoded_gtid_set: Vec<u8>,
}

impl DumpBinlogGtidCommand {
    pub fn new(server_id: u32, encoded_gtid_set: Vec<u8>) -> Self {
        Self {
            server_id,
            flags: DUMP_FLAG_THROUGH_GTID,
            encoded_gtid_set,
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, io::Error> {
        let mut vec = Vec::with_capacity(23 + self.encoded_gtid_set.len());
        let mut cursor = Cursor::new(&mut vec);

        cursor.write_u8(CommandType::BinlogDumpGtid.into())?;
        cursor.write_u16::<LittleEndian>(self.flags)?;
        cursor.write_u32::<LittleEndian>(self.server_id)?;
        // binlog name size, no name follows
        cursor.write_u32::<LittleEndian>(0)?;
        cursor.write_u64::<LittleEndian>(4)?;
        cursor.write_u32::<LittleEndian>(self.encoded_gtid_set.len() as u32)?;
        cursor.write_all(&self.encoded_gtid_set)?;

        Ok(vec)
    }
}
