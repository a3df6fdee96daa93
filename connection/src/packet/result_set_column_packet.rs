use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use binlog::utils::{read_len_enc_num, read_len_enc_str};
use common::err::CResult;

/// Protocol::ColumnDefinition41, keeping the fields a text result set is read by.
#[derive(Debug, Clone)]
pub struct ResultSetColumnPacket {
    pub table: String,
    pub name: String,
    pub character_set: u16,
    pub column_type: u8,
}

impl ResultSetColumnPacket {
    pub fn parse(packet: &[u8]) -> CResult<Self> {
        let mut cursor = Cursor::new(packet);

        // catalog, schema
        read_len_enc_str(&mut cursor)?;
        read_len_enc_str(&mut cursor)?;
        let table = read_len_enc_str(&mut cursor)?;
        // org_table
        read_len_enc_str(&mut cursor)?;
        let name = read_len_enc_str(&mut cursor)?;
        // org_name, then the length of the fixed fields, always 0x0c
        read_len_enc_str(&mut cursor)?;
        read_len_enc_num(&mut cursor)?;

        let character_set = cursor.read_u16::<LittleEndian>()?;
        let _column_length = cursor.read_u32::<LittleEndian>()?;
        let column_type = cursor.read_u8()?;

        Ok(ResultSetColumnPacket {
            table,
            name,
            character_set,
            column_type,
        })
    }
}
