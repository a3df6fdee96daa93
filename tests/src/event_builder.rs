use byteorder::{LittleEndian, WriteBytesExt};

use binlog::events::event_type::LogEventType;

/// column type codes used by the table maps below
pub const MYSQL_TYPE_LONG: u8 = 3;
pub const MYSQL_TYPE_DATETIME: u8 = 12;
pub const MYSQL_TYPE_VARCHAR: u8 = 15;
pub const MYSQL_TYPE_DATETIME2: u8 = 18;

/// post-header lengths as a 5.7 master declares them
pub fn mysql57_post_header_lens() -> Vec<u8> {
    let mut lens = vec![
        56, 13, 0, 8, 0, 18, 0, 4, 4, 4, 4, 18, 0, 0, 95, 0, 4, 26, 8, 0, 0, 0, 8, 8, 8, 2, 0, 0, 0, 10, 10, 10,
        42, 42, 0, 18, 52, 0,
    ];
    let n = lens.len();
    lens[14] = (56 + 1 + n) as u8;
    lens
}

/// 5.1 declares only the first 27 types and has no v2 rows events.
pub fn mysql51_post_header_lens() -> Vec<u8> {
    let mut lens = mysql57_post_header_lens();
    lens.truncate(27);
    lens[14] = (56 + 1 + lens.len()) as u8;
    lens
}

/// Writes binlog events the way a master streams them, tracking `log_pos`.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    pub server_id: u32,
    pub when: u32,
    /// offset of the next event in the current file
    pub pos: u32,
    pub checksum: bool,
    pub master_ge_56: bool,
}

impl Default for EventBuilder {
    fn default() -> Self {
        EventBuilder {
            server_id: 1,
            when: 1_700_000_000,
            pos: 4,
            checksum: true,
            master_ge_56: true,
        }
    }
}

impl EventBuilder {
    pub fn new() -> Self {
        EventBuilder::default()
    }

    /// A 5.1 master: no checksums, v1 rows events.
    pub fn mysql51() -> Self {
        EventBuilder {
            checksum: false,
            master_ge_56: false,
            ..EventBuilder::default()
        }
    }

    /// Header, body and, when enabled, the CRC32 trailer. Advances `pos` past the event.
    pub fn event(&mut self, event_type: LogEventType, body: &[u8]) -> Vec<u8> {
        let len = self.event_len(body.len());
        self.pos += len;
        self.raw(event_type, body, self.pos)
    }

    /// Same with log_pos 0, as the master sends the fake ROTATE and FORMAT_DESCRIPTION.
    pub fn artificial(&mut self, event_type: LogEventType, body: &[u8]) -> Vec<u8> {
        self.raw(event_type, body, 0)
    }

    fn event_len(&self, body_len: usize) -> u32 {
        (19 + body_len + if self.checksum { 4 } else { 0 }) as u32
    }

    fn raw(&self, event_type: LogEventType, body: &[u8], log_pos: u32) -> Vec<u8> {
        let mut v = Vec::new();
        v.write_u32::<LittleEndian>(self.when).unwrap();
        v.push(event_type.into());
        v.write_u32::<LittleEndian>(self.server_id).unwrap();
        v.write_u32::<LittleEndian>(self.event_len(body.len())).unwrap();
        v.write_u32::<LittleEndian>(log_pos).unwrap();
        v.write_u16::<LittleEndian>(0).unwrap();
        v.extend_from_slice(body);
        if self.checksum {
            let crc = crc32fast::hash(&v);
            v.write_u32::<LittleEndian>(crc).unwrap();
        }
        v
    }

    pub fn rotate(&mut self, next_binlog: &str, position: u64) -> Vec<u8> {
        let mut body = Vec::new();
        body.write_u64::<LittleEndian>(position).unwrap();
        body.extend_from_slice(next_binlog.as_bytes());
        let ev = self.artificial(LogEventType::ROTATE_EVENT, &body);
        self.pos = position as u32;
        ev
    }

    /// FORMAT_DESCRIPTION_EVENT. From 5.6 on it ends with the checksum algorithm and a trailer,
    /// whether or not checksums are enabled.
    pub fn format_description(&mut self) -> Vec<u8> {
        let (version, lens) = if self.master_ge_56 {
            ("5.7.44-log", mysql57_post_header_lens())
        } else {
            ("5.1.73-log", mysql51_post_header_lens())
        };

        let mut body = Vec::new();
        body.write_u16::<LittleEndian>(4).unwrap();
        let mut server_version = [0u8; 50];
        server_version[..version.len()].copy_from_slice(version.as_bytes());
        body.extend_from_slice(&server_version);
        body.write_u32::<LittleEndian>(self.when).unwrap();
        body.push(19);
        body.extend_from_slice(&lens);

        if !self.master_ge_56 {
            return self.artificial(LogEventType::FORMAT_DESCRIPTION_EVENT, &body);
        }

        body.push(if self.checksum { 1 } else { 0 });
        let checksum = self.checksum;
        self.checksum = true;
        let mut ev = self.artificial(LogEventType::FORMAT_DESCRIPTION_EVENT, &body);
        self.checksum = checksum;
        if !checksum {
            // trailer present but not verified
            let n = ev.len();
            ev[n - 4..].copy_from_slice(&[0, 0, 0, 0]);
        }
        ev
    }

    pub fn query(&mut self, db_name: &str, query: &str) -> Vec<u8> {
        let mut body = Vec::new();
        body.write_u32::<LittleEndian>(11).unwrap();
        body.write_u32::<LittleEndian>(0).unwrap();
        body.push(db_name.len() as u8);
        body.write_u16::<LittleEndian>(0).unwrap();
        body.write_u16::<LittleEndian>(0).unwrap();
        body.extend_from_slice(db_name.as_bytes());
        body.push(0);
        body.extend_from_slice(query.as_bytes());
        self.event(LogEventType::QUERY_EVENT, &body)
    }

    pub fn xid(&mut self, xid: u64) -> Vec<u8> {
        self.event(LogEventType::XID_EVENT, &xid.to_le_bytes())
    }

    /// `sid` as 32 hex digits.
    pub fn gtid(&mut self, sid: &str, gno: i64) -> Vec<u8> {
        let mut body = vec![1u8];
        body.extend_from_slice(&hex::decode(sid).unwrap());
        body.write_i64::<LittleEndian>(gno).unwrap();
        self.event(LogEventType::GTID_LOG_EVENT, &body)
    }

    pub fn table_map(&mut self, table_id: u64, db_name: &str, tbl_name: &str, column_types: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&table_id.to_le_bytes()[..6]);
        body.write_u16::<LittleEndian>(1).unwrap();
        body.push(db_name.len() as u8);
        body.extend_from_slice(db_name.as_bytes());
        body.push(0);
        body.push(tbl_name.len() as u8);
        body.extend_from_slice(tbl_name.as_bytes());
        body.push(0);
        body.push(column_types.len() as u8);
        body.extend_from_slice(column_types);
        // metadata and null bitmap are not read
        body.push(0);
        self.event(LogEventType::TABLE_MAP_EVENT, &body)
    }

    /// Rows event with every column present. `rows` are the packed images, null bitmap included.
    pub fn rows(&mut self, event_type: LogEventType, table_id: u64, width: usize, rows: &[Vec<u8>]) -> Vec<u8> {
        let v2 = matches!(
            event_type,
            LogEventType::WRITE_ROWS_EVENT | LogEventType::UPDATE_ROWS_EVENT | LogEventType::DELETE_ROWS_EVENT
        );
        let update = matches!(
            event_type,
            LogEventType::UPDATE_ROWS_EVENT | LogEventType::UPDATE_ROWS_EVENT_V1
        );

        let mut body = Vec::new();
        body.extend_from_slice(&table_id.to_le_bytes()[..6]);
        body.write_u16::<LittleEndian>(1).unwrap();
        if v2 {
            body.write_u16::<LittleEndian>(2).unwrap();
        }
        body.push(width as u8);
        let bitmap = all_columns(width);
        body.extend_from_slice(&bitmap);
        if update {
            body.extend_from_slice(&bitmap);
        }
        for row in rows {
            body.extend_from_slice(row);
        }
        self.event(event_type, &body)
    }
}

fn all_columns(width: usize) -> Vec<u8> {
    let mut bitmap = vec![0u8; (width + 7) / 8];
    for i in 0..width {
        bitmap[i / 8] |= 1 << (i % 8);
    }
    bitmap
}

/// Dump packet: OK byte then the event.
pub fn packet(event: &[u8]) -> Vec<u8> {
    let mut p = vec![0u8];
    p.extend_from_slice(event);
    p
}

/// Single INT column image.
pub fn int_row(v: i32) -> Vec<u8> {
    let mut row = vec![0u8];
    row.extend_from_slice(&v.to_le_bytes());
    row
}

/// Single VARCHAR column image with a 2-byte length prefix.
pub fn varchar2_row(s: &str) -> Vec<u8> {
    let mut row = vec![0u8];
    row.extend_from_slice(&(s.len() as u16).to_le_bytes());
    row.extend_from_slice(s.as_bytes());
    row
}
