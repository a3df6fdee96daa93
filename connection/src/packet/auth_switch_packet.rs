use std::io::Cursor;

use binlog::utils::read_null_term_string_with_cursor;
use common::err::CResult;

/// AuthSwitchRequest without its 0xFE header.
#[derive(Debug)]
pub struct AuthPluginSwitchPacket {
    pub auth_plugin_name: String,
    pub auth_plugin_data: Vec<u8>,
}

impl AuthPluginSwitchPacket {
    pub fn parse(packet: &[u8]) -> CResult<Self> {
        let mut cursor = Cursor::new(packet);

        let auth_plugin_name = read_null_term_string_with_cursor(&mut cursor)?;
        let mut auth_plugin_data = packet[cursor.position() as usize..].to_vec();
        if auth_plugin_data.last() == Some(&0) {
            auth_plugin_data.pop();
        }

        Ok(Self {
            auth_plugin_name,
            auth_plugin_data,
        })
    }
}
