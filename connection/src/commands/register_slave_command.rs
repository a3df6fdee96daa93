use std::io;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::bytes::write_len_enc_str;
use crate::commands::command::CommandType;

/// Placeholder user and password a replica reports about itself.
pub const DEFAULT_REPORT_USER: &str = "begun_slave";

/// COM_REGISTER_SLAVE, makes the replica visible in `SHOW SLAVE HOSTS`.
#[derive(Debug, Clone)]
pub struct RegisterSlaveCommand {
    pub server_id: u32,
    pub report_host: String,
    pub report_user: String,
    pub report_password: String,
    pub report_port: u16,
    pub rpl_recovery_rank: u32,
    /// the master fills it in
    pub master_id: u32,
}

impl RegisterSlaveCommand {
    pub fn new(server_id: u32, report_host: &str) -> Self {
        Self {
            server_id,
            report_host: report_host.to_string(),
            report_user: DEFAULT_REPORT_USER.to_string(),
            report_password: DEFAULT_REPORT_USER.to_string(),
            report_port: 0,
            rpl_recovery_rank: 0,
            master_id: 0,
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, io::Error> {
        let mut vec = Vec::new();
        vec.push(CommandType::RegisterSlave.into());
        vec.extend_from_slice(&self.server_id.to_le_bytes());
        write_len_enc_str(&mut vec, &self.report_host);
        write_len_enc_str(&mut vec, &self.report_user);
        write_len_enc_str(&mut vec, &self.report_password);

        vec.write_u16::<LittleEndian>(self.report_port)?;
        vec.write_u32::<LittleEndian>(self.rpl_recovery_rank)?;
        vec.write_u32::<LittleEndian>(self.master_id)?;

        Ok(vec)
    }
}
