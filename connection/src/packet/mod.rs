use common::err::decode_error::ReError;
use common::err::CResult;

use crate::packet::error_packet::ErrorPacket;
use crate::packet::response_type::ResponseType;

pub mod auth_switch_packet;
pub mod end_of_file_packet;
pub mod error_packet;
pub mod handshake_packet;
pub mod ok_packet;
pub mod response_type;
pub mod result_set_column_packet;
pub mod result_set_row_packet;

/// Turns an ERR packet into `MysqlQueryErr`, anything else passes.
pub fn check_error_packet(packet: &[u8], message: &str) -> CResult<()> {
    match packet.first() {
        None => Err(ReError::ConnectionError(format!("{} Empty packet.", message))),
        Some(&ResponseType::ERROR) => {
            let error = ErrorPacket::parse(&packet[1..])?;
            Err(ReError::MysqlQueryErr {
                code: error.error_code,
                message: format!("{} {}", message, error),
            })
        }
        _ => Ok(()),
    }
}
