use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Command byte of a client packet, the ones this client sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum CommandType {
    Quit = 0x01,
    Query = 0x03,
    BinlogDump = 0x12,
    RegisterSlave = 0x15,
    BinlogDumpGtid = 0x1e,
}
