//! Client/server capability bits of the handshake, the ones this client sends or checks.

/// Use the improved version of Old Password Authentication.
pub const CLIENT_LONG_PASSWORD: u32 = 0x0000_0001;

/// Get all column flags.
/// Longer flags in Protocol::ColumnDefinition320.
pub const CLIENT_LONG_FLAG: u32 = 0x0000_0004;

/// Database (schema) name can be specified on connect in Handshake Response Packet.
pub const CLIENT_CONNECT_WITH_DB: u32 = 0x0000_0008;

pub const CLIENT_PROTOCOL_41: u32 = 0x0000_0200;

/// Use SSL encryption for the session.
///
/// ### Client
/// Switch to SSL after sending the capability-flags.
pub const CLIENT_SSL: u32 = 0x0000_0800;

/// Client knows about transactions.
pub const CLIENT_TRANSACTIONS: u32 = 0x0000_2000;

pub const CLIENT_SECURE_CONNECTION: u32 = 0x0000_8000;

/// Client supports plugin authentication.
///
/// ### Requires
/// `CLIENT_PROTOCOL_41`
pub const CLIENT_PLUGIN_AUTH: u32 = 0x0008_0000;

/// Client no longer needs EOF_Packet and will use OK_Packet instead.
/// Never requested here, result sets are read with their EOF packets.
pub const CLIENT_DEPRECATE_EOF: u32 = 0x0100_0000;

/// What every handshake response of this client announces.
pub const CLIENT_BASIC_FLAGS: u32 = CLIENT_LONG_PASSWORD
    | CLIENT_LONG_FLAG
    | CLIENT_PROTOCOL_41
    | CLIENT_TRANSACTIONS
    | CLIENT_SECURE_CONNECTION
    | CLIENT_PLUGIN_AUTH;
