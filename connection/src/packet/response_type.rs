/// First byte of a server response.
pub struct ResponseType {}

impl ResponseType {
    pub const OK: u8 = 0x00;
    pub const ERROR: u8 = 0xFF;
    pub const END_OF_FILE: u8 = 0xFE;
    /// same byte as END_OF_FILE, told apart by where it arrives
    pub const AUTH_PLUGIN_SWITCH: u8 = 0xFE;
    /// caching_sha2_password extra round trip
    pub const AUTH_MORE_DATA: u8 = 0x01;
}
