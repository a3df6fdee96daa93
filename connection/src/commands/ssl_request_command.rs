use crate::declar::capability_flags::CLIENT_SSL;

const RESERVED_LEN: usize = 23;

/// SSLRequest: the handshake response cut after the collation byte.
/// The TLS handshake starts once it is sent, the full response follows over TLS.
#[derive(Debug)]
pub struct SslRequestCommand {
    client_capabilities: u32,
    client_collation: u8,
}

impl SslRequestCommand {
    pub fn new(client_capabilities: u32, client_collation: u8) -> Self {
        SslRequestCommand {
            client_capabilities: client_capabilities | CLIENT_SSL,
            client_collation,
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        response_header(self.client_capabilities, self.client_collation)
    }
}

/// The 32 bytes every HandshakeResponse41 starts with.
pub(crate) fn response_header(client_capabilities: u32, client_collation: u8) -> Vec<u8> {
    let mut buf = Vec::with_capacity(9 + RESERVED_LEN);
    buf.extend_from_slice(&client_capabilities.to_le_bytes());
    // max packet size, 0 leaves the server default
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.push(client_collation);
    buf.resize(buf.len() + RESERVED_LEN, 0);
    buf
}
