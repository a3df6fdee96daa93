use sha1::Sha1;
use sha2::{Digest, Sha256};

use binlog::utils::write_len_enc_num;

use crate::declar::auth_plugin_names::AuthPlugin;
use crate::NULL_TERMINATOR;

pub fn write_null_term_string(buf: &mut Vec<u8>, str: &str) {
    buf.extend_from_slice(str.as_bytes());
    buf.push(NULL_TERMINATOR);
}

/// length-encoded string, `net_store_data` in libmysqlclient
pub fn write_len_enc_str(buf: &mut Vec<u8>, str: &str) {
    write_len_enc_num(buf, str.len() as u64);
    buf.extend_from_slice(str.as_bytes());
}

/// Scrambled password for the handshake response. An empty password is sent as empty auth data.
pub fn encrypt_password(password: &str, scramble: &[u8], auth_plugin: &AuthPlugin) -> Vec<u8> {
    if password.is_empty() {
        return Vec::new();
    }

    match auth_plugin {
        // SHA1(password) XOR SHA1(scramble + SHA1(SHA1(password)))
        AuthPlugin::MySqlNativePassword => {
            let password_hash = sha1(password.as_bytes());
            let concat_hash = [scramble.to_vec(), sha1(&password_hash)].concat();
            xor(&password_hash, &sha1(&concat_hash))
        }
        // SHA256(password) XOR SHA256(SHA256(SHA256(password)) + scramble)
        AuthPlugin::CachingSha2Password => {
            let password_hash = sha256(password.as_bytes());
            let concat_hash = [sha256(&password_hash), scramble.to_vec()].concat();
            xor(&password_hash, &sha256(&concat_hash))
        }
    }
}

pub fn xor(slice1: &[u8], slice2: &[u8]) -> Vec<u8> {
    if slice2.is_empty() {
        return slice1.to_vec();
    }
    slice1
        .iter()
        .enumerate()
        .map(|(i, b)| b ^ slice2[i % slice2.len()])
        .collect()
}

pub fn sha1(value: &[u8]) -> Vec<u8> {
    let mut hasher = Sha1::new();
    hasher.update(value);
    hasher.finalize().as_slice().to_vec()
}

pub fn sha256(value: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(value);
    hasher.finalize().as_slice().to_vec()
}
