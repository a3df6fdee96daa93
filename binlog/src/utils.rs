use std::io::{BufRead, Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use nom::{
    bytes::complete::{take, take_till},
    combinator::map,
    IResult,
};

use common::err::decode_error::ReError;
use common::err::CResult;

use crate::NULL_TERMINATOR;

/// parse len encoded int, return (used_bytes, value).
///
/// if first byte is less than 0xFB - Integer value is this 1 byte integer
/// 0xFB - NULL value
/// 0xFC - Integer value is encoded in the next 2 bytes (3 bytes total)
/// 0xFD - Integer value is encoded in the next 3 bytes (4 bytes total)
/// 0xFE - Integer value is encoded in the next 8 bytes (9 bytes total)
///
/// ref: https://dev.mysql.com/doc/internals/en/integer.html#packet-Protocol::LengthEncodedInteger
pub fn read_len_enc_num(cursor: &mut Cursor<&[u8]>) -> CResult<(usize, u64)> {
    let first_byte = cursor.read_u8()?;

    match first_byte {
        0..=0xFA => Ok((1, first_byte as u64)),
        0xFB => Err(ReError::String("Length encoded integer cannot be NULL.".to_string())),
        0xFC => Ok((3, cursor.read_u16::<LittleEndian>()? as u64)),
        0xFD => Ok((4, cursor.read_u24::<LittleEndian>()? as u64)),
        0xFE => Ok((9, cursor.read_u64::<LittleEndian>()?)),
        _ => Err(ReError::String(format!("Unexpected length-encoded integer: {}", first_byte))),
    }
}

pub fn read_len_enc_num_with_slice(slice: &[u8]) -> CResult<(usize, u64)> {
    let mut cursor = Cursor::new(slice);
    read_len_enc_num(&mut cursor)
}

pub fn read_string(cursor: &mut Cursor<&[u8]>, size: usize) -> CResult<String> {
    let mut vec = vec![0; size];
    cursor.read_exact(&mut vec)?;

    Ok(String::from_utf8_lossy(&vec).to_string())
}

/// Reads a length-encoded string, NULL allowed
///
/// ref: https://dev.mysql.com/doc/internals/en/string.html#packet-Protocol::LengthEncodedString
pub fn read_len_enc_str_allow_null(cursor: &mut Cursor<&[u8]>) -> CResult<Option<String>> {
    let first_byte = cursor.read_u8()?;

    let length = match first_byte {
        0..=0xFA => first_byte as u64,
        0xFB => return Ok(None),
        0xFC => cursor.read_u16::<LittleEndian>()? as u64,
        0xFD => cursor.read_u24::<LittleEndian>()? as u64,
        0xFE => cursor.read_u64::<LittleEndian>()?,
        _ => {
            return Err(ReError::String(format!(
                "Unexpected length-encoded integer: {}",
                first_byte
            )))
        }
    };

    Ok(Some(read_string(cursor, length as usize)?))
}

pub fn read_len_enc_str(cursor: &mut Cursor<&[u8]>) -> CResult<String> {
    let (_, length) = read_len_enc_num(cursor)?;

    read_string(cursor, length as usize)
}

pub fn read_null_term_string_with_cursor(cursor: &mut Cursor<&[u8]>) -> CResult<String> {
    let mut vec = Vec::new();
    cursor.read_until(NULL_TERMINATOR, &mut vec)?;
    vec.pop();
    Ok(String::from_utf8(vec)?)
}

/// parse 'null terminated string', consume null byte
///
/// ref: https://dev.mysql.com/doc/internals/en/string.html#packet-Protocol::NulTerminatedString
pub fn read_null_term_string(input: &[u8]) -> IResult<&[u8], String> {
    let (i, ret) = map(take_till(|c: u8| c == NULL_TERMINATOR), |s| {
        String::from_utf8_lossy(s).to_string()
    })(input)?;
    let (i, _) = take(1usize)(i)?;
    Ok((i, ret))
}

/// Length-encoded integer written the way the server packs column counts.
pub fn write_len_enc_num(buf: &mut Vec<u8>, value: u64) {
    if value < 0xFB {
        buf.push(value as u8);
    } else if value <= 0xFFFF {
        buf.push(0xFC);
        buf.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xFF_FFFF {
        buf.push(0xFD);
        buf.extend_from_slice(&(value as u32).to_le_bytes()[..3]);
    } else {
        buf.push(0xFE);
        buf.extend_from_slice(&value.to_le_bytes());
    }
}

/// Number of bits set among the first `count` bits of a little-endian bitmap.
pub fn n_set_bits(bitmap: &[u8], count: usize) -> usize {
    (0..count).filter(|&i| bit_is_set(bitmap, i)).count()
}

#[inline]
pub fn bit_is_set(bitmap: &[u8], index: usize) -> bool {
    bitmap
        .get(index / 8)
        .map_or(false, |b| b & (1 << (index & 7)) != 0)
}
