use common::err::decode_error::ReError;
use common::err::CResult;

const DIG_PER_DEC: usize = 9;

/// bytes needed for 0..=8 leftover decimal digits
const DIG2BYTES: [usize; DIG_PER_DEC + 1] = [0, 1, 1, 2, 2, 3, 3, 4, 4, 4];

/// On-wire size of a DECIMAL with `intg` integer and `frac` fraction digits.
pub fn decimal_bin_size(intg: usize, frac: usize) -> usize {
    (intg / DIG_PER_DEC) * 4 + DIG2BYTES[intg % DIG_PER_DEC] + (frac / DIG_PER_DEC) * 4 + DIG2BYTES[frac % DIG_PER_DEC]
}

/// Decodes the binary DECIMAL layout.
///
/// Groups of 9 digits are stored big-endian in 4 bytes, leftover digits in the smallest
/// fitting width. The top bit of the first byte is flipped and negative values have every
/// byte inverted, which keeps the encoding memcmp-ordered.
pub fn decode_decimal(buf: &[u8], intg: usize, frac: usize) -> CResult<f64> {
    let size = decimal_bin_size(intg, frac);
    if buf.len() < size {
        return Err(ReError::MalformedValue(format!(
            "decimal needs {} bytes, {} left",
            size,
            buf.len()
        )));
    }
    if size == 0 {
        return Ok(0.0);
    }

    let mut d = buf[..size].to_vec();
    let negative = d[0] & 0x80 == 0;
    d[0] ^= 0x80;
    if negative {
        d.iter_mut().for_each(|b| *b ^= 0xFF);
    }

    let mut pos = 0;
    let mut read_group = |len: usize| -> u32 {
        let v = d[pos..pos + len].iter().fold(0u32, |acc, b| (acc << 8) | *b as u32);
        pos += len;
        v
    };

    let mut text = String::with_capacity(intg + frac + 2);
    if negative {
        text.push('-');
    }

    let intg0 = intg / DIG_PER_DEC;
    let intg0x = intg % DIG_PER_DEC;
    let mut int_part = String::new();
    if intg0x > 0 {
        int_part.push_str(&read_group(DIG2BYTES[intg0x]).to_string());
    }
    for _ in 0..intg0 {
        int_part.push_str(&format!("{:09}", read_group(4)));
    }
    let int_part = int_part.trim_start_matches('0');
    text.push_str(if int_part.is_empty() { "0" } else { int_part });

    let frac0 = frac / DIG_PER_DEC;
    let frac0x = frac % DIG_PER_DEC;
    if frac > 0 {
        text.push('.');
        for _ in 0..frac0 {
            text.push_str(&format!("{:09}", read_group(4)));
        }
        if frac0x > 0 {
            let v = read_group(DIG2BYTES[frac0x]);
            text.push_str(&format!("{:0width$}", v, width = frac0x));
        }
    }

    text.parse::<f64>()
        .map_err(|e| ReError::MalformedValue(format!("decimal '{}': {}", text, e)))
}

#[cfg(test)]
mod test {
    use crate::column::decimal::{decimal_bin_size, decode_decimal};

    #[test]
    fn bin_sizes() {
        assert_eq!(decimal_bin_size(8, 2), 4 + 1);
        assert_eq!(decimal_bin_size(9, 0), 4);
        assert_eq!(decimal_bin_size(10, 4), 4 + 1 + 2);
        assert_eq!(decimal_bin_size(0, 0), 0);
    }

    #[test]
    fn decimal_10_2() {
        // 1234.56 as DECIMAL(10,2): intg 8 -> 4 bytes, frac 2 -> 1 byte
        let buf = [0x80, 0x00, 0x04, 0xD2, 0x38];
        assert_eq!(decode_decimal(&buf, 8, 2).unwrap(), 1234.56);

        let neg: Vec<u8> = {
            let mut v = buf.to_vec();
            v.iter_mut().for_each(|b| *b ^= 0xFF);
            v
        };
        assert_eq!(decode_decimal(&neg, 8, 2).unwrap(), -1234.56);
    }

    #[test]
    fn full_groups_and_leading_zero_fraction() {
        // 1.05 as DECIMAL(11,2), intg 9 is one full group
        let buf = [0x80, 0x00, 0x00, 0x01, 0x05];
        assert_eq!(decode_decimal(&buf, 9, 2).unwrap(), 1.05);

        // 0.000000001 as DECIMAL(9,9)
        let buf = [0x80, 0x00, 0x00, 0x01];
        assert_eq!(decode_decimal(&buf, 0, 9).unwrap(), 0.000000001);
    }

    #[test]
    fn short_buffer() {
        assert!(decode_decimal(&[0x80, 0x00], 8, 2).is_err());
    }
}
