use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tracing::trace;

use common::err::decode_error::ReError;
use common::err::CResult;

use crate::column::collation::CollateInfo;
use crate::column::column_value::ColumnValue;
use crate::column::decimal::{decimal_bin_size, decode_decimal};
use crate::column::type_spec::TypeSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
    Timestamp,
    DateTime,
    Time,
}

/// TIMESTAMP / DATETIME / TIME with the storage format currently in effect.
///
/// Old storage (before 5.6.4) is little-endian 4/8/3 bytes. New storage is big-endian
/// 4/5/3 bytes followed by up to 3 fractional-second bytes, which are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Temporal {
    pub kind: TemporalKind,
    /// fractional second digits, 0..=6
    pub precision: u8,
    pub old_storage: bool,
}

impl Temporal {
    pub fn pack_length(&self) -> usize {
        if self.old_storage {
            return match self.kind {
                TemporalKind::Timestamp => 4,
                TemporalKind::DateTime => 8,
                TemporalKind::Time => 3,
            };
        }

        let base = match self.kind {
            TemporalKind::Timestamp => 4,
            TemporalKind::DateTime => 5,
            TemporalKind::Time => 3,
        };
        base + (self.precision as usize + 1) / 2
    }
}

/// Decode plan of one column, fixed when the table schema is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCodec {
    /// 1, 2, 3, 4 or 8 byte little-endian integer
    Int { width: usize, unsigned: bool },
    Float,
    Double,
    Decimal { intg: usize, frac: usize },
    Temporal(Temporal),
    Date,
    Enum { width: usize },
    Set { width: usize },
    /// `varchar` and `char`
    VarString { length_bytes: usize, max_symbols: usize },
    /// `blob` and `text` families, length prefix of `pack_length` bytes
    Blob { pack_length: usize },
    Bit { width: usize },
}

impl FieldCodec {
    /// Bytes a value occupies when the width does not depend on the data.
    pub fn pack_length(&self) -> Option<usize> {
        match self {
            FieldCodec::Int { width, .. } => Some(*width),
            FieldCodec::Float => Some(4),
            FieldCodec::Double => Some(8),
            FieldCodec::Decimal { intg, frac } => Some(decimal_bin_size(*intg, *frac)),
            FieldCodec::Temporal(t) => Some(t.pack_length()),
            FieldCodec::Date => Some(3),
            FieldCodec::Enum { width } | FieldCodec::Set { width } | FieldCodec::Bit { width } => Some(*width),
            FieldCodec::VarString { .. } | FieldCodec::Blob { .. } => None,
        }
    }
}

/// One column of a tracked table.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    /// declared type as `SHOW FULL COLUMNS` reports it
    pub field_type: String,
    pub codec: FieldCodec,
}

impl Field {
    /// `collate` is required for `varchar` and `char` columns only.
    pub fn new(name: &str, field_type: &str, collate: Option<&CollateInfo>, old_storage: bool) -> CResult<Field> {
        let spec = TypeSpec::parse(field_type)?;

        let codec = match spec.name.as_str() {
            "tinyint" => FieldCodec::Int { width: 1, unsigned: spec.unsigned },
            "smallint" => FieldCodec::Int { width: 2, unsigned: spec.unsigned },
            "mediumint" => FieldCodec::Int { width: 3, unsigned: spec.unsigned },
            "int" => FieldCodec::Int { width: 4, unsigned: spec.unsigned },
            "bigint" => FieldCodec::Int { width: 8, unsigned: spec.unsigned },
            // stored as years since 1900
            "year" => FieldCodec::Int { width: 1, unsigned: true },
            "float" => FieldCodec::Float,
            "double" => FieldCodec::Double,
            "decimal" => {
                let (m, d) = spec.precision_scale().ok_or_else(|| {
                    ReError::MalformedValue(format!("Incorrect field DECIMAL '{}'", field_type))
                })?;
                if m <= 0 || d < 0 || m < d {
                    return Err(ReError::MalformedValue(format!(
                        "Incorrect field DECIMAL '{}'",
                        field_type
                    )));
                }
                FieldCodec::Decimal {
                    intg: (m - d) as usize,
                    frac: d as usize,
                }
            }
            "timestamp" => Field::temporal(TemporalKind::Timestamp, &spec, field_type, old_storage)?,
            "datetime" => Field::temporal(TemporalKind::DateTime, &spec, field_type, old_storage)?,
            "time" => Field::temporal(TemporalKind::Time, &spec, field_type, old_storage)?,
            "date" => FieldCodec::Date,
            "enum" => {
                let count = field_type.matches(',').count() + 1;
                FieldCodec::Enum {
                    width: if count < 256 { 1 } else { 2 },
                }
            }
            "set" => {
                let count = field_type.matches(',').count() + 1;
                let width = (count + 7) / 8;
                FieldCodec::Set {
                    width: if width > 4 { 8 } else { width },
                }
            }
            "varchar" | "char" => {
                let symbols = spec.int_arg().filter(|s| *s >= 0).ok_or_else(|| {
                    ReError::InvalidFieldSpec(format!("Incorrect field VARCHAR '{}'", field_type))
                })? as usize;
                let collate = collate.ok_or_else(|| {
                    ReError::InvalidFieldSpec(format!(
                        "no collation for column '{}' of type '{}'",
                        name, field_type
                    ))
                })?;
                let bytes = symbols * collate.maxlen as usize;
                FieldCodec::VarString {
                    length_bytes: if bytes < 256 { 1 } else { 2 },
                    max_symbols: symbols,
                }
            }
            "tinyblob" | "tinytext" => FieldCodec::Blob { pack_length: 1 },
            "blob" | "text" => FieldCodec::Blob { pack_length: 2 },
            "mediumblob" | "mediumtext" => FieldCodec::Blob { pack_length: 3 },
            "longblob" | "longtext" => FieldCodec::Blob { pack_length: 4 },
            "bit" => {
                let bits = spec.int_arg().ok_or_else(|| {
                    ReError::InvalidFieldSpec(format!("Incorrect field BIT '{}'", field_type))
                })?;
                let width = (bits + 7) / 8;
                if !(1..=8).contains(&width) {
                    return Err(ReError::InvalidFieldSpec(format!(
                        "BIT width {} of '{}' is not 1..=8 bytes",
                        width, field_type
                    )));
                }
                FieldCodec::Bit { width: width as usize }
            }
            other => {
                return Err(ReError::InvalidFieldSpec(format!(
                    "unsupported column type '{}' of column '{}'",
                    other, name
                )))
            }
        };

        Ok(Field {
            name: name.to_string(),
            field_type: field_type.to_string(),
            codec,
        })
    }

    fn temporal(kind: TemporalKind, spec: &TypeSpec, field_type: &str, old_storage: bool) -> CResult<FieldCodec> {
        let precision = match &spec.args {
            None => 0,
            Some(_) => spec.int_arg().ok_or_else(|| {
                ReError::UnsupportedPrecision(format!("unknown fractional seconds precision in '{}'", field_type))
            })?,
        };
        if !(0..=6).contains(&precision) {
            return Err(ReError::UnsupportedPrecision(format!(
                "unknown fractional seconds precision {} in '{}'",
                precision, field_type
            )));
        }

        Ok(FieldCodec::Temporal(Temporal {
            kind,
            precision: precision as u8,
            old_storage,
        }))
    }

    /// Switches a temporal column between old and new storage. Returns false for other columns.
    pub fn reset_temporal(&mut self, old_storage: bool) -> bool {
        match &mut self.codec {
            FieldCodec::Temporal(t) => {
                t.old_storage = old_storage;
                true
            }
            _ => false,
        }
    }

    /// Decodes one value from the front of `buf`, returning it with the number of bytes consumed.
    pub fn unpack(&self, buf: &[u8]) -> CResult<(ColumnValue, usize)> {
        let (value, used) = match self.codec {
            FieldCodec::Int { width, unsigned } => {
                let b = self.take(buf, width)?;
                let value = if unsigned {
                    ColumnValue::UnsignedInt(LittleEndian::read_uint(b, width))
                } else {
                    ColumnValue::SignedInt(LittleEndian::read_int(b, width))
                };
                (value, width)
            }
            FieldCodec::Float => (ColumnValue::Float(LittleEndian::read_f32(self.take(buf, 4)?)), 4),
            FieldCodec::Double => (ColumnValue::Double(LittleEndian::read_f64(self.take(buf, 8)?)), 8),
            FieldCodec::Decimal { intg, frac } => {
                let size = decimal_bin_size(intg, frac);
                (ColumnValue::Decimal(decode_decimal(buf, intg, frac)?), size)
            }
            FieldCodec::Temporal(t) => {
                let size = t.pack_length();
                let b = self.take(buf, size)?;
                (Field::unpack_temporal(&t, b), size)
            }
            FieldCodec::Date => (ColumnValue::Date(LittleEndian::read_u24(self.take(buf, 3)?)), 3),
            FieldCodec::Enum { width } => {
                let b = self.take(buf, width)?;
                (ColumnValue::Enum(LittleEndian::read_uint(b, width) as i32), width)
            }
            FieldCodec::Set { width } => {
                let b = self.take(buf, width)?;
                (ColumnValue::Set(LittleEndian::read_uint(b, width)), width)
            }
            FieldCodec::VarString { length_bytes, .. } => {
                let b = self.take(buf, length_bytes)?;
                let len = if length_bytes == 1 {
                    b[0] as usize
                } else {
                    LittleEndian::read_u16(b) as usize
                };
                let data = self.take(&buf[length_bytes..], len)?;
                (ColumnValue::String(data.to_vec()), length_bytes + len)
            }
            FieldCodec::Blob { pack_length } => {
                let b = self.take(buf, pack_length)?;
                let len = match pack_length {
                    1 => b[0] as usize,
                    // signed on the wire, reinterpreted as unsigned
                    2 => LittleEndian::read_i16(b) as u16 as usize,
                    3 => LittleEndian::read_u24(b) as usize,
                    _ => LittleEndian::read_u32(b) as usize,
                };
                let data = self.take(&buf[pack_length..], len)?;
                (ColumnValue::Blob(data.to_vec()), pack_length + len)
            }
            FieldCodec::Bit { width } => {
                let b = self.take(buf, width)?;
                (ColumnValue::Bit(BigEndian::read_uint(b, width)), width)
            }
        };

        trace!("  {}: {} // {}", self.name, value, used);
        Ok((value, used))
    }

    fn unpack_temporal(t: &Temporal, b: &[u8]) -> ColumnValue {
        match (t.kind, t.old_storage) {
            (TemporalKind::Timestamp, true) => ColumnValue::Timestamp(LittleEndian::read_u32(b)),
            (TemporalKind::Timestamp, false) => ColumnValue::Timestamp(BigEndian::read_u32(b)),
            (TemporalKind::DateTime, true) => ColumnValue::DateTime(LittleEndian::read_u64(b)),
            (TemporalKind::DateTime, false) => {
                //  1 bit  sign (1 = non-negative)
                // 17 bits year*13+month
                //  5 bits day, 5 bits hour, 6 bits minute, 6 bits second
                let mut data = BigEndian::read_uint(b, 5);
                let mut v = data & 63;
                data >>= 6;
                v += (data & 63) * 100;
                data >>= 6;
                v += (data & 31) * 10_000;
                data >>= 5;
                v += (data & 31) * 1_000_000;
                data >>= 5;

                let year_month = data & ((1 << 17) - 1);
                v += year_month % 13 * 100_000_000;
                v += year_month / 13 * 10_000_000_000;
                ColumnValue::DateTime(v)
            }
            (TemporalKind::Time, true) => ColumnValue::Time(LittleEndian::read_i24(b)),
            (TemporalKind::Time, false) => {
                //  1 bit sign (1 = non-negative), 1 bit unused
                // 10 bits hour, 6 bits minute, 6 bits second
                let mut data = BigEndian::read_u24(b);
                let non_negative = data & (1 << 23) != 0;
                if !non_negative {
                    data = (1 << 23) - data;
                }
                let mut v = (data & 63) as i32;
                data >>= 6;
                v += ((data & 63) * 100) as i32;
                data >>= 6;
                v += ((data & 1023) * 10_000) as i32;
                ColumnValue::Time(if non_negative { v } else { -v })
            }
        }
    }

    fn take<'a>(&self, buf: &'a [u8], n: usize) -> CResult<&'a [u8]> {
        buf.get(..n).ok_or_else(|| {
            ReError::MalformedValue(format!(
                "column '{}' ({}) needs {} bytes, {} left",
                self.name,
                self.field_type,
                n,
                buf.len()
            ))
        })
    }
}
