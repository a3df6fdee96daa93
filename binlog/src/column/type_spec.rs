use common::err::decode_error::ReError;
use common::err::CResult;

/// A `SHOW FULL COLUMNS` type string split into its parts:
///
/// ```text
/// type   := name [ "(" args ")" ] { attribute }
/// name   := ALPHA { ALPHA }
/// ```
///
/// e.g. `int(10) unsigned`, `decimal(10,2)`, `enum('a','b')`, `timestamp(3)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    /// lower-cased leading alphabetic run
    pub name: String,
    /// text between the first `(` and the first `)` after it
    pub args: Option<String>,
    pub unsigned: bool,
}

impl TypeSpec {
    pub fn parse(type_str: &str) -> CResult<TypeSpec> {
        let name_end = type_str
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(type_str.len());
        if name_end == 0 {
            return Err(ReError::InvalidFieldSpec(format!(
                "type not found in '{}'",
                type_str
            )));
        }
        let name = type_str[..name_end].to_ascii_lowercase();

        let args = match type_str.find('(') {
            Some(b) => {
                let e = type_str[b..].find(')').map(|e| b + e).ok_or_else(|| {
                    ReError::InvalidFieldSpec(format!("unbalanced parentheses in '{}'", type_str))
                })?;
                Some(type_str[b + 1..e].to_string())
            }
            None => None,
        };

        let unsigned = type_str
            .rsplit(')')
            .next()
            .map_or(false, |tail| tail.to_ascii_lowercase().contains("unsigned"));

        Ok(TypeSpec { name, args, unsigned })
    }

    /// Single integer argument, `varchar(255)` -> 255.
    pub fn int_arg(&self) -> Option<i64> {
        self.args.as_ref().and_then(|a| a.trim().parse::<i64>().ok())
    }

    /// `(M,D)` of a decimal.
    pub fn precision_scale(&self) -> Option<(i64, i64)> {
        let args = self.args.as_ref()?;
        let mut it = args.split(',');
        let m = it.next()?.trim().parse::<i64>().ok()?;
        let d = it.next()?.trim().parse::<i64>().ok()?;
        if it.next().is_some() {
            return None;
        }
        Some((m, d))
    }
}
