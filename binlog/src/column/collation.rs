use std::collections::HashMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollateInfo {
    pub name: String,
    pub charset: String,
    /// max bytes per character
    pub maxlen: u32,
}

/// collation name -> info, e.g. `utf8mb4_general_ci` -> (`utf8mb4`, 4)
pub type CollateMap = HashMap<String, CollateInfo>;

/// Joins `SHOW COLLATION` (Collation, Charset) with `SHOW CHARACTER SET` (Charset, Maxlen).
///
/// Collations whose character set is missing from `charsets` are dropped.
pub fn build_collate_map<C, S>(collations: C, charsets: S) -> CollateMap
where
    C: IntoIterator<Item = (String, String)>,
    S: IntoIterator<Item = (String, u32)>,
{
    let maxlens: HashMap<String, u32> = charsets.into_iter().collect();

    collations
        .into_iter()
        .filter_map(|(name, charset)| {
            maxlens.get(&charset).map(|maxlen| {
                (
                    name.clone(),
                    CollateInfo {
                        name,
                        charset,
                        maxlen: *maxlen,
                    },
                )
            })
        })
        .collect()
}
