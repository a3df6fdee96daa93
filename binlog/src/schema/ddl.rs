use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ALTER_OR_CREATE_TABLE: Regex = Regex::new(
        r"(?i)^\s*(?:alter\s+table|create\s+table(?:\s+if\s+not\s+exists)?)\s+(?:`?(\w+)`?\.)?`?(\w+)`?(?:[^\w\.`].*$|$)"
    )
    .expect("static regex");
}

/// Schema qualifier (when the statement names one) and table touched by an
/// `ALTER TABLE` / `CREATE TABLE` statement, if the query is one.
pub fn check_alter_or_create_query(query: &str) -> Option<(Option<String>, String)> {
    let query = query.replace(['\n', '\r'], " ");
    let caps = ALTER_OR_CREATE_TABLE.captures(&query)?;
    let table = caps.get(2)?.as_str().to_string();
    Some((caps.get(1).map(|m| m.as_str().to_string()), table))
}
