use std::fmt::Debug;
use std::time::Duration;

use pretty_duration::pretty_duration;
use serde::Serialize;

use crate::cli_options::Format;

pub fn to_string_pretty<T: Serialize + Debug>(f: &Format, val: &T) -> String {
    match f {
        Format::Json => serde_json::to_string_pretty(val).unwrap_or_else(|e| format!("{:?} ({})", val, e)),
        Format::Yaml => serde_yaml::to_string(val).unwrap_or_else(|e| format!("{:?} ({})", val, e)),
        Format::Line => serde_json::to_string(val).unwrap_or_else(|e| format!("{:?} ({})", val, e)),
    }
}

/// Human readable Duration output
pub fn to_duration_pretty(duration: &Duration) -> String {
    pretty_duration(duration, None)
}
