use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use common::err::CResult;

use crate::position::gtid_set::GtidSet;

/// (source id, transaction number) of a GTID_LOG_EVENT, waiting for its commit.
pub type Gtid = (String, i64);

/// Where the stream is, as file + offset and as the executed GTID set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub log_name: String,
    pub log_pos: u64,
    #[serde(default)]
    pub gtid_executed: GtidSet,
}

impl Position {
    pub fn new(log_name: &str, log_pos: u64) -> Self {
        Position {
            log_name: log_name.to_string(),
            log_pos,
            gtid_executed: GtidSet::new(),
        }
    }

    pub fn from_gtid(text: &str) -> CResult<Self> {
        let mut p = Position::default();
        p.parse_gtid(text)?;
        Ok(p)
    }

    pub fn empty(&self) -> bool {
        (self.log_name.is_empty() || self.log_pos == 0) && self.gtid_executed.is_empty()
    }

    pub fn clear(&mut self) {
        self.log_name.clear();
        self.log_pos = 0;
        self.gtid_executed.clear();
    }

    /// Replaces the executed set. Empty text leaves it untouched.
    pub fn parse_gtid(&mut self, text: &str) -> CResult<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        self.gtid_executed = GtidSet::parse(text)?;
        Ok(())
    }

    pub fn add_gtid(&mut self, gtid: &Gtid) {
        self.gtid_executed.add(&gtid.0, gtid.1);
    }

    pub fn encoded_gtid_size(&self) -> usize {
        self.gtid_executed.encoded_size()
    }

    pub fn encode_gtid(&self) -> CResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_gtid_size());
        self.gtid_executed.encode(&mut buf)?;
        Ok(buf)
    }

    /// With GTIDs: the executed sets are equal. Without: file name, then offset, is at or past `other`.
    pub fn reached_other_pos(&self, other: &Position) -> bool {
        if self.gtid_executed.is_empty() {
            return self.log_name > other.log_name
                || (self.log_name == other.log_name && self.log_pos >= other.log_pos);
        }
        self.gtid_executed == other.gtid_executed
    }

    pub fn str(&self) -> String {
        self.to_string()
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "'")?;
        if !self.log_name.is_empty() && self.log_pos != 0 {
            write!(f, "{}:{}, ", self.log_name, self.log_pos)?;
        }
        if self.gtid_executed.is_empty() {
            write!(f, "GTIDs=-'")
        } else {
            write!(f, "GTIDs={}'", self.gtid_executed)
        }
    }
}
