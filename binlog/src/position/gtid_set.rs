use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use common::err::decode_error::ReError;
use common::err::CResult;

/// Raw length of a source id on the wire.
pub const ENCODED_SID_LENGTH: usize = 16;

/// Closed range of transaction numbers, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GtidInterval {
    pub start: i64,
    pub end: i64,
}

impl GtidInterval {
    pub fn new(start: i64, end: i64) -> Self {
        GtidInterval { start, end }
    }
}

/// Executed transactions per source server.
///
/// Keys are 32 lower-case hex digits (the uuid without dashes). Each interval list is sorted,
/// disjoint and never holds two adjacent intervals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GtidSet {
    sets: BTreeMap<String, Vec<GtidInterval>>,
}

impl GtidSet {
    pub fn new() -> Self {
        GtidSet::default()
    }

    /// Parses `uuid:interval[:interval]...[,uuid:interval...]`, interval being `n` or `n-m`.
    ///
    /// Blanks and newlines are ignored, so the multi-line output of `SHOW MASTER STATUS` parses as is.
    pub fn parse(text: &str) -> CResult<GtidSet> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let mut set = GtidSet::new();

        for uuid_set in compact.split(',').filter(|s| !s.is_empty()) {
            let mut parts = uuid_set.split(':');
            let sid = normalize_sid(parts.next().unwrap_or_default())?;

            let mut any = false;
            for interval in parts {
                let (start, end) = parse_interval(interval, uuid_set)?;
                set.add_interval(&sid, GtidInterval::new(start, end));
                any = true;
            }
            if !any {
                return Err(ReError::MalformedGtidText(format!("no interval in '{}'", uuid_set)));
            }
        }

        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }

    pub fn intervals(&self, sid: &str) -> Option<&[GtidInterval]> {
        self.sets.get(sid).map(|v| v.as_slice())
    }

    pub fn sids(&self) -> impl Iterator<Item = &String> {
        self.sets.keys()
    }

    pub fn contains(&self, sid: &str, gno: i64) -> bool {
        self.sets
            .get(sid)
            .map_or(false, |list| list.iter().any(|i| i.start <= gno && gno <= i.end))
    }

    /// Adds one transaction, merging with its neighbours.
    pub fn add(&mut self, sid: &str, gno: i64) {
        self.add_interval(sid, GtidInterval::new(gno, gno));
    }

    fn add_interval(&mut self, sid: &str, interval: GtidInterval) {
        let list = self.sets.entry(sid.to_string()).or_default();

        // first interval that may touch or follow the new one
        let idx = list.partition_point(|i| i.end.saturating_add(1) < interval.start);
        let mut merged = interval;
        let mut last = idx;
        while last < list.len() && list[last].start <= merged.end.saturating_add(1) {
            merged.start = merged.start.min(list[last].start);
            merged.end = merged.end.max(list[last].end);
            last += 1;
        }
        list.splice(idx..last, std::iter::once(merged));
    }

    /// Size of `encode` output: source count, then per source the raw id, the interval
    /// count and 16 bytes per interval. Zero when empty.
    pub fn encoded_size(&self) -> usize {
        if self.sets.is_empty() {
            return 0;
        }
        8 + self
            .sets
            .values()
            .map(|list| ENCODED_SID_LENGTH + 8 + list.len() * 16)
            .sum::<usize>()
    }

    /// Binary form for COM_BINLOG_DUMP_GTID. Interval ends are written exclusive.
    pub fn encode(&self, buf: &mut Vec<u8>) -> CResult<()> {
        if self.sets.is_empty() {
            return Ok(());
        }

        buf.extend_from_slice(&(self.sets.len() as u64).to_le_bytes());
        for (sid, list) in &self.sets {
            let raw = hex::decode(sid)?;
            if raw.len() != ENCODED_SID_LENGTH {
                return Err(ReError::MalformedGtidText(format!("source id '{}' is not 16 bytes", sid)));
            }
            buf.extend_from_slice(&raw);
            buf.extend_from_slice(&(list.len() as u64).to_le_bytes());
            for interval in list {
                buf.extend_from_slice(&interval.start.to_le_bytes());
                buf.extend_from_slice(&(interval.end + 1).to_le_bytes());
            }
        }
        Ok(())
    }
}

impl Display for GtidSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (sid, list) in &self.sets {
            if !first {
                write!(f, ",")?;
            }
            first = false;

            write!(f, "{}", sid)?;
            for i in list {
                if i.start == i.end {
                    write!(f, ":{}", i.start)?;
                } else {
                    write!(f, ":{}-{}", i.start, i.end)?;
                }
            }
        }
        Ok(())
    }
}

/// `24f7c945-c871-11e6-9461-0242ac110006` -> `24f7c945c87111e694610242ac110006`
pub fn normalize_sid(sid: &str) -> CResult<String> {
    let s: String = sid.chars().filter(|c| *c != '-').collect::<String>().to_ascii_lowercase();
    if s.len() != ENCODED_SID_LENGTH * 2 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ReError::MalformedGtidText(format!("bad source id '{}'", sid)));
    }
    Ok(s)
}

fn parse_interval(interval: &str, context: &str) -> CResult<(i64, i64)> {
    let bad = || ReError::MalformedGtidText(format!("bad interval '{}' in '{}'", interval, context));
    let num = |s: &str| s.parse::<i64>().map_err(|_| bad());

    let (start, end) = match interval.split_once('-') {
        Some((a, b)) => (num(a)?, num(b)?),
        None => {
            let n = num(interval)?;
            (n, n)
        }
    };
    if start < 1 || end < start {
        return Err(bad());
    }
    Ok((start, end))
}
