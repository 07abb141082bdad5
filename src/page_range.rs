use anyhow::{anyhow, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start_page: u32, // 1-based inclusive
    pub end_page: u32,   // 1-based inclusive
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start_page == self.end_page {
            write!(f, "{}", self.start_page)
        } else {
            write!(f, "{}-{}", self.start_page, self.end_page)
        }
    }
}

fn item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)(?:-(\d+))?$").expect("static page range regex"))
}

/// Parses a page spec such as `"1-5"`, `"1,3,5"` or `"2, 4-6"`.
pub fn parse_page_spec(raw: &str) -> Result<Vec<PageRange>> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(anyhow!("page range is empty"));
    }

    let mut ranges = Vec::new();
    for item in compact.split(',') {
        let caps = item_re()
            .captures(item)
            .ok_or_else(|| anyhow!("invalid page range item {item:?} in {raw:?}"))?;
        let start: u32 = caps[1]
            .parse()
            .map_err(|e| anyhow!("page number out of range in {raw:?}: {e}"))?;
        let end: u32 = match caps.get(2) {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|e| anyhow!("page number out of range in {raw:?}: {e}"))?,
            None => start,
        };
        if start == 0 {
            return Err(anyhow!("pages are 1-based, got 0 in {raw:?}"));
        }
        if end < start {
            return Err(anyhow!("descending page range {item:?} in {raw:?}"));
        }
        ranges.push(PageRange {
            start_page: start,
            end_page: end,
        });
    }
    Ok(ranges)
}

/// Canonical whitespace-free rendering of a page spec.
pub fn normalize_page_spec(raw: &str) -> Result<String> {
    let ranges = parse_page_spec(raw)?;
    Ok(ranges
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(","))
}
