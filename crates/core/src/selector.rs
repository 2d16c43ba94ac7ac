//! Selectors: which entries a read, delete or compaction applies to.
//!
//! Selectors arrive as loose text (`3`, `0:10`, `:5`, `assistant`) and are
//! parsed once at the command boundary. The store only ever sees the typed
//! variants.
//!
//! Ranges are half-open, `start:end` covers `start..end`. Both bounds are
//! optional and are clamped to the store length when applied, so a range
//! never fails on its own; it may simply select nothing.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::Error;
use crate::message::Role;

/// A half-open range of entry indices with optional bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryRange {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl EntryRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// The whole store.
    pub fn full() -> Self {
        Self::default()
    }

    pub fn from_start(start: usize) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn to_end(end: usize) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    /// Resolve against a store of `len` entries.
    pub fn clamp(&self, len: usize) -> Range<usize> {
        let end = self.end.unwrap_or(len).min(len);
        let start = self.start.unwrap_or(0).min(end);
        start..end
    }
}

impl fmt::Display for EntryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{start}")?;
        }
        f.write_str(":")?;
        if let Some(end) = self.end {
            write!(f, "{end}")?;
        }
        Ok(())
    }
}

impl FromStr for EntryRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| Error::validation(format!("Invalid range '{s}' (expected start:end)")))?;

        let range = Self {
            start: parse_bound(start, s)?,
            end: parse_bound(end, s)?,
        };

        if let (Some(start), Some(end)) = (range.start, range.end) {
            if start > end {
                return Err(Error::validation(format!(
                    "Invalid range '{s}': start {start} is after end {end}"
                )));
            }
        }

        Ok(range)
    }
}

fn parse_bound(text: &str, whole: &str) -> Result<Option<usize>, Error> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<usize>().map(Some).map_err(|_| {
        Error::validation(format!(
            "Invalid range '{whole}': '{text}' is not a non-negative index"
        ))
    })
}

/// Which entries an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Index(usize),
    Range(EntryRange),
    Role(Role),
}

impl Selector {
    pub fn all() -> Self {
        Selector::Range(EntryRange::full())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Index(i) => write!(f, "{i}"),
            Selector::Range(r) => write!(f, "{r}"),
            Selector::Role(role) => write!(f, "{role}"),
        }
    }
}

impl FromStr for Selector {
    type Err = Error;

    /// `3` → index, anything with a `:` → range, otherwise a role name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::validation("Empty selector"));
        }
        if s.contains(':') {
            return s.parse().map(Selector::Range);
        }
        if s.chars().all(|c| c.is_ascii_digit()) {
            return s
                .parse::<usize>()
                .map(Selector::Index)
                .map_err(|e| Error::validation(format!("Invalid index '{s}': {e}")));
        }
        if s.starts_with('-') && s[1..].chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::validation(format!(
                "Invalid index '{s}': indices are non-negative"
            )));
        }
        s.parse().map(Selector::Role)
    }
}
