//! Source locations.
//!
//! A [`Location`] is a small tag standing for a `(row, col)` pair plus the
//! byte offset at which that pair was first seen. Tags are handed out by a
//! [`LocationTable`], which keeps a forward map (tag to entry) and a reverse
//! map (`(row, col)` to tag). Tag 0 is reserved for unknown or synthetic
//! positions.

use std::fmt;

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Largest accepted row number.
pub const MAX_ROW: u32 = 2_097_152;

/// Largest accepted column number.
pub const MAX_COL: u32 = 1_024;

/// Interned source position.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct Location(u32);

impl Location {
    /// Unknown or synthetic position.
    pub const UNKNOWN: Location = Location(0);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Location(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_known(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "Location({})", self.0)
        } else {
            write!(f, "Location::UNKNOWN")
        }
    }
}

/// Start/end location pair carried by tokens, nodes and diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    /// Span with both ends unknown.
    pub const DUMMY: Span = Span {
        start: Location::UNKNOWN,
        end: Location::UNKNOWN,
    };

    #[inline]
    pub const fn new(start: Location, end: Location) -> Self {
        Span { start, end }
    }

    /// Span from the start of `self` to the end of `other`.
    #[inline]
    pub const fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
        }
    }
}

/// Rejected `LocationTable::save`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("row {row} exceeds the maximum of {MAX_ROW}")]
    RowOutOfRange { row: u32 },
    #[error("column {col} exceeds the maximum of {MAX_COL}")]
    ColumnOutOfRange { col: u32 },
    #[error("position {row}:{col} already bound to offset {existing}, refusing offset {offset}")]
    OffsetConflict {
        row: u32,
        col: u32,
        existing: u32,
        offset: u32,
    },
    #[error("location table is full")]
    Exhausted,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Entry {
    row: u32,
    col: u32,
    offset: u32,
}

/// Bidirectional `(row, col)` to tag map.
#[derive(Clone, Debug)]
pub struct LocationTable {
    entries: Vec<Entry>,
    reverse: FxHashMap<(u32, u32), Location>,
}

impl Default for LocationTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationTable {
    pub fn new() -> Self {
        LocationTable {
            // Slot 0 backs Location::UNKNOWN and is never looked up.
            entries: vec![Entry {
                row: 0,
                col: 0,
                offset: 0,
            }],
            reverse: FxHashMap::default(),
        }
    }

    /// Tag for `(row, col)`, binding `offset` on first sight.
    pub fn save(&mut self, row: u32, col: u32, offset: u32) -> Result<Location, LocationError> {
        if row > MAX_ROW {
            return Err(LocationError::RowOutOfRange { row });
        }
        if col > MAX_COL {
            return Err(LocationError::ColumnOutOfRange { col });
        }

        if let Some(&loc) = self.reverse.get(&(row, col)) {
            let existing = self.entries[loc.0 as usize].offset;
            if existing != offset {
                return Err(LocationError::OffsetConflict {
                    row,
                    col,
                    existing,
                    offset,
                });
            }
            return Ok(loc);
        }

        let tag = u32::try_from(self.entries.len()).map_err(|_| LocationError::Exhausted)?;
        let loc = Location(tag);
        self.entries.push(Entry { row, col, offset });
        self.reverse.insert((row, col), loc);
        Ok(loc)
    }

    /// Tag previously saved for `(row, col)`.
    pub fn find(&self, row: u32, col: u32) -> Option<Location> {
        self.reverse.get(&(row, col)).copied()
    }

    fn entry(&self, loc: Location) -> Option<Entry> {
        if loc.is_known() {
            self.entries.get(loc.0 as usize).copied()
        } else {
            None
        }
    }

    pub fn row_col(&self, loc: Location) -> Option<(u32, u32)> {
        self.entry(loc).map(|e| (e.row, e.col))
    }

    pub fn row(&self, loc: Location) -> Option<u32> {
        self.entry(loc).map(|e| e.row)
    }

    pub fn col(&self, loc: Location) -> Option<u32> {
        self.entry(loc).map(|e| e.col)
    }

    pub fn offset(&self, loc: Location) -> Option<u32> {
        self.entry(loc).map(|e| e.offset)
    }

    /// Number of saved locations.
    pub fn len(&self) -> usize {
        self.entries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
