//! String interner shared by a lexer, its forks, and every pass that reads
//! the resulting node graph.
//!
//! Two release policies exist and are picked when the crate is built:
//!
//! - default ("speed"): text is appended and never freed; `release` is a
//!   no-op.
//! - `reclaim-strings` ("memory"): every `intern` takes a reference and
//!   `release` drops one; the slot is erased when the count reaches zero.
//!   An erased handle is never reused, so a stale handle reads as `""`.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::Name;

/// Interner shared across lexer forks and passes.
pub type SharedInterner = Arc<StringInterner>;

/// Interning failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternError {
    /// More than `u32::MAX` distinct strings.
    #[error("string table exceeded capacity: {count} entries, max is {}", u32::MAX)]
    Overflow { count: usize },
    /// A restored table named the same text twice.
    #[error("string table contains {text:?} twice")]
    Duplicate { text: String },
}

/// Read access to interned text.
pub trait StringLookup {
    /// Text for `name`, or `""` for the empty/erased handle.
    fn lookup(&self, name: Name) -> Arc<str>;
}

struct Table {
    empty: Arc<str>,
    map: FxHashMap<Arc<str>, u32>,
    strings: Vec<Option<Arc<str>>>,
    #[cfg(feature = "reclaim-strings")]
    refs: Vec<u32>,
}

impl Table {
    fn new() -> Self {
        let empty: Arc<str> = Arc::from("");
        Table {
            empty: Arc::clone(&empty),
            map: FxHashMap::default(),
            strings: vec![Some(empty)],
            #[cfg(feature = "reclaim-strings")]
            refs: vec![0],
        }
    }
}

/// Deduplicating string table handing out [`Name`] handles.
pub struct StringInterner {
    table: RwLock<Table>,
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl StringInterner {
    pub fn new() -> Self {
        StringInterner {
            table: RwLock::new(Table::new()),
        }
    }

    /// Create a fresh interner wrapped for sharing.
    pub fn shared() -> SharedInterner {
        Arc::new(Self::new())
    }

    /// Intern `s`, returning its handle or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        if s.is_empty() {
            return Ok(Name::EMPTY);
        }

        let mut table = self.table.write();
        if let Some(&idx) = table.map.get(s) {
            #[cfg(feature = "reclaim-strings")]
            {
                table.refs[idx as usize] += 1;
            }
            return Ok(Name::from_raw(idx));
        }

        let count = table.strings.len();
        let idx = u32::try_from(count).map_err(|_| InternError::Overflow { count })?;
        let text: Arc<str> = Arc::from(s);
        table.strings.push(Some(Arc::clone(&text)));
        table.map.insert(text, idx);
        #[cfg(feature = "reclaim-strings")]
        table.refs.push(1);

        Ok(Name::from_raw(idx))
    }

    /// Intern `s`.
    ///
    /// # Panics
    /// Panics past `u32::MAX` distinct strings. Use `try_intern` to handle
    /// that case.
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Handle for `s` if it is already interned. Takes no reference.
    pub fn get(&self, s: &str) -> Option<Name> {
        if s.is_empty() {
            return Some(Name::EMPTY);
        }
        self.table.read().map.get(s).map(|&idx| Name::from_raw(idx))
    }

    /// Drop one reference to `name`.
    ///
    /// Returns `true` if the text was erased. Always `false` in the default
    /// build, which never frees.
    #[cfg(feature = "reclaim-strings")]
    pub fn release(&self, name: Name) -> bool {
        if name.is_empty() {
            return false;
        }
        let mut table = self.table.write();
        let idx = name.index();
        let Some(count) = table.refs.get_mut(idx) else {
            return false;
        };
        if *count == 0 {
            return false;
        }
        *count -= 1;
        if *count > 0 {
            return false;
        }
        if let Some(text) = table.strings[idx].take() {
            table.map.remove(&text);
        }
        true
    }

    /// Drop one reference to `name`.
    ///
    /// Returns `true` if the text was erased. Always `false` in the default
    /// build, which never frees.
    #[cfg(not(feature = "reclaim-strings"))]
    pub fn release(&self, name: Name) -> bool {
        let _ = name;
        false
    }

    /// Every slot by handle index. Slot 0 and erased slots are `None`.
    pub fn snapshot(&self) -> Vec<Option<String>> {
        let table = self.table.read();
        table
            .strings
            .iter()
            .enumerate()
            .map(|(idx, s)| match s {
                Some(text) if idx != 0 => Some(text.to_string()),
                _ => None,
            })
            .collect()
    }

    /// Rebuild an interner whose handles match a [`snapshot`](Self::snapshot).
    pub fn restore(slots: Vec<Option<String>>) -> Result<Self, InternError> {
        let count = slots.len();
        u32::try_from(count).map_err(|_| InternError::Overflow { count })?;

        let mut table = Table::new();
        for (idx, slot) in slots.into_iter().enumerate().skip(1) {
            let entry = match slot {
                Some(text) if !text.is_empty() => {
                    let text: Arc<str> = Arc::from(text);
                    if table.map.contains_key(&text) {
                        return Err(InternError::Duplicate {
                            text: text.to_string(),
                        });
                    }
                    table.map.insert(Arc::clone(&text), idx as u32);
                    Some(text)
                }
                _ => None,
            };
            #[cfg(feature = "reclaim-strings")]
            table.refs.push(u32::from(entry.is_some()));
            table.strings.push(entry);
        }
        Ok(StringInterner {
            table: RwLock::new(table),
        })
    }

    /// Number of live strings, excluding the reserved empty string.
    pub fn len(&self) -> usize {
        self.table
            .read()
            .strings
            .iter()
            .skip(1)
            .filter(|s| s.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StringLookup for StringInterner {
    fn lookup(&self, name: Name) -> Arc<str> {
        let table = self.table.read();
        match table.strings.get(name.index()) {
            Some(Some(text)) => Arc::clone(text),
            _ => Arc::clone(&table.empty),
        }
    }
}

impl std::fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}
