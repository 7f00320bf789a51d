//! String interner for identifier and literal text.
//!
//! Provides O(1) interning and lookup. A module and any clone of it share
//! one interner, so `Name` values stay meaningful across both.

// Arc is needed here for SharedInterner - one interner is shared between a
// module and every unit cloned from it.
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::Name;

/// Interner shared between a module and its clones.
pub type SharedInterner = Arc<StringInterner>;

struct InternInner {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents, indexed by `Name::raw`.
    strings: Vec<&'static str>,
}

/// String interner.
///
/// Interned strings are leaked into `'static` storage so lookups can hand
/// out references without holding the lock.
///
/// # Thread Safety
/// Uses an `RwLock` for interior mutability so interning works through a
/// shared reference; wrap in [`SharedInterner`] to share across units.
pub struct StringInterner {
    inner: RwLock<InternInner>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, 0);
        StringInterner {
            inner: RwLock::new(InternInner {
                map,
                strings: vec![empty],
            }),
        }
    }

    /// Intern a string, returning its `Name`.
    ///
    /// Interning the same content twice returns the same `Name`.
    pub fn intern(&self, s: &str) -> Name {
        // Fast path: already interned.
        {
            let guard = self.inner.read();
            if let Some(&idx) = guard.map.get(s) {
                return Name::from_raw(idx);
            }
        }

        let mut guard = self.inner.write();
        // Double-check after acquiring the write lock.
        if let Some(&idx) = guard.map.get(s) {
            return Name::from_raw(idx);
        }

        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let idx = u32::try_from(guard.strings.len()).unwrap_or_else(|_| {
            panic!("interner exceeded capacity: {} strings", guard.strings.len())
        });
        guard.map.insert(leaked, idx);
        guard.strings.push(leaked);
        Name::from_raw(idx)
    }

    /// Resolve a `Name` back to its string content.
    ///
    /// # Panics
    /// Panics if `name` was not produced by this interner.
    pub fn resolve(&self, name: Name) -> &'static str {
        let guard = self.inner.read();
        guard.strings[name.raw() as usize]
    }

    /// Number of interned strings (including the pre-interned empty string).
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    /// Returns `true` if only the empty string is interned.
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedup() {
        let interner = StringInterner::new();
        let a = interner.intern("clk");
        let b = interner.intern("clk");
        let c = interner.intern("rst");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.resolve(a), "clk");
        assert_eq!(interner.resolve(c), "rst");
    }

    #[test]
    fn test_empty_pre_interned() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.resolve(Name::EMPTY), "");
    }
}
