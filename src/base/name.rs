//! Case-insensitive identifier keys.
//!
//! Pascal identifiers compare case-insensitively everywhere: scope lookup,
//! suggestion deduplication, uses-clause exclusion. `NameKey` is the one
//! normalization point so no comparison site lowercases ad hoc.

use smol_str::SmolStr;

/// A case-folded identifier used as a map/set key.
///
/// Construction folds to ASCII lowercase; Pascal identifiers are ASCII, and
/// non-ASCII bytes pass through unchanged so arbitrary text still round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameKey(SmolStr);

impl NameKey {
    pub fn new(name: &str) -> Self {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            Self(SmolStr::from(name.to_ascii_lowercase()))
        } else {
            Self(SmolStr::from(name))
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for NameKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Case-insensitive equality without allocating a key.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}
