//! External symbol-index boundary.
//!
//! Persistent stub/index storage lives outside this crate. The completion
//! core consumes it through [`UnitIndex`] as a read-only lookup: discover
//! unit names for uses-clause suggestions, and fetch a unit's parsed tree
//! for cross-module resolution. A missing or unloadable unit contributes
//! nothing to a request; it never aborts it.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;

use crate::base::{FileId, NameKey};
use crate::syntax::SyntaxNode;

/// A discoverable unit, as offered inside a uses clause.
#[derive(Debug, Clone)]
pub struct UnitCandidate {
    pub name: SmolStr,
    /// Source file extension, shown as the suggestion's type text.
    pub extension: SmolStr,
}

/// A unit's parsed source as handed over by the index.
#[derive(Debug, Clone)]
pub struct UnitSource {
    pub file: FileId,
    pub root: SyntaxNode,
}

/// Failure at the index boundary. Callers downgrade this to an empty
/// contribution for the affected rule.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("unit `{0}` could not be loaded")]
    UnitUnavailable(SmolStr),
}

/// Read-only lookup into the external unit index.
pub trait UnitIndex {
    /// All discoverable units, in index order.
    fn unit_candidates(&self) -> Vec<UnitCandidate>;

    /// Parsed source of the named unit (case-insensitive), if locatable.
    fn unit_source(&self, name: &str) -> Result<Option<UnitSource>, IndexError>;
}

/// In-memory implementation, used by tests and small hosts.
#[derive(Default)]
pub struct InMemoryUnitIndex {
    units: FxHashMap<NameKey, UnitSource>,
    candidates: Vec<UnitCandidate>,
}

impl InMemoryUnitIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&mut self, name: &str, extension: &str, file: FileId, root: SyntaxNode) {
        self.candidates.push(UnitCandidate {
            name: SmolStr::from(name),
            extension: SmolStr::from(extension),
        });
        self.units.insert(NameKey::new(name), UnitSource { file, root });
    }

    /// Register a discoverable name without a loadable source, mirroring an
    /// index entry whose file has gone missing.
    pub fn add_unloadable(&mut self, name: &str, extension: &str) {
        self.candidates.push(UnitCandidate {
            name: SmolStr::from(name),
            extension: SmolStr::from(extension),
        });
    }
}

impl UnitIndex for InMemoryUnitIndex {
    fn unit_candidates(&self) -> Vec<UnitCandidate> {
        self.candidates.clone()
    }

    fn unit_source(&self, name: &str) -> Result<Option<UnitSource>, IndexError> {
        Ok(self.units.get(&NameKey::new(name)).cloned())
    }
}
