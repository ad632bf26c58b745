//! Label registry mapping region descriptions to stable integer ids.
//!
//! Region lookups on the hot path compare integers, not strings. A label is
//! registered the first time it is seen and keeps its id for the lifetime of
//! the registry; nothing is ever removed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, OnceLock};

/// Label of the root node of every timing tree.
pub const ROOT_LABEL: &str = "Total";

/// Global registry instance
static GLOBAL_REGISTRY: OnceLock<LabelRegistry> = OnceLock::new();

/// Get the process-wide label registry.
///
/// Ids handed out here are shared by every thread, so the same label
/// resolves to the same id in every per-thread timing tree.
pub fn global_registry() -> &'static LabelRegistry {
    GLOBAL_REGISTRY.get_or_init(LabelRegistry::new)
}

/// Stable integer identifier of a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimingId(usize);

impl TimingId {
    /// Raw sequential index of this id.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TimingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    ids: HashMap<String, TimingId>,
    labels: Vec<String>,
}

/// Append-only label to id mapping.
#[derive(Debug, Default)]
pub struct LabelRegistry {
    inner: Mutex<RegistryInner>,
}

impl LabelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the id for `label`, allocating the next sequential id on first use.
    pub fn id_for(&self, label: &str) -> TimingId {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(&id) = inner.ids.get(label) {
            return id;
        }

        let id = TimingId(inner.labels.len());
        inner.labels.push(label.to_string());
        inner.ids.insert(label.to_string(), id);

        tracing::trace!(
            target: "timing::registry",
            label = label,
            id = id.index(),
            "label registered"
        );

        id
    }

    /// Look up the label registered for `id`.
    pub fn label_for(&self, id: TimingId) -> Option<String> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.labels.get(id.0).cloned()
    }

    /// Check whether `label` has been registered.
    pub fn contains(&self, label: &str) -> bool {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.ids.contains_key(label)
    }

    /// Number of registered labels.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).labels.len()
    }

    /// Check if no label has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A call site's handle on its label.
///
/// Declared as a `static` next to the instrumented code; the id is resolved
/// from the [`global_registry`] on first use and cached, so each site pays the
/// string lookup once.
///
/// ```rust
/// use timing::TimingSite;
///
/// static SOLVE: TimingSite = TimingSite::new("solve");
/// assert_eq!(SOLVE.id(), SOLVE.id());
/// assert_eq!(SOLVE.label(), "solve");
/// ```
#[derive(Debug)]
pub struct TimingSite {
    label: &'static str,
    id: OnceLock<TimingId>,
}

impl TimingSite {
    /// Create an unresolved site for `label`.
    pub const fn new(label: &'static str) -> Self {
        Self {
            label,
            id: OnceLock::new(),
        }
    }

    /// Id of this site's label, resolved on first call.
    #[inline]
    pub fn id(&self) -> TimingId {
        *self.id.get_or_init(|| global_registry().id_for(self.label))
    }

    /// The site's label.
    #[inline]
    pub fn label(&self) -> &'static str {
        self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential_and_stable() {
        let registry = LabelRegistry::new();
        let a = registry.id_for("a");
        let b = registry.id_for("b");

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(registry.id_for("a"), a);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_label_for() {
        let registry = LabelRegistry::new();
        let id = registry.id_for("linearize");

        assert_eq!(registry.label_for(id).as_deref(), Some("linearize"));
        assert!(registry.contains("linearize"));
        assert!(!registry.contains("eliminate"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = LabelRegistry::new();
        assert!(registry.is_empty());
        registry.id_for("x");
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_site_caches_global_id() {
        static SITE: TimingSite = TimingSite::new("registry_test_site");
        let id = SITE.id();

        assert_eq!(global_registry().id_for("registry_test_site"), id);
        assert_eq!(SITE.id(), id);
    }

    #[test]
    fn test_id_display() {
        let registry = LabelRegistry::new();
        let id = registry.id_for("x");
        assert_eq!(id.to_string(), "#0");
    }
}
