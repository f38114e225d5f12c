//! Process-wide catalog of known timezone rule sets.
//!
//! Loaded once during startup from a container document and read-only for
//! the rest of the process lifetime; steady-state lookups therefore need no
//! locking. The registry is an explicit object owned by the startup
//! sequence and handed to consumers, not ambient global state.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{CalError, CalResult};
use crate::ical::{ComponentKind, parse_document};

use super::timezone::CalTimeZone;

/// Load-once timezone catalog, keyed by identifier and iterable in source
/// order.
#[derive(Debug, Default)]
pub struct TimeZoneRegistry {
    zones: HashMap<String, Arc<CalTimeZone>>,
    order: Vec<Arc<CalTimeZone>>,
    loaded_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl TimeZoneRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the catalog from a source file.
    ///
    /// The file handle is scoped to this call and released on every exit
    /// path, including parse failure.
    ///
    /// ## Errors
    /// Returns an error if the file cannot be read or is not a valid
    /// container document.
    #[tracing::instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn load_from_path(&mut self, path: impl AsRef<Path>) -> CalResult<usize> {
        let source = std::fs::read_to_string(path.as_ref())
            .map_err(kunai_core::error::CoreError::Io)?;
        self.load_from_str(&source)
    }

    /// Loads the catalog from container-document text.
    ///
    /// Iterates the document's top-level components, keeps only
    /// timezone-rule components, and populates the id map and the
    /// source-order sequence together. Both structures are built aside
    /// and swapped in at once, so a failed load leaves the previous
    /// contents untouched.
    ///
    /// ## Errors
    /// Returns [`CalError::Format`] if the document or one of its timezone
    /// components is malformed.
    pub fn load_from_str(&mut self, source: &str) -> CalResult<usize> {
        let root = parse_document(source)?;
        if root.kind != ComponentKind::Calendar {
            return Err(CalError::Format(format!(
                "timezone source root must be VCALENDAR, got {}",
                root.name
            )));
        }

        let mut zones = HashMap::new();
        let mut order: Vec<Arc<CalTimeZone>> = Vec::new();
        for comp in root.children_of(ComponentKind::Timezone) {
            let zone = Arc::new(CalTimeZone::from_component(comp)?);
            let id = zone.id().to_string();
            if let Some(existing) = order.iter_mut().find(|z| z.id() == id) {
                // Later definition wins but keeps the original position.
                *existing = Arc::clone(&zone);
            } else {
                order.push(Arc::clone(&zone));
            }
            zones.insert(id, zone);
        }

        let count = order.len();
        self.zones = zones;
        self.order = order;
        self.loaded_at = Some(chrono::Utc::now());
        tracing::debug!(count, "loaded timezone registry");
        Ok(count)
    }

    /// Returns the rule set with the given identifier, if known.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CalTimeZone> {
        self.zones.get(id).map(Arc::as_ref)
    }

    /// Returns the rule set with the given identifier as a shared handle.
    #[must_use]
    pub fn get_shared(&self, id: &str) -> Option<Arc<CalTimeZone>> {
        self.zones.get(id).cloned()
    }

    /// Iterates rule sets in source-file order.
    pub fn iter(&self) -> impl Iterator<Item = &CalTimeZone> {
        self.order.iter().map(Arc::as_ref)
    }

    /// Returns the number of known rule sets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns whether the registry holds no rule sets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns when the catalog was loaded, if it has been.
    #[must_use]
    pub fn loaded_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.loaded_at
    }
}
