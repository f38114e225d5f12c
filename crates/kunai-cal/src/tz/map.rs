//! Timezone map collaborator.
//!
//! Property codecs hand this map to datetime parsing so that TZID-qualified
//! values resolve to an instant. TZIDs resolve through the IANA database
//! first; custom identifiers fall back to the registered rule sets, and an
//! unknown TZID degrades to floating (wall clock read as UTC).

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::datetime::DateTimeForm;

use super::timezone::CalTimeZone;

/// TZID to rule-set mapping for one document or invite.
#[derive(Debug, Clone, Default)]
pub struct TimeZoneMap {
    zones: HashMap<String, Arc<CalTimeZone>>,
}

impl TimeZoneMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule set under its identifier.
    pub fn add(&mut self, zone: Arc<CalTimeZone>) {
        self.zones.insert(zone.id().to_string(), zone);
    }

    /// Returns the rule set registered under `tzid`, if any.
    #[must_use]
    pub fn get(&self, tzid: &str) -> Option<&CalTimeZone> {
        self.zones.get(tzid).map(Arc::as_ref)
    }

    /// Resolves wall-clock fields to a UTC instant for the given form.
    #[must_use]
    pub fn resolve_to_utc(
        &self,
        naive: NaiveDateTime,
        form: &DateTimeForm,
    ) -> chrono::DateTime<chrono::Utc> {
        match form {
            DateTimeForm::Utc | DateTimeForm::Floating => {
                chrono::Utc.from_utc_datetime(&naive)
            }
            DateTimeForm::Zoned { tzid } => self.resolve_zoned(naive, tzid),
        }
    }

    fn resolve_zoned(&self, naive: NaiveDateTime, tzid: &str) -> chrono::DateTime<chrono::Utc> {
        if let Ok(tz) = Tz::from_str(tzid) {
            if let Some(local) = tz.from_local_datetime(&naive).earliest() {
                return local.with_timezone(&chrono::Utc);
            }
            // Wall clock fell in a DST gap; read it with the offset in
            // effect at that instant interpreted as UTC.
            let offset =
                chrono::Offset::fix(&tz.offset_from_utc_datetime(&naive)).local_minus_utc();
            return chrono::Utc.from_utc_datetime(&(naive - chrono::Duration::seconds(offset.into())));
        }

        if let Some(zone) = self.get(tzid) {
            let offset = zone.utc_offset_secs(naive);
            return chrono::Utc.from_utc_datetime(&(naive - chrono::Duration::seconds(offset.into())));
        }

        tracing::debug!(tzid, "unknown TZID, treating datetime as floating");
        chrono::Utc.from_utc_datetime(&naive)
    }
}
