use std::cmp::Ordering;
use std::fmt;

use kunai_core::metadata::Metadata;

use crate::datetime::CalDateTime;
use crate::error::{CalError, CalResult};
use crate::tz::TimeZoneMap;

const FN_MSG_ID: &str = "i";
const FN_COMPONENT: &str = "c";
const FN_RECURRENCE: &str = "r";
const FN_METHOD: &str = "m";

const RANGE_THISANDFUTURE: &str = "RANGE=THISANDFUTURE:";
const RANGE_THISANDPRIOR: &str = "RANGE=THISANDPRIOR:";

/// Which occurrences a recurrence key addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecurrenceRange {
    /// The single addressed occurrence.
    #[default]
    None,
    ThisAndFuture,
    ThisAndPrior,
}

/// Identifies one occurrence of a repeating event.
///
/// This is a plain immutable value; copying an identity never shares
/// state with the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceKey {
    datetime: CalDateTime,
    range: RecurrenceRange,
}

impl RecurrenceKey {
    #[must_use]
    pub fn new(datetime: CalDateTime, range: RecurrenceRange) -> Self {
        Self { datetime, range }
    }

    #[must_use]
    pub fn datetime(&self) -> &CalDateTime {
        &self.datetime
    }

    #[must_use]
    pub fn range(&self) -> RecurrenceRange {
        self.range
    }

    /// Parses the text form, an optional `RANGE=` prefix followed by a
    /// datetime.
    ///
    /// ## Errors
    /// Returns [`CalError::Format`] when the datetime is malformed.
    pub fn parse(s: &str, tzid: Option<&str>, map: &TimeZoneMap) -> CalResult<Self> {
        let (range, rest) = if let Some(rest) = s.strip_prefix(RANGE_THISANDFUTURE) {
            (RecurrenceRange::ThisAndFuture, rest)
        } else if let Some(rest) = s.strip_prefix(RANGE_THISANDPRIOR) {
            (RecurrenceRange::ThisAndPrior, rest)
        } else {
            (RecurrenceRange::None, s)
        };
        Ok(Self::new(CalDateTime::parse(rest, tzid, map)?, range))
    }
}

impl fmt::Display for RecurrenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.range {
            RecurrenceRange::None => {}
            RecurrenceRange::ThisAndFuture => write!(f, "{RANGE_THISANDFUTURE}")?,
            RecurrenceRange::ThisAndPrior => write!(f, "{RANGE_THISANDPRIOR}")?,
        }
        write!(f, "{}", self.datetime)
    }
}

/// Identifies one calendar component occurrence inside one stored
/// message, and defines a total order over such occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteIdentity {
    message_id: i32,
    component_index: i32,
    recurrence_key: Option<RecurrenceKey>,
    method: String,
}

/// Null-first comparison of optional text: an absent value sorts before
/// every present value.
fn compare_nullable_text(a: Option<&str>, b: Option<&str>) -> i32 {
    match (a, b) {
        (None, None) => 0,
        (None, Some(_)) => -1,
        (Some(_), None) => 1,
        (Some(a), Some(b)) => match a.cmp(b) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        },
    }
}

impl InviteIdentity {
    #[must_use]
    pub fn new(
        message_id: i32,
        component_index: i32,
        recurrence_key: Option<RecurrenceKey>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            message_id,
            component_index,
            recurrence_key,
            method: method.into(),
        }
    }

    #[must_use]
    pub fn message_id(&self) -> i32 {
        self.message_id
    }

    #[must_use]
    pub fn component_index(&self) -> i32 {
        self.component_index
    }

    #[must_use]
    pub fn recurrence_key(&self) -> Option<&RecurrenceKey> {
        self.recurrence_key.as_ref()
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Compares two identities lexicographically over message id,
    /// component index, recurrence key text, and method.
    ///
    /// Two inherited quirks are kept for compatibility. The integer
    /// fields compare by wrapping subtraction, so extreme values can
    /// wrap. And the null conventions are asymmetric: a missing
    /// recurrence key sorts before a present one, but a null `other`
    /// identity sorts after `self`.
    #[must_use]
    pub fn compare(&self, other: Option<&Self>) -> i32 {
        let Some(other) = other else {
            return -1;
        };

        let diff = self.message_id.wrapping_sub(other.message_id);
        if diff != 0 {
            return diff;
        }
        let diff = self.component_index.wrapping_sub(other.component_index);
        if diff != 0 {
            return diff;
        }

        let a = self.recurrence_key.as_ref().map(ToString::to_string);
        let b = other.recurrence_key.as_ref().map(ToString::to_string);
        let diff = compare_nullable_text(a.as_deref(), b.as_deref());
        if diff != 0 {
            return diff;
        }

        compare_nullable_text(Some(&self.method), Some(&other.method))
    }

    #[must_use]
    pub fn encode_metadata(&self) -> Metadata {
        let mut meta = Metadata::new();
        meta.put(FN_MSG_ID, i64::from(self.message_id));
        meta.put(FN_COMPONENT, i64::from(self.component_index));
        if let Some(key) = &self.recurrence_key {
            meta.put(FN_RECURRENCE, key.to_string());
        }
        meta.put(FN_METHOD, self.method.as_str());
        meta
    }

    /// ## Errors
    /// Fails when a stored recurrence key fails to parse.
    pub fn decode_metadata(
        meta: &Metadata,
        tzid: Option<&str>,
        map: &TimeZoneMap,
    ) -> CalResult<Self> {
        let recurrence_key = match meta.get_str(FN_RECURRENCE) {
            Some(text) => Some(RecurrenceKey::parse(text, tzid, map)?),
            None => None,
        };
        let message_id = i32::try_from(meta.get_i64(FN_MSG_ID, 0))
            .map_err(|_| CalError::InvalidData("invite message id out of range".to_owned()))?;
        let component_index = i32::try_from(meta.get_i64(FN_COMPONENT, 0))
            .map_err(|_| CalError::InvalidData("invite component index out of range".to_owned()))?;
        Ok(Self::new(
            message_id,
            component_index,
            recurrence_key,
            meta.get_or(FN_METHOD, ""),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> TimeZoneMap {
        TimeZoneMap::new()
    }

    fn key(s: &str) -> RecurrenceKey {
        RecurrenceKey::parse(s, None, &map()).unwrap()
    }

    #[test]
    fn recurrence_key_text_round_trip() {
        for text in [
            "20260101T080000Z",
            "RANGE=THISANDFUTURE:20260101T080000Z",
            "RANGE=THISANDPRIOR:20260101",
        ] {
            assert_eq!(key(text).to_string(), text);
        }
    }

    #[test]
    fn component_index_orders() {
        let a = InviteIdentity::new(5, 0, None, "REQUEST");
        let b = InviteIdentity::new(5, 1, None, "REQUEST");
        assert!(a.compare(Some(&b)) < 0);
        assert!(b.compare(Some(&a)) > 0);
    }

    #[test]
    fn non_null_sorts_before_null_identity() {
        let a = InviteIdentity::new(1, 0, None, "REQUEST");
        assert_eq!(a.compare(None), -1);
    }

    #[test]
    fn missing_recurrence_key_sorts_first() {
        let plain = InviteIdentity::new(5, 0, None, "REQUEST");
        let keyed = InviteIdentity::new(5, 0, Some(key("20260101T080000Z")), "REQUEST");
        assert!(plain.compare(Some(&keyed)) < 0);
        assert!(keyed.compare(Some(&plain)) > 0);
    }

    #[test]
    fn method_breaks_final_tie() {
        let a = InviteIdentity::new(5, 0, None, "CANCEL");
        let b = InviteIdentity::new(5, 0, None, "REQUEST");
        assert!(a.compare(Some(&b)) < 0);
        assert_eq!(a.compare(Some(&a)), 0);
    }

    #[test]
    fn integer_comparison_wraps_on_extremes() {
        let a = InviteIdentity::new(i32::MAX, 0, None, "REQUEST");
        let b = InviteIdentity::new(i32::MIN, 0, None, "REQUEST");
        // MAX - MIN wraps to -1 even though MAX > MIN.
        assert_eq!(a.compare(Some(&b)), -1);
    }

    #[test]
    fn equality_requires_matching_recurrence_key() {
        let plain = InviteIdentity::new(1, 0, None, "REQUEST");
        let keyed = InviteIdentity::new(1, 0, Some(key("20260101T080000Z")), "REQUEST");
        assert_eq!(plain, plain.clone());
        assert_ne!(plain, keyed);
    }

    #[test]
    fn metadata_round_trip() {
        let m = map();
        let id = InviteIdentity::new(
            42,
            3,
            Some(key("RANGE=THISANDFUTURE:20260101T080000Z")),
            "REQUEST",
        );
        let meta = id.encode_metadata();
        assert_eq!(meta.get_i64("i", 0), 42);
        assert_eq!(
            meta.get_str("r"),
            Some("RANGE=THISANDFUTURE:20260101T080000Z")
        );
        assert_eq!(InviteIdentity::decode_metadata(&meta, None, &m).unwrap(), id);
    }

    #[test]
    fn metadata_without_recurrence_key() {
        let m = map();
        let id = InviteIdentity::new(7, 0, None, "PUBLISH");
        let meta = id.encode_metadata();
        assert!(meta.get_str("r").is_none());
        assert_eq!(InviteIdentity::decode_metadata(&meta, None, &m).unwrap(), id);
    }
}
