use std::fmt;

use kunai_core::metadata::Metadata;

use crate::datetime::CalDateTime;
use crate::duration::CalDuration;
use crate::error::{CalError, CalResult};
use crate::tz::TimeZoneMap;

const FN_START: &str = "dts";
const FN_END: &str = "dte";
const FN_DURATION: &str = "dur";

/// The half of a period that was given explicitly. The other half is
/// derived on demand, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Tail {
    End(CalDateTime),
    Duration(CalDuration),
}

/// A time period: a start plus either an explicit end or an explicit
/// duration.
///
/// Whichever arm was given is authoritative and is the one rendered on
/// output; the other arm is always available as a derived value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    start: CalDateTime,
    tail: Tail,
}

impl Period {
    #[must_use]
    pub fn from_end(start: CalDateTime, end: CalDateTime) -> Self {
        Self {
            start,
            tail: Tail::End(end),
        }
    }

    #[must_use]
    pub fn from_duration(start: CalDateTime, duration: CalDuration) -> Self {
        Self {
            start,
            tail: Tail::Duration(duration),
        }
    }

    #[must_use]
    pub fn start(&self) -> &CalDateTime {
        &self.start
    }

    /// Returns the end, deriving `start + duration` when the duration arm
    /// is authoritative.
    #[must_use]
    pub fn end(&self) -> CalDateTime {
        match &self.tail {
            Tail::End(end) => end.clone(),
            Tail::Duration(dur) => self.start.plus(dur),
        }
    }

    /// Returns the duration, deriving `end - start` when the end arm is
    /// authoritative.
    #[must_use]
    pub fn duration(&self) -> CalDuration {
        match &self.tail {
            Tail::End(end) => end.minus(&self.start),
            Tail::Duration(dur) => dur.clone(),
        }
    }

    /// Returns whether the end arm is the authoritative one.
    #[must_use]
    pub fn has_explicit_end(&self) -> bool {
        matches!(self.tail, Tail::End(_))
    }

    /// Parses `start/end` or `start/duration`.
    ///
    /// The value splits at the first `/`. A second part starting with
    /// `P`, `+` or `-` is a duration; anything else is an end datetime.
    /// Both datetimes are zone-qualified by the same TZID hint.
    ///
    /// ## Errors
    ///
    /// Returns [`CalError::Format`] when the first part is empty, the
    /// second part is shorter than two characters, or either half fails
    /// to parse.
    pub fn parse(s: &str, tzid: Option<&str>, map: &TimeZoneMap) -> CalResult<Self> {
        let bad = || CalError::Format(format!("invalid period: {s}"));

        let slash = s.find('/').ok_or_else(bad)?;
        if slash == 0 {
            return Err(bad());
        }
        let (start_text, rest) = (&s[..slash], &s[slash + 1..]);
        if rest.len() < 2 {
            return Err(bad());
        }

        let start = CalDateTime::parse(start_text, tzid, map)?;
        if rest.starts_with(['P', '+', '-']) {
            Ok(Self::from_duration(start, CalDuration::parse(rest)?))
        } else {
            Ok(Self::from_end(start, CalDateTime::parse(rest, tzid, map)?))
        }
    }

    #[must_use]
    pub fn encode_metadata(&self) -> Metadata {
        let mut meta = Metadata::new();
        meta.put(FN_START, self.start.to_string());
        match &self.tail {
            Tail::End(end) => meta.put(FN_END, end.to_string()),
            Tail::Duration(dur) => meta.put(FN_DURATION, dur.to_string()),
        }
        meta
    }

    /// Decodes the persisted form. When a record carries both an end and
    /// a duration, the end wins.
    ///
    /// ## Errors
    ///
    /// Fails when the start is missing or when neither an end nor a
    /// duration is present.
    pub fn decode_metadata(
        meta: &Metadata,
        tzid: Option<&str>,
        map: &TimeZoneMap,
    ) -> CalResult<Self> {
        let start_text = meta.get_str(FN_START).ok_or_else(|| {
            CalError::InvalidData("period record is missing its start".to_owned())
        })?;
        let start = CalDateTime::parse(start_text, tzid, map)?;

        if let Some(end_text) = meta.get_str(FN_END) {
            let end = CalDateTime::parse(end_text, tzid, map)?;
            return Ok(Self::from_end(start, end));
        }
        if let Some(dur_text) = meta.get_str(FN_DURATION) {
            return Ok(Self::from_duration(start, CalDuration::parse(dur_text)?));
        }
        Err(CalError::InvalidData(
            "period record has neither end nor duration".to_owned(),
        ))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/", self.start)?;
        match &self.tail {
            Tail::End(end) => write!(f, "{end}"),
            Tail::Duration(dur) => write!(f, "{dur}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> TimeZoneMap {
        TimeZoneMap::new()
    }

    #[test]
    fn parse_end_form() {
        let p = Period::parse("20260101T080000Z/20260101T100000Z", None, &map()).unwrap();
        assert!(p.has_explicit_end());
        assert_eq!(p.duration().to_string(), "PT2H");
        assert_eq!(p.to_string(), "20260101T080000Z/20260101T100000Z");
    }

    #[test]
    fn parse_duration_form() {
        let p = Period::parse("20260101T080000Z/PT2H", None, &map()).unwrap();
        assert!(!p.has_explicit_end());
        assert_eq!(p.end().to_string(), "20260101T100000Z");
        assert_eq!(p.to_string(), "20260101T080000Z/PT2H");
    }

    #[test]
    fn signed_duration_selects_duration_arm() {
        let p = Period::parse("20260101T080000Z/+PT1H", None, &map()).unwrap();
        assert!(!p.has_explicit_end());
        assert_eq!(p.duration().total_seconds(), 3600);
    }

    #[test]
    fn parse_rejects_bad_shapes() {
        for bad in [
            "20260101T080000Z",           // no slash
            "/20260101T100000Z",          // empty first part
            "20260101T080000Z/P",         // second part too short
            "20260101T080000Z/",          // empty second part
            "nonsense/20260101T100000Z",  // bad start
        ] {
            assert!(Period::parse(bad, None, &map()).is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn derived_arms_stay_consistent() {
        let m = map();
        let p = Period::parse("20260101T080000Z/20260102T080000Z", None, &m).unwrap();
        assert_eq!(p.duration().total_seconds(), 86_400);

        let q = Period::parse("20260101T080000Z/P1D", None, &m).unwrap();
        assert_eq!(q.end(), p.end());
    }

    #[test]
    fn metadata_round_trip_end_form() {
        let m = map();
        let p = Period::parse("20260101T080000Z/20260101T100000Z", None, &m).unwrap();
        let meta = p.encode_metadata();
        assert_eq!(meta.get_str("dte"), Some("20260101T100000Z"));
        assert!(meta.get_str("dur").is_none());
        assert_eq!(Period::decode_metadata(&meta, None, &m).unwrap(), p);
    }

    #[test]
    fn metadata_round_trip_duration_form() {
        let m = map();
        let p = Period::parse("20260101T080000Z/PT30M", None, &m).unwrap();
        let meta = p.encode_metadata();
        assert_eq!(meta.get_str("dur"), Some("PT30M"));
        assert_eq!(Period::decode_metadata(&meta, None, &m).unwrap(), p);
    }

    #[test]
    fn metadata_prefers_end_when_both_present() {
        let m = map();
        let mut meta = Metadata::new();
        meta.put(FN_START, "20260101T080000Z");
        meta.put(FN_END, "20260101T090000Z");
        meta.put(FN_DURATION, "PT5H");
        let p = Period::decode_metadata(&meta, None, &m).unwrap();
        assert!(p.has_explicit_end());
        assert_eq!(p.duration().total_seconds(), 3600);
    }

    #[test]
    fn metadata_without_tail_fails() {
        let m = map();
        let mut meta = Metadata::new();
        meta.put(FN_START, "20260101T080000Z");
        assert!(Period::decode_metadata(&meta, None, &m).is_err());
    }
}
