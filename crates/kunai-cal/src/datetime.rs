//! Timezone-qualified point in time.

use std::fmt;

use chrono::NaiveDateTime;

use crate::duration::CalDuration;
use crate::error::{CalError, CalResult};
use crate::tz::TimeZoneMap;

/// How a datetime's wall-clock fields relate to an absolute instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateTimeForm {
    /// Trailing `Z`: the wall clock is UTC.
    Utc,
    /// No zone qualification; treated as UTC for instant math.
    Floating,
    /// Qualified by a TZID carried at the property level.
    Zoned { tzid: String },
}

/// A parsed datetime value: wall-clock fields, their form, and the resolved
/// UTC instant.
///
/// The instant is resolved once at construction through the timezone map
/// collaborator, so later arithmetic (period derivation) needs no further
/// disambiguation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalDateTime {
    naive: NaiveDateTime,
    date_only: bool,
    form: DateTimeForm,
    utc: chrono::DateTime<chrono::Utc>,
}

impl CalDateTime {
    /// Parses `YYYYMMDD` or `YYYYMMDD`T`HHMMSS[Z]`.
    ///
    /// A trailing `Z` wins over the TZID hint; otherwise the hint selects
    /// the zoned form and its absence leaves the value floating.
    ///
    /// ## Errors
    /// Returns [`CalError::Format`] on malformed input.
    pub fn parse(s: &str, tzid: Option<&str>, map: &TimeZoneMap) -> CalResult<Self> {
        let bad = || CalError::Format(format!("invalid datetime: {s}"));

        let (date_part, time_part) = match s.find(['T', 't']) {
            Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
            None => (s, None),
        };

        let date = parse_date_fields(date_part).ok_or_else(bad)?;
        let (time, is_utc, date_only) = match time_part {
            None => (chrono::NaiveTime::MIN, false, true),
            Some(t) => {
                let (t, z) = match t.strip_suffix(['Z', 'z']) {
                    Some(stripped) => (stripped, true),
                    None => (t, false),
                };
                (parse_time_fields(t).ok_or_else(bad)?, z, false)
            }
        };

        let naive = NaiveDateTime::new(date, time);
        let form = if is_utc {
            DateTimeForm::Utc
        } else if let Some(tzid) = tzid {
            DateTimeForm::Zoned {
                tzid: tzid.to_string(),
            }
        } else {
            DateTimeForm::Floating
        };
        let utc = map.resolve_to_utc(naive, &form);

        Ok(Self {
            naive,
            date_only,
            form,
            utc,
        })
    }

    /// Returns the wall-clock fields.
    #[must_use]
    pub fn naive(&self) -> NaiveDateTime {
        self.naive
    }

    /// Returns the resolved UTC instant.
    #[must_use]
    pub fn utc(&self) -> chrono::DateTime<chrono::Utc> {
        self.utc
    }

    /// Returns the datetime form.
    #[must_use]
    pub fn form(&self) -> &DateTimeForm {
        &self.form
    }

    /// Returns the TZID qualifying this value, if any.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match &self.form {
            DateTimeForm::Zoned { tzid } => Some(tzid),
            DateTimeForm::Utc | DateTimeForm::Floating => None,
        }
    }

    /// Returns whether this value was parsed from a date-only production.
    #[must_use]
    pub fn is_date_only(&self) -> bool {
        self.date_only
    }

    /// Returns this datetime advanced by a duration.
    ///
    /// Wall clock and instant advance by the same number of seconds; the
    /// form is kept. A date-only value stays date-only when the duration is
    /// a whole number of days.
    #[must_use]
    pub fn plus(&self, duration: &CalDuration) -> Self {
        let secs = duration.total_seconds();
        let delta = chrono::Duration::seconds(secs);
        Self {
            naive: self.naive + delta,
            date_only: self.date_only && secs % 86_400 == 0,
            form: self.form.clone(),
            utc: self.utc + delta,
        }
    }

    /// Returns the duration from `earlier` to `self`, computed on the
    /// resolved instants and decomposed into days/hours/minutes/seconds.
    #[must_use]
    pub fn minus(&self, earlier: &Self) -> CalDuration {
        CalDuration::from_seconds((self.utc - earlier.utc).num_seconds())
    }
}

impl fmt::Display for CalDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.date_only {
            return write!(f, "{}", self.naive.format("%Y%m%d"));
        }
        write!(f, "{}", self.naive.format("%Y%m%dT%H%M%S"))?;
        if self.form == DateTimeForm::Utc {
            write!(f, "Z")?;
        }
        Ok(())
    }
}

fn parse_date_fields(s: &str) -> Option<chrono::NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..8].parse().ok()?;
    chrono::NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_time_fields(s: &str) -> Option<chrono::NaiveTime> {
    if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = s[0..2].parse().ok()?;
    let minute: u32 = s[2..4].parse().ok()?;
    let second: u32 = s[4..6].parse().ok()?;
    chrono::NaiveTime::from_hms_opt(hour, minute, second)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> TimeZoneMap {
        TimeZoneMap::new()
    }

    #[test]
    fn parse_utc() {
        let dt = CalDateTime::parse("20260315T143000Z", None, &map()).unwrap();
        assert_eq!(dt.form(), &DateTimeForm::Utc);
        assert_eq!(dt.to_string(), "20260315T143000Z");
    }

    #[test]
    fn parse_floating() {
        let dt = CalDateTime::parse("20260315T143000", None, &map()).unwrap();
        assert_eq!(dt.form(), &DateTimeForm::Floating);
        assert_eq!(dt.to_string(), "20260315T143000");
    }

    #[test]
    fn parse_zoned_by_hint() {
        let dt =
            CalDateTime::parse("20260315T143000", Some("America/New_York"), &map()).unwrap();
        assert_eq!(dt.tzid(), Some("America/New_York"));
        // EDT on that date: UTC-4.
        assert_eq!(dt.utc().to_rfc3339(), "2026-03-15T18:30:00+00:00");
    }

    #[test]
    fn trailing_z_wins_over_hint() {
        let dt =
            CalDateTime::parse("20260315T143000Z", Some("America/New_York"), &map()).unwrap();
        assert_eq!(dt.form(), &DateTimeForm::Utc);
    }

    #[test]
    fn parse_date_only() {
        let dt = CalDateTime::parse("20260315", None, &map()).unwrap();
        assert!(dt.is_date_only());
        assert_eq!(dt.to_string(), "20260315");
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["2026", "20261301T000000", "20260101T996000", "20260101Tabc"] {
            assert!(CalDateTime::parse(bad, None, &map()).is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn plus_and_minus_are_inverse() {
        let m = map();
        let start = CalDateTime::parse("20260101T080000Z", None, &m).unwrap();
        let dur = CalDuration::parse("P1DT2H").unwrap();

        let end = start.plus(&dur);
        assert_eq!(end.to_string(), "20260102T100000Z");
        assert_eq!(end.minus(&start).total_seconds(), dur.total_seconds());
    }

    #[test]
    fn date_only_survives_whole_day_add() {
        let m = map();
        let d = CalDateTime::parse("20260101", None, &m).unwrap();
        assert!(d.plus(&CalDuration::parse("P2D").unwrap()).is_date_only());
        assert!(!d.plus(&CalDuration::parse("PT1H").unwrap()).is_date_only());
    }
}
