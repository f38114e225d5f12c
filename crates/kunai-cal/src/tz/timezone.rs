//! Timezone rule sets built from VTIMEZONE components.

use chrono::NaiveDateTime;

use crate::error::{CalError, CalResult};
use crate::ical::{Component, ComponentKind};

use super::onset::Onset;

/// A timezone rule set: standard and daylight offsets plus the onset rules
/// that switch between them.
///
/// Built once from a VTIMEZONE component and immutable afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalTimeZone {
    id: String,
    std_offset_secs: i32,
    day_offset_secs: i32,
    std_onset: Option<Onset>,
    day_onset: Option<Onset>,
    std_name: Option<String>,
    day_name: Option<String>,
}

/// One STANDARD or DAYLIGHT observance, as read from the component.
struct Observance {
    offset_secs: i32,
    onset: Option<Onset>,
    name: Option<String>,
}

impl CalTimeZone {
    /// Builds a rule set from a VTIMEZONE component.
    ///
    /// ## Errors
    /// Returns [`CalError::Format`] if the component is not a VTIMEZONE,
    /// has no TZID, or an observance is missing its offset.
    pub fn from_component(comp: &Component) -> CalResult<Self> {
        if comp.kind != ComponentKind::Timezone {
            return Err(CalError::Format(format!(
                "expected VTIMEZONE, got {}",
                comp.name
            )));
        }
        let id = comp
            .property_value("TZID")
            .ok_or_else(|| CalError::Format("VTIMEZONE without TZID".to_string()))?
            .to_string();

        let standard = comp
            .children_of(ComponentKind::Standard)
            .next()
            .map(parse_observance)
            .transpose()?;
        let daylight = comp
            .children_of(ComponentKind::Daylight)
            .next()
            .map(parse_observance)
            .transpose()?;

        let std = standard.ok_or_else(|| {
            CalError::Format(format!("VTIMEZONE {id} has no STANDARD observance"))
        })?;
        // A zone without daylight saving reuses the standard offset.
        let (day_offset_secs, day_onset, day_name) = match daylight {
            Some(day) => (day.offset_secs, day.onset, day.name),
            None => (std.offset_secs, None, None),
        };

        Ok(Self {
            id,
            std_offset_secs: std.offset_secs,
            day_offset_secs,
            std_onset: std.onset,
            day_onset,
            std_name: std.name,
            day_name,
        })
    }

    /// Returns the timezone identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the standard-time UTC offset in seconds.
    #[must_use]
    pub fn standard_offset_secs(&self) -> i32 {
        self.std_offset_secs
    }

    /// Returns the daylight-time UTC offset in seconds.
    #[must_use]
    pub fn daylight_offset_secs(&self) -> i32 {
        self.day_offset_secs
    }

    /// Returns the onset rule switching to standard time, if any.
    #[must_use]
    pub fn standard_onset(&self) -> Option<&Onset> {
        self.std_onset.as_ref()
    }

    /// Returns the onset rule switching to daylight time, if any.
    #[must_use]
    pub fn daylight_onset(&self) -> Option<&Onset> {
        self.day_onset.as_ref()
    }

    /// Returns the standard-time display name, if any.
    #[must_use]
    pub fn standard_name(&self) -> Option<&str> {
        self.std_name.as_deref()
    }

    /// Returns the daylight-time display name, if any.
    #[must_use]
    pub fn daylight_name(&self) -> Option<&str> {
        self.day_name.as_deref()
    }

    /// Returns whether this zone observes daylight saving.
    #[must_use]
    pub fn observes_daylight(&self) -> bool {
        self.day_offset_secs != self.std_offset_secs && self.day_onset.is_some()
    }

    /// Returns the UTC offset in effect for a wall-clock time in this zone.
    ///
    /// Handles both hemisphere orderings of the daylight window. Without
    /// usable onset rules the standard offset applies year-round.
    #[must_use]
    pub fn utc_offset_secs(&self, at: NaiveDateTime) -> i32 {
        let (Some(day_onset), Some(std_onset)) = (&self.day_onset, &self.std_onset) else {
            return self.std_offset_secs;
        };
        if !self.observes_daylight() {
            return self.std_offset_secs;
        }

        let year = chrono::Datelike::year(&at);
        let day_start = day_onset.datetime_in_year(year);
        let std_start = std_onset.datetime_in_year(year);

        let in_daylight = if day_start <= std_start {
            // Northern hemisphere: daylight window inside the year.
            at >= day_start && at < std_start
        } else {
            // Southern hemisphere: window wraps the year boundary.
            at >= day_start || at < std_start
        };
        if in_daylight {
            self.day_offset_secs
        } else {
            self.std_offset_secs
        }
    }
}

fn parse_observance(comp: &Component) -> CalResult<Observance> {
    let offset_text = comp.property_value("TZOFFSETTO").ok_or_else(|| {
        CalError::Format(format!("{} observance without TZOFFSETTO", comp.name))
    })?;
    let offset_secs = parse_utc_offset(offset_text)?;
    let name = comp.property_value("TZNAME").map(ToOwned::to_owned);

    let dtstart = comp.property_value("DTSTART").map(parse_local_fields).transpose()?;
    let rrule = comp.property_value("RRULE");

    let onset = match (rrule, dtstart) {
        (Some(rule), dtstart) => Some(parse_yearly_rule(rule, dtstart)?),
        (None, Some((year, month, day, hour, minute, second))) => Some(Onset::Absolute {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }),
        (None, None) => None,
    };

    Ok(Observance {
        offset_secs,
        onset,
        name,
    })
}

/// Parses `(+|-)HHMM[SS]` into signed seconds.
fn parse_utc_offset(s: &str) -> CalResult<i32> {
    let bad = || CalError::Format(format!("invalid UTC offset: {s}"));

    let (sign, digits) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(bad()),
    };
    if !(digits.len() == 4 || digits.len() == 6) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    let hours: i32 = digits[0..2].parse().map_err(|_| bad())?;
    let minutes: i32 = digits[2..4].parse().map_err(|_| bad())?;
    let seconds: i32 = if digits.len() == 6 {
        digits[4..6].parse().map_err(|_| bad())?
    } else {
        0
    };
    Ok(sign * (hours * 3600 + minutes * 60 + seconds))
}

type LocalFields = (u16, u8, u8, u8, u8, u8);

/// Parses a local `YYYYMMDDTHHMMSS` observance start into its fields.
fn parse_local_fields(s: &str) -> CalResult<LocalFields> {
    let bad = || CalError::Format(format!("invalid observance DTSTART: {s}"));

    let (date, time) = s.split_once(['T', 't']).ok_or_else(bad)?;
    if date.len() != 8 || time.len() != 6 {
        return Err(bad());
    }
    let all_digits = |t: &str| t.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(date) || !all_digits(time) {
        return Err(bad());
    }
    Ok((
        date[0..4].parse().map_err(|_| bad())?,
        date[4..6].parse().map_err(|_| bad())?,
        date[6..8].parse().map_err(|_| bad())?,
        time[0..2].parse().map_err(|_| bad())?,
        time[2..4].parse().map_err(|_| bad())?,
        time[4..6].parse().map_err(|_| bad())?,
    ))
}

/// Parses a yearly recurrence rule (`FREQ=YEARLY;BYMONTH=m;BYDAY=[-]nDD`)
/// into a recurring onset, taking the change time (and fallback month)
/// from the observance DTSTART.
fn parse_yearly_rule(rule: &str, dtstart: Option<LocalFields>) -> CalResult<Onset> {
    let bad = |what: &str| CalError::Format(format!("{what} in observance RRULE: {rule}"));

    let mut by_month: Option<u8> = None;
    let mut by_day: Option<(i8, u8)> = None;
    for part in rule.split(';') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key.to_ascii_uppercase().as_str() {
            "BYMONTH" => {
                by_month = Some(
                    value
                        .split(',')
                        .next()
                        .unwrap_or(value)
                        .parse()
                        .map_err(|_| bad("bad BYMONTH"))?,
                );
            }
            "BYDAY" => {
                by_day = Some(parse_weekday_num(value).ok_or_else(|| bad("bad BYDAY"))?);
            }
            _ => {}
        }
    }

    let (week, day_of_week) = by_day.ok_or_else(|| bad("missing BYDAY"))?;
    let (month, hour, minute, second) = match dtstart {
        Some((_, m, _, h, min, s)) => (by_month.unwrap_or(m), h, min, s),
        None => (by_month.ok_or_else(|| bad("missing BYMONTH"))?, 0, 0, 0),
    };

    Ok(Onset::Recurring {
        week,
        day_of_week,
        month,
        hour,
        minute,
        second,
    })
}

/// Parses `[-]nDD` (e.g. `2SU`, `-1SU`) into (week, 1-based day-of-week).
fn parse_weekday_num(s: &str) -> Option<(i8, u8)> {
    let s = s.split(',').next()?.trim();
    let split = s.len().checked_sub(2)?;
    let (num, day) = s.split_at(split);
    let week: i8 = if num.is_empty() { 1 } else { num.parse().ok()? };
    if week == 0 || week > 5 || week < -1 {
        return None;
    }
    let day_of_week = match day.to_ascii_uppercase().as_str() {
        "SU" => 1,
        "MO" => 2,
        "TU" => 3,
        "WE" => 4,
        "TH" => 5,
        "FR" => 6,
        "SA" => 7,
        _ => return None,
    };
    Some((week, day_of_week))
}
