//! Signed calendar duration value (RFC 5545 §3.3.6 grammar).

use std::fmt;

use crate::error::{CalError, CalResult};

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 3600;
const SECS_PER_DAY: i64 = 86_400;
const SECS_PER_WEEK: i64 = 604_800;

/// A signed duration: weeks, or days plus a time part.
///
/// Kept in its component form so the text production round-trips exactly;
/// arithmetic goes through [`CalDuration::total_seconds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalDuration {
    pub negative: bool,
    pub weeks: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl CalDuration {
    /// Parses a duration string: `[+|-]P[nW]` or `[+|-]P[nD][T[nH][nM][nS]]`.
    ///
    /// ## Errors
    /// Returns [`CalError::Format`] on malformed input.
    pub fn parse(s: &str) -> CalResult<Self> {
        let mut dur = Self::default();
        let body = if let Some(rest) = s.strip_prefix('-') {
            dur.negative = true;
            rest
        } else {
            s.strip_prefix('+').unwrap_or(s)
        };
        let body = body
            .strip_prefix(['P', 'p'])
            .ok_or_else(|| CalError::Format(format!("duration must start with P: {s}")))?;

        let mut in_time = false;
        let mut num = String::new();
        let mut saw_field = false;
        let mut time_fields = 0u32;
        for ch in body.chars() {
            match ch {
                '0'..='9' => num.push(ch),
                'T' | 't' => {
                    if in_time || !num.is_empty() {
                        return Err(CalError::Format(format!("malformed duration: {s}")));
                    }
                    in_time = true;
                }
                _ => {
                    let value: u32 = num
                        .parse()
                        .map_err(|_| CalError::Format(format!("malformed duration: {s}")))?;
                    num.clear();
                    saw_field = true;
                    match (ch.to_ascii_uppercase(), in_time) {
                        ('W', false) => dur.weeks = value,
                        ('D', false) => dur.days = value,
                        ('H', true) => {
                            dur.hours = value;
                            time_fields += 1;
                        }
                        ('M', true) => {
                            dur.minutes = value;
                            time_fields += 1;
                        }
                        ('S', true) => {
                            dur.seconds = value;
                            time_fields += 1;
                        }
                        _ => {
                            return Err(CalError::Format(format!(
                                "unexpected duration designator {ch}: {s}"
                            )));
                        }
                    }
                }
            }
        }
        if !num.is_empty() || !saw_field || (in_time && time_fields == 0) {
            return Err(CalError::Format(format!("malformed duration: {s}")));
        }
        Ok(dur)
    }

    /// Builds a duration from a signed number of seconds, decomposed into
    /// days, hours, minutes, and seconds (never weeks).
    #[must_use]
    pub fn from_seconds(total: i64) -> Self {
        let negative = total < 0;
        let mut rest = total.unsigned_abs();
        let days = rest / SECS_PER_DAY.unsigned_abs();
        rest %= SECS_PER_DAY.unsigned_abs();
        let hours = rest / SECS_PER_HOUR.unsigned_abs();
        rest %= SECS_PER_HOUR.unsigned_abs();
        let minutes = rest / SECS_PER_MINUTE.unsigned_abs();
        let seconds = rest % SECS_PER_MINUTE.unsigned_abs();
        Self {
            negative,
            weeks: 0,
            days: u32::try_from(days).unwrap_or(u32::MAX),
            hours: u32::try_from(hours).unwrap_or(u32::MAX),
            minutes: u32::try_from(minutes).unwrap_or(u32::MAX),
            seconds: u32::try_from(seconds).unwrap_or(u32::MAX),
        }
    }

    /// Returns the total signed length in seconds.
    #[must_use]
    pub fn total_seconds(&self) -> i64 {
        let magnitude = i64::from(self.weeks) * SECS_PER_WEEK
            + i64::from(self.days) * SECS_PER_DAY
            + i64::from(self.hours) * SECS_PER_HOUR
            + i64::from(self.minutes) * SECS_PER_MINUTE
            + i64::from(self.seconds);
        if self.negative { -magnitude } else { magnitude }
    }
}

impl fmt::Display for CalDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "P")?;
        if self.weeks > 0 {
            return write!(f, "{}W", self.weeks);
        }
        if self.days > 0 {
            write!(f, "{}D", self.days)?;
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            write!(f, "T")?;
            if self.hours > 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes > 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if self.seconds > 0 {
                write!(f, "{}S", self.seconds)?;
            }
        } else if self.days == 0 {
            // Zero-length duration still needs a designator.
            write!(f, "T0S")?;
        } else {
            // Day-only durations carry no time part.
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_day_time() {
        let d = CalDuration::parse("P15DT5H0M20S").unwrap();
        assert_eq!((d.days, d.hours, d.minutes, d.seconds), (15, 5, 0, 20));
        assert!(!d.negative);
    }

    #[test]
    fn parse_weeks() {
        let d = CalDuration::parse("P7W").unwrap();
        assert_eq!(d.weeks, 7);
        assert_eq!(d.total_seconds(), 7 * 604_800);
    }

    #[test]
    fn parse_signed() {
        assert!(CalDuration::parse("-PT30M").unwrap().negative);
        assert!(!CalDuration::parse("+PT30M").unwrap().negative);
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["P", "-", "PT", "X1D", "P1X", "P1DT", "PT5H6"] {
            assert!(CalDuration::parse(bad).is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn display_round_trip() {
        for text in ["P15DT5H20S", "P7W", "-PT30M", "P1D", "PT0S"] {
            let d = CalDuration::parse(text).unwrap();
            assert_eq!(d.to_string(), text);
        }
    }

    #[test]
    fn from_seconds_decomposition() {
        let d = CalDuration::from_seconds(90_061);
        assert_eq!((d.days, d.hours, d.minutes, d.seconds), (1, 1, 1, 1));
        let d = CalDuration::from_seconds(-3600);
        assert!(d.negative);
        assert_eq!(d.hours, 1);
        assert_eq!(d.total_seconds(), -3600);
    }

    #[test]
    fn from_seconds_never_uses_weeks() {
        let d = CalDuration::from_seconds(14 * 86_400);
        assert_eq!(d.weeks, 0);
        assert_eq!(d.days, 14);
        assert_eq!(d.to_string(), "P14D");
    }
}
