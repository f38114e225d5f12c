//! Onset rules and the platform-native time-of-change translator.
//!
//! An onset describes when a timezone's UTC offset changes: on an absolute
//! date, or on a recurring rule such as "last Sunday of October". The
//! native descriptor mirrors the Windows `SYSTEMTIME` layout used by the
//! platform interop surface.

use chrono::Datelike;

/// A normalized time-of-change rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Onset {
    /// A concrete date and time.
    Absolute {
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    },
    /// A recurring rule: the `week`-th `day_of_week` of `month`, where
    /// `week` is 1..=5 or -1 for "last", and `day_of_week` is 1-based with
    /// 1 = Sunday.
    Recurring {
        week: i8,
        day_of_week: u8,
        month: u8,
        hour: u8,
        minute: u8,
        second: u8,
    },
}

/// Platform-native time-of-change descriptor (Windows `SYSTEMTIME` layout).
///
/// `year == 0` marks a recurring rule, in which case `day` holds the week
/// code (1..=4, or 5 for "last") and `day_of_week` is 0-based with
/// 0 = Sunday. A non-zero `year` marks an absolute time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemTime {
    pub year: u16,
    pub month: u16,
    pub day_of_week: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    pub milliseconds: u16,
}

impl Onset {
    /// Translates this onset to the native descriptor.
    ///
    /// Recurring rules produce a `year == 0` record with week `-1` encoded
    /// as code 5 and the day-of-week shifted to 0-based. Absolute onsets
    /// are pinned to the current calendar year: the native record needs a
    /// concrete day-of-week, which is computed for the rule's month/day in
    /// this year so that round-trips stay stable within a run.
    #[must_use]
    pub fn to_system_time(&self) -> SystemTime {
        match *self {
            Self::Recurring {
                week,
                day_of_week,
                month,
                hour,
                minute,
                second,
            } => SystemTime {
                year: 0,
                month: u16::from(month),
                day_of_week: u16::from(day_of_week.saturating_sub(1)),
                day: if week == -1 { 5 } else { week.unsigned_abs().into() },
                hour: u16::from(hour),
                minute: u16::from(minute),
                second: u16::from(second),
                milliseconds: 0,
            },
            Self::Absolute {
                month,
                day,
                hour,
                minute,
                second,
                ..
            } => {
                let year = current_year();
                SystemTime {
                    year,
                    month: u16::from(month),
                    day_of_week: weekday_from_sunday(year, month, day),
                    day: u16::from(day),
                    hour: u16::from(hour),
                    minute: u16::from(minute),
                    second: u16::from(second),
                    milliseconds: 0,
                }
            }
        }
    }

    /// Translates a native descriptor back to a normalized onset.
    ///
    /// Only `year == 0` records describe a recurring rule; a year-bearing
    /// record is an explicit absolute time and yields `None` (not an
    /// error). Week code 5 maps back to `-1` and the day-of-week shifts
    /// back to 1-based.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "native fields are small codes")]
    pub fn from_system_time(st: &SystemTime) -> Option<Self> {
        if st.year != 0 {
            return None;
        }
        Some(Self::Recurring {
            week: if st.day == 5 { -1 } else { st.day as i8 },
            day_of_week: (st.day_of_week + 1) as u8,
            month: st.month as u8,
            hour: st.hour as u8,
            minute: st.minute as u8,
            second: st.second as u8,
        })
    }

    /// Resolves this onset to a wall-clock datetime within `year`.
    ///
    /// For recurring rules the week/day-of-week pair is resolved against
    /// the month's actual calendar; for absolute rules the stored month and
    /// day are taken with the given year, rolling over lenient out-of-range
    /// days.
    #[must_use]
    pub fn datetime_in_year(&self, year: i32) -> chrono::NaiveDateTime {
        match *self {
            Self::Absolute {
                month,
                day,
                hour,
                minute,
                second,
                ..
            } => date_lenient(year, month, day).and_hms_opt(
                u32::from(hour),
                u32::from(minute),
                u32::from(second),
            )
            .unwrap_or_default(),
            Self::Recurring {
                week,
                day_of_week,
                month,
                hour,
                minute,
                second,
            } => {
                let date = resolve_week_rule(year, month, week, day_of_week);
                date.and_hms_opt(u32::from(hour), u32::from(minute), u32::from(second))
                    .unwrap_or_default()
            }
        }
    }
}

/// Year used when synthesizing absolute native records.
fn current_year() -> u16 {
    let year = chrono::Utc::now().year();
    u16::try_from(year).unwrap_or(0)
}

/// Day of week for `year-month-day`, 0 = Sunday, proleptic Gregorian.
#[expect(clippy::cast_possible_truncation, reason = "weekday index is 0..=6")]
fn weekday_from_sunday(year: u16, month: u8, day: u8) -> u16 {
    let date = date_lenient(i32::from(year), month, day);
    date.weekday().num_days_from_sunday() as u16
}

/// Builds a date allowing out-of-range days to roll over into the next
/// month, matching lenient calendar behavior.
fn date_lenient(year: i32, month: u8, day: u8) -> chrono::NaiveDate {
    let base = chrono::NaiveDate::from_ymd_opt(year, u32::from(month.clamp(1, 12)), 1)
        .unwrap_or_default();
    base + chrono::Duration::days(i64::from(day.max(1)) - 1)
}

/// Resolves "the `week`-th `day_of_week` of `month`" to a date.
fn resolve_week_rule(year: i32, month: u8, week: i8, day_of_week: u8) -> chrono::NaiveDate {
    let target = u32::from(day_of_week.clamp(1, 7)) - 1; // 0 = Sunday
    if week == -1 {
        // Last occurrence: walk back from the final day of the month.
        let first_of_next = next_month_start(year, month);
        let mut date = first_of_next - chrono::Duration::days(1);
        while date.weekday().num_days_from_sunday() != target {
            date -= chrono::Duration::days(1);
        }
        date
    } else {
        let mut date = date_lenient(year, month, 1);
        while date.weekday().num_days_from_sunday() != target {
            date += chrono::Duration::days(1);
        }
        date + chrono::Duration::weeks(i64::from(week.clamp(1, 5)) - 1)
    }
}

fn next_month_start(year: i32, month: u8) -> chrono::NaiveDate {
    if month >= 12 {
        date_lenient(year + 1, 1, 1)
    } else {
        date_lenient(year, month + 1, 1)
    }
}
