//! Calendar interchange layer.
//!
//! Converts in-memory calendar property values between three external
//! forms: the RFC 5545-style text property grammar, the wire element tree
//! used by the remote procedure protocol, and the persisted key-value tree
//! used for durable storage. Also owns the timezone rule registry and the
//! translator between platform-native time-of-change records and
//! normalized onset rules.
//!
//! All codec operations are pure, synchronous transformations; the one
//! piece of process-wide state is the [`tz::TimeZoneRegistry`], loaded once
//! at startup and read-only afterward.

pub mod error;
pub mod ical;
pub mod tz;
pub mod values;

mod datetime;
mod duration;

pub use datetime::{CalDateTime, DateTimeForm};
pub use duration::CalDuration;
pub use error::{CalError, CalResult};
