//! Timezone rules: onset translation, rule sets, and the process-wide
//! registry.

mod map;
mod onset;
mod registry;
mod timezone;

pub use map::TimeZoneMap;
pub use onset::{Onset, SystemTime};
pub use registry::TimeZoneRegistry;
pub use timezone::CalTimeZone;
