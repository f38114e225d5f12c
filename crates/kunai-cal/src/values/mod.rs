//! Calendar property value types and their codecs.
//!
//! Each type knows three external forms: the text property grammar, the
//! wire element tree, and the persisted key-value tree. The element and
//! attribute names on the wire and the short persisted key names are fixed
//! contracts reproduced exactly.

mod attach;
mod geo;
mod invite;
mod organizer;
mod period;
mod xprop;

pub use attach::Attach;
pub use geo::Geo;
pub use invite::{InviteIdentity, RecurrenceKey, RecurrenceRange};
pub use organizer::Organizer;
pub use period::Period;
pub use xprop::{TRANSPORT_CHANGE_MARKER, Xparam, Xprop, decode_xprops, encode_xprops};
