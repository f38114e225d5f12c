use kunai_core::element::Element;
use kunai_core::metadata::Metadata;

use crate::ical::ContentLine;

const E_GEO: &str = "geo";
const A_LAT: &str = "lat";
const A_LON: &str = "lon";

const FN_LATITUDE: &str = "lat";
const FN_LONGITUDE: &str = "lon";

/// A geographic position as a pair of decimal coordinate strings.
///
/// Coordinates are kept as opaque text. Nothing ever parses them as
/// numbers, so values like `37.386013` survive byte for byte.
#[derive(Debug, Clone)]
pub struct Geo {
    latitude: Option<String>,
    longitude: Option<String>,
}

impl Geo {
    #[must_use]
    pub fn new(latitude: Option<String>, longitude: Option<String>) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    #[must_use]
    pub fn latitude(&self) -> Option<&str> {
        self.latitude.as_deref()
    }

    #[must_use]
    pub fn longitude(&self) -> Option<&str> {
        self.longitude.as_deref()
    }

    /// Parses the `lat;lon` property value.
    ///
    /// Malformed input (anything other than exactly two `;`-separated
    /// fields) falls back to the origin `0;0` rather than failing.
    #[must_use]
    pub fn parse_text(value: &str) -> Self {
        let parts: Vec<&str> = value.split(';').collect();
        if parts.len() == 2 {
            Self::new(Some(parts[0].to_owned()), Some(parts[1].to_owned()))
        } else {
            tracing::debug!(value, "malformed GEO value, defaulting to 0;0");
            Self::new(Some("0".to_owned()), Some("0".to_owned()))
        }
    }

    #[must_use]
    pub fn to_content_line(&self) -> ContentLine {
        let value = format!(
            "{};{}",
            self.latitude.as_deref().unwrap_or("0"),
            self.longitude.as_deref().unwrap_or("0")
        );
        ContentLine::new("GEO", value)
    }

    pub fn to_element(&self, parent: &mut Element) {
        let el = parent.add_element(E_GEO);
        el.add_attribute(A_LAT, self.latitude.as_deref().unwrap_or("0"));
        el.add_attribute(A_LON, self.longitude.as_deref().unwrap_or("0"));
    }

    #[must_use]
    pub fn from_element(el: &Element) -> Self {
        Self::new(
            Some(el.attribute_or(A_LAT, "0").to_owned()),
            Some(el.attribute_or(A_LON, "0").to_owned()),
        )
    }

    #[must_use]
    pub fn encode_metadata(&self) -> Metadata {
        let mut meta = Metadata::new();
        if let Some(lat) = &self.latitude {
            meta.put(FN_LATITUDE, lat.as_str());
        }
        if let Some(lon) = &self.longitude {
            meta.put(FN_LONGITUDE, lon.as_str());
        }
        meta
    }

    #[must_use]
    pub fn decode_metadata(meta: &Metadata) -> Self {
        Self::new(
            Some(meta.get_or(FN_LATITUDE, "0").to_owned()),
            Some(meta.get_or(FN_LONGITUDE, "0").to_owned()),
        )
    }
}

/// Two positions are equal only when both coordinate pairs are present
/// and textually identical. A position with an absent coordinate is
/// equal to nothing, itself included.
impl PartialEq for Geo {
    fn eq(&self, other: &Self) -> bool {
        match (
            &self.latitude,
            &self.longitude,
            &other.latitude,
            &other.longitude,
        ) {
            (Some(a), Some(b), Some(c), Some(d)) => a == c && b == d,
            _ => false,
        }
    }
}
