//! Component tree types.

use super::line::ContentLine;

/// Component kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// VCALENDAR container.
    Calendar,
    /// VEVENT component.
    Event,
    /// VTODO component.
    Todo,
    /// VFREEBUSY component.
    FreeBusy,
    /// VTIMEZONE component.
    Timezone,
    /// STANDARD sub-component of VTIMEZONE.
    Standard,
    /// DAYLIGHT sub-component of VTIMEZONE.
    Daylight,
    /// Anything else, including X-components.
    Unknown,
}

impl ComponentKind {
    /// Parses a component kind from its name (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "VCALENDAR" => Self::Calendar,
            "VEVENT" => Self::Event,
            "VTODO" => Self::Todo,
            "VFREEBUSY" => Self::FreeBusy,
            "VTIMEZONE" => Self::Timezone,
            "STANDARD" => Self::Standard,
            "DAYLIGHT" => Self::Daylight,
            _ => Self::Unknown,
        }
    }
}

/// A parsed component: properties as raw content lines plus nested
/// sub-components, both in order of appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Resolved kind.
    pub kind: ComponentKind,
    /// Original component name (preserved for unknown components).
    pub name: String,
    /// Properties in order of appearance.
    pub lines: Vec<ContentLine>,
    /// Nested sub-components in order of appearance.
    pub children: Vec<Component>,
}

impl Component {
    /// Creates an empty component with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into().to_ascii_uppercase();
        Self {
            kind: ComponentKind::parse(&name),
            name,
            lines: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Returns the first property with the given name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&ContentLine> {
        let upper = name.to_ascii_uppercase();
        self.lines.iter().find(|l| l.name == upper)
    }

    /// Returns the value of the first property with the given name.
    #[must_use]
    pub fn property_value(&self, name: &str) -> Option<&str> {
        self.property(name).map(|l| l.value.as_str())
    }

    /// Iterates children of a given kind in order.
    pub fn children_of(&self, kind: ComponentKind) -> impl Iterator<Item = &Component> {
        self.children.iter().filter(move |c| c.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parse_case_insensitive() {
        assert_eq!(ComponentKind::parse("vtimezone"), ComponentKind::Timezone);
        assert_eq!(ComponentKind::parse("STANDARD"), ComponentKind::Standard);
        assert_eq!(ComponentKind::parse("X-CUSTOM"), ComponentKind::Unknown);
    }

    #[test]
    fn property_lookup() {
        let mut comp = Component::new("VTIMEZONE");
        comp.lines.push(ContentLine::new("TZID", "America/New_York"));
        assert_eq!(comp.property_value("tzid"), Some("America/New_York"));
        assert_eq!(comp.property_value("TZURL"), None);
    }
}
