use kunai_core::metadata::Metadata;

use crate::ical::{ContentLine, Parameter};

const FN_NAME: &str = "n";
const FN_VALUE: &str = "v";
const FN_COUNT: &str = "numX";
const FN_ENTRY_PREFIX: &str = "x";

/// Transport-only change marker. It travels on the wire between client
/// and server but must never survive a persistence round trip, so both
/// encode and decode drop it.
pub const TRANSPORT_CHANGE_MARKER: &str = "X-KUNAI-CHANGES";

/// A vendor extension parameter on an extension property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xparam {
    pub name: String,
    pub value: Option<String>,
}

impl Xparam {
    #[must_use]
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A vendor `X-`-prefixed property, preserved opaquely with its
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xprop {
    pub name: String,
    pub value: Option<String>,
    pub params: Vec<Xparam>,
}

impl Xprop {
    #[must_use]
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
            params: Vec::new(),
        }
    }

    pub fn add_param(&mut self, param: Xparam) {
        self.params.push(param);
    }

    #[must_use]
    pub fn to_content_line(&self) -> ContentLine {
        let mut line = ContentLine::new(
            self.name.clone(),
            self.value.clone().unwrap_or_default(),
        );
        for param in &self.params {
            line.add_param(match &param.value {
                Some(v) => Parameter::new(param.name.clone(), v.clone()),
                None => Parameter {
                    name: param.name.to_ascii_uppercase(),
                    value: None,
                },
            });
        }
        line
    }

    #[must_use]
    pub fn from_content_line(line: &ContentLine) -> Self {
        let mut prop = Self::new(
            line.name.clone(),
            if line.value.is_empty() {
                None
            } else {
                Some(line.value.clone())
            },
        );
        for param in &line.params {
            prop.add_param(Xparam::new(param.name.clone(), param.value.clone()));
        }
        prop
    }
}

/// Writes an ordered extension bag into `meta` as numbered nested
/// records (`x0`, `x1`, ...), each holding a name and an optional value,
/// with parameters encoded recursively inside each record by the same
/// scheme. Entries with an empty name and the transport change marker
/// are skipped. The count key is written only when at least one entry
/// survived; its absence is the canonical zero-extension form.
pub fn encode_xprops(meta: &mut Metadata, props: &[Xprop]) {
    let mut count = 0usize;
    for prop in props {
        if prop.name.is_empty() || prop.name.eq_ignore_ascii_case(TRANSPORT_CHANGE_MARKER) {
            continue;
        }
        let mut entry = Metadata::new();
        entry.put(FN_NAME, prop.name.as_str());
        if let Some(value) = &prop.value {
            entry.put(FN_VALUE, value.as_str());
        }
        encode_xparams(&mut entry, &prop.params);
        meta.put(format!("{FN_ENTRY_PREFIX}{count}"), entry);
        count += 1;
    }
    if count > 0 {
        meta.put(FN_COUNT, count);
    }
}

fn encode_xparams(meta: &mut Metadata, params: &[Xparam]) {
    let mut count = 0usize;
    for param in params {
        if param.name.is_empty() {
            continue;
        }
        let mut entry = Metadata::new();
        entry.put(FN_NAME, param.name.as_str());
        if let Some(value) = &param.value {
            entry.put(FN_VALUE, value.as_str());
        }
        meta.put(format!("{FN_ENTRY_PREFIX}{count}"), entry);
        count += 1;
    }
    if count > 0 {
        meta.put(FN_COUNT, count);
    }
}

/// Reads an extension bag back in index order. Entries that are missing,
/// nameless, or carry the transport change marker are skipped rather
/// than failing the whole bag.
#[must_use]
pub fn decode_xprops(meta: &Metadata) -> Vec<Xprop> {
    let count = meta.get_i64(FN_COUNT, 0);
    let mut props = Vec::new();
    for i in 0..count {
        let Some(entry) = meta.get_map(&format!("{FN_ENTRY_PREFIX}{i}")) else {
            continue;
        };
        let Some(name) = entry.get_str(FN_NAME) else {
            continue;
        };
        if name.eq_ignore_ascii_case(TRANSPORT_CHANGE_MARKER) {
            continue;
        }
        let mut prop = Xprop::new(name, entry.get_str(FN_VALUE).map(str::to_owned));
        prop.params = decode_xparams(entry);
        props.push(prop);
    }
    props
}

fn decode_xparams(meta: &Metadata) -> Vec<Xparam> {
    let count = meta.get_i64(FN_COUNT, 0);
    let mut params = Vec::new();
    for i in 0..count {
        let Some(entry) = meta.get_map(&format!("{FN_ENTRY_PREFIX}{i}")) else {
            continue;
        };
        let Some(name) = entry.get_str(FN_NAME) else {
            continue;
        };
        params.push(Xparam::new(name, entry.get_str(FN_VALUE).map(str::to_owned)));
    }
    params
}
