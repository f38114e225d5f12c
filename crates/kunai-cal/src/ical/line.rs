//! Content line and parameter types.

use std::fmt;

/// A property parameter (`PARAM=VALUE`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name (normalized to uppercase).
    pub name: String,
    /// Parameter value; quoting is removed on parse and re-applied on
    /// output when the value requires it.
    pub value: Option<String>,
}

impl Parameter {
    /// Creates a parameter with a value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            value: Some(value.into()),
        }
    }

    /// Returns the parameter value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns whether the value needs quoting on output.
    fn needs_quoting(value: &str) -> bool {
        value.contains([':', ';', ','])
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) if Self::needs_quoting(v) => write!(f, "{}=\"{}\"", self.name, v),
            Some(v) => write!(f, "{}={}", self.name, v),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A content line: `NAME;PARAM=VALUE;...:VALUE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<Parameter>,
    /// Raw value text after the colon.
    pub value: String,
}

impl ContentLine {
    /// Creates a content line with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: value.into(),
        }
    }

    /// Creates a content line with parameters.
    #[must_use]
    pub fn with_params(
        name: impl Into<String>,
        params: Vec<Parameter>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params,
            value: value.into(),
        }
    }

    /// Returns the parameter with the given name (case-insensitive).
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Parameter> {
        let upper = name.to_ascii_uppercase();
        self.params.iter().find(|p| p.name == upper)
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.param(name)?.value()
    }

    /// Appends a parameter.
    pub fn add_param(&mut self, param: Parameter) {
        self.params.push(param);
    }

    /// Serializes this line folded at the 75-octet limit.
    #[must_use]
    pub fn to_folded_string(&self) -> String {
        fold_line(&self.to_string())
    }
}

impl fmt::Display for ContentLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for param in &self.params {
            write!(f, ";{param}")?;
        }
        write!(f, ":{}", self.value)
    }
}

/// Folds a content line at 75 octets per RFC 5545 §3.1.
///
/// Continuation lines begin with a single space. Folding happens at
/// character boundaries so UTF-8 sequences are never split.
#[must_use]
pub fn fold_line(line: &str) -> String {
    const LIMIT: usize = 75;

    if line.len() <= LIMIT {
        return format!("{line}\r\n");
    }

    let mut out = String::with_capacity(line.len() + line.len() / LIMIT * 3 + 2);
    let mut budget = LIMIT;
    for ch in line.chars() {
        let width = ch.len_utf8();
        if width > budget {
            out.push_str("\r\n ");
            // One octet of the continuation line is used by the space.
            budget = LIMIT - 1;
        }
        out.push(ch);
        budget -= width;
    }
    out.push_str("\r\n");
    out
}
