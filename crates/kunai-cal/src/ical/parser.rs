//! Component tree parser.
//!
//! Parses a container document (BEGIN/END balanced) into a [`Component`]
//! tree. Used by the timezone registry to read its source file.

use crate::error::{CalError, CalResult};

use super::component::Component;
use super::lexer::{parse_content_line, split_lines};

/// Parses a calendar document into its root component.
///
/// ## Errors
/// Returns [`CalError::Format`] if the input is empty, a content line is
/// malformed, or BEGIN/END markers are unbalanced.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse_document(input: &str) -> CalResult<Component> {
    let lines = split_lines(input);
    if lines.is_empty() {
        return Err(CalError::Format("empty calendar document".to_string()));
    }
    tracing::debug!(count = lines.len(), "parsing calendar document");

    let mut iter = lines.iter().map(String::as_str).peekable();
    let root = parse_component(&mut iter)?;

    if iter.peek().is_some() {
        return Err(CalError::Format(
            "trailing content after root component".to_string(),
        ));
    }
    Ok(root)
}

fn parse_component<'a>(
    iter: &mut std::iter::Peekable<impl Iterator<Item = &'a str>>,
) -> CalResult<Component> {
    let begin = iter
        .next()
        .ok_or_else(|| CalError::Format("expected BEGIN line".to_string()))?;
    let begin = parse_content_line(begin)?;
    if begin.name != "BEGIN" {
        return Err(CalError::Format(format!(
            "expected BEGIN, got {}",
            begin.name
        )));
    }

    let mut component = Component::new(begin.value.as_str());

    loop {
        let Some(&line) = iter.peek() else {
            return Err(CalError::Format(format!("missing END:{}", component.name)));
        };
        let parsed = parse_content_line(line)?;
        match parsed.name.as_str() {
            "BEGIN" => {
                let child = parse_component(iter)?;
                component.children.push(child);
            }
            "END" => {
                iter.next();
                if !parsed.value.eq_ignore_ascii_case(&component.name) {
                    return Err(CalError::Format(format!(
                        "mismatched END: expected {}, got {}",
                        component.name, parsed.value
                    )));
                }
                return Ok(component);
            }
            _ => {
                iter.next();
                component.lines.push(parsed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ical::ComponentKind;

    const SIMPLE: &str = "\
BEGIN:VCALENDAR\r\n\
PRODID:-//Test//EN\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:America/New_York\r\n\
BEGIN:STANDARD\r\n\
TZOFFSETTO:-0500\r\n\
END:STANDARD\r\n\
END:VTIMEZONE\r\n\
END:VCALENDAR\r\n";

    #[test_log::test]
    fn parses_nested_components() {
        let root = parse_document(SIMPLE).unwrap();
        assert_eq!(root.kind, ComponentKind::Calendar);
        assert_eq!(root.property_value("PRODID"), Some("-//Test//EN"));
        let tz = root.children_of(ComponentKind::Timezone).next().unwrap();
        assert_eq!(tz.property_value("TZID"), Some("America/New_York"));
        let std = tz.children_of(ComponentKind::Standard).next().unwrap();
        assert_eq!(std.property_value("TZOFFSETTO"), Some("-0500"));
    }

    #[test]
    fn missing_end_fails() {
        let input = "BEGIN:VCALENDAR\r\nPRODID:x\r\n";
        assert!(matches!(parse_document(input), Err(CalError::Format(_))));
    }

    #[test]
    fn mismatched_end_fails() {
        let input = "BEGIN:VCALENDAR\r\nEND:VEVENT\r\n";
        assert!(matches!(parse_document(input), Err(CalError::Format(_))));
    }

    #[test]
    fn empty_document_fails() {
        assert!(matches!(parse_document(""), Err(CalError::Format(_))));
    }
}
