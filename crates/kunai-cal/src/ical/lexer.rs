//! Content line lexer.
//!
//! Handles line unfolding and tokenization of `NAME;PARAM=VALUE:VALUE`
//! lines. Malformed lines surface as [`CalError::Format`].

use crate::error::{CalError, CalResult};

use super::line::{ContentLine, Parameter};

/// Unfolds content lines by removing a line break followed by a single
/// whitespace character. Handles both CRLF and bare LF endings.
#[must_use]
pub fn unfold(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        let is_break = match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                true
            }
            '\n' => true,
            _ => false,
        };
        if !is_break {
            out.push(ch);
            continue;
        }
        if matches!(chars.peek(), Some(' ' | '\t')) {
            // Fold: drop the break and the single whitespace.
            chars.next();
        } else {
            out.push('\n');
        }
    }
    out
}

/// Splits input into unfolded, non-empty content line strings.
#[must_use]
pub fn split_lines(input: &str) -> Vec<String> {
    unfold(input)
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Parses one unfolded content line.
///
/// ## Errors
/// Returns [`CalError::Format`] if the line has no name, an invalid name
/// character, or no value separator.
pub fn parse_content_line(line: &str) -> CalResult<ContentLine> {
    let name_end = line
        .find([';', ':'])
        .ok_or_else(|| CalError::Format(format!("content line has no value separator: {line}")))?;
    if name_end == 0 {
        return Err(CalError::Format(format!(
            "content line has no property name: {line}"
        )));
    }
    let name = &line[..name_end];
    if !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        return Err(CalError::Format(format!("invalid property name: {name}")));
    }

    // Walk parameters until the value colon.
    let mut params = Vec::new();
    let mut cursor = name_end;
    while line.as_bytes()[cursor] == b';' {
        let (param, next) = parse_parameter(line, cursor + 1)?;
        params.push(param);
        cursor = next;
    }
    // cursor now sits on the ':'.
    let value = &line[cursor + 1..];

    Ok(ContentLine::with_params(name, params, value))
}

/// Parses one parameter starting at `start`; returns the parameter and the
/// index of the terminator (`;` or `:`) that follows it.
fn parse_parameter(line: &str, start: usize) -> CalResult<(Parameter, usize)> {
    let bytes = line.as_bytes();
    let eq = line[start..]
        .find('=')
        .map(|i| start + i)
        .ok_or_else(|| CalError::Format(format!("parameter without '=': {line}")))?;
    let name = &line[start..eq];
    if name.is_empty() {
        return Err(CalError::Format(format!("empty parameter name: {line}")));
    }

    // Quoted value: consume to the closing quote.
    if bytes.get(eq + 1) == Some(&b'"') {
        let close = line[eq + 2..]
            .find('"')
            .map(|i| eq + 2 + i)
            .ok_or_else(|| CalError::Format(format!("unterminated quoted parameter: {line}")))?;
        let value = &line[eq + 2..close];
        let term = close + 1;
        if !matches!(bytes.get(term), Some(b';' | b':')) {
            return Err(CalError::Format(format!(
                "expected ';' or ':' after quoted parameter: {line}"
            )));
        }
        return Ok((Parameter::new(name, value), term));
    }

    let term = line[eq + 1..]
        .find([';', ':'])
        .map(|i| eq + 1 + i)
        .ok_or_else(|| CalError::Format(format!("parameter runs past end of line: {line}")))?;
    let value = &line[eq + 1..term];
    Ok((Parameter::new(name, value), term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfold_crlf_space() {
        let input = "DESCRIPTION:part one\r\n  and part two";
        assert_eq!(unfold(input), "DESCRIPTION:part one and part two");
    }

    #[test]
    fn unfold_bare_lf_tab() {
        let input = "SUMMARY:abc\n\tdef";
        assert_eq!(unfold(input), "SUMMARY:abcdef");
    }

    #[test]
    fn split_skips_blank_lines() {
        let lines = split_lines("A:1\r\n\r\nB:2\r\n");
        assert_eq!(lines, vec!["A:1".to_string(), "B:2".to_string()]);
    }

    #[test]
    fn parse_plain_line() {
        let cl = parse_content_line("SUMMARY:Team Meeting").unwrap();
        assert_eq!(cl.name, "SUMMARY");
        assert!(cl.params.is_empty());
        assert_eq!(cl.value, "Team Meeting");
    }

    #[test]
    fn parse_line_with_params() {
        let cl = parse_content_line("DTSTART;TZID=America/New_York:20260123T120000").unwrap();
        assert_eq!(cl.name, "DTSTART");
        assert_eq!(cl.param_value("TZID"), Some("America/New_York"));
        assert_eq!(cl.value, "20260123T120000");
    }

    #[test]
    fn parse_line_with_quoted_param() {
        let cl = parse_content_line("ORGANIZER;CN=\"Doe, Jane\":MAILTO:jane@example.com").unwrap();
        assert_eq!(cl.param_value("CN"), Some("Doe, Jane"));
        assert_eq!(cl.value, "MAILTO:jane@example.com");
    }

    #[test]
    fn parse_line_missing_colon_fails() {
        assert!(matches!(
            parse_content_line("SUMMARY"),
            Err(CalError::Format(_))
        ));
    }

    #[test]
    fn parse_line_bad_name_fails() {
        assert!(matches!(
            parse_content_line("BAD NAME:value"),
            Err(CalError::Format(_))
        ));
    }

    #[test]
    fn parse_empty_value() {
        let cl = parse_content_line("X-EMPTY:").unwrap();
        assert_eq!(cl.value, "");
    }
}
