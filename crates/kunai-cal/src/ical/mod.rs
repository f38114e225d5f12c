//! Text property grammar (RFC 5545-style).
//!
//! Content lines, parameters, and the component tree, plus the lexer and
//! parser that read them from calendar text. Property *values* are kept as
//! raw text here; the per-type codecs in [`crate::values`] decode them.

mod component;
mod lexer;
mod line;
mod parser;

pub use component::{Component, ComponentKind};
pub use lexer::{parse_content_line, split_lines, unfold};
pub use line::{ContentLine, Parameter, fold_line};
pub use parser::parse_document;
