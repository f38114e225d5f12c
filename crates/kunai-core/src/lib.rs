//! Foundation crate for the kunai calendar interchange layer.
//!
//! Holds the pieces every other layer depends on and nothing that depends
//! on them: the shared error taxonomy, the persisted key-value tree
//! ([`metadata::Metadata`]), and the wire element tree
//! ([`element::Element`]).

pub mod element;
pub mod error;
pub mod metadata;
