//! Brewin Core: the value model shared by interpreter and embedders
//!
//! This crate holds the language-agnostic pieces of Brewin: what the
//! language talks about (tagged values) and how source tokens map onto
//! literals. It contains no execution logic.
//!
//! Key design principles:
//! - Value: a closed tagged union of Int, Str, Bool (booleans are NOT
//!   integers; there is no coercion between tags)
//! - Literal recognisers: the single source of truth for what counts as
//!   an integer literal, a string token, or a boolean literal

pub mod value;

pub use value::Value;
