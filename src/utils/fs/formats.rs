//! Safe JSON parsing and serialization.
//!
//! Every function here reports failure as a value instead of propagating a
//! typed error, so callers that only want "did it parse?" never need to match
//! on a parser error. The strict reader used for config files lives in
//! [`crate::mcp::ConfigStore::read`]; [`read_json_file`] is the lenient
//! convenience path.
//!
//! # Examples
//!
//! ```rust
//! use mcp_gate::utils::fs::formats::{parse, stringify};
//! use serde_json::Value;
//!
//! let value: Value = parse(r#"{"a": 1}"#).unwrap();
//! assert_eq!(stringify(&value, false).unwrap(), r#"{"a":1}"#);
//! assert!(parse::<Value>("{invalid json}").is_err());
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Outcome of a safe parse or stringify: the value or a diagnostic string.
pub type ParseResult<T> = std::result::Result<T, String>;

/// Parse `text` as JSON into `T`.
///
/// The error string carries the parser's line/column diagnostic.
pub fn parse<T>(text: &str) -> ParseResult<T>
where
    T: DeserializeOwned,
{
    serde_json::from_str(text).map_err(|e| e.to_string())
}

/// Parse `text`, then require `predicate` to accept the parsed value.
///
/// A parse failure returns the parser's diagnostic; a predicate failure
/// returns `error_message` verbatim.
pub fn parse_and_validate<F>(text: &str, predicate: F, error_message: &str) -> ParseResult<Value>
where
    F: FnOnce(&Value) -> bool,
{
    let value: Value = parse(text)?;
    if predicate(&value) { Ok(value) } else { Err(error_message.to_string()) }
}

/// Serialize `value`, pretty-printed with 2-space indentation when `pretty`.
pub fn stringify<T>(value: &T, pretty: bool) -> ParseResult<String>
where
    T: Serialize + ?Sized,
{
    let result =
        if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    result.map_err(|e| e.to_string())
}

/// Read and parse a JSON file, returning `None` on any failure.
///
/// Missing, unreadable, and malformed files all yield `None`; callers cannot
/// tell these apart. Use [`crate::mcp::ConfigStore::read`] when a malformed
/// file must be reported.
#[must_use]
pub fn read_json_file(path: &Path) -> Option<Value> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::trace!("Could not read {}: {e}", path.display());
            return None;
        }
    };
    match parse(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Ignoring malformed JSON in {}: {e}", path.display());
            None
        }
    }
}
