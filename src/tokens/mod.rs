//! Rough token estimates for display.
//!
//! Counts use a character heuristic (about four characters per token for
//! English text and JSON). They are informational only and never drive a
//! decision.
//!
//! ```rust
//! use mcp_gate::tokens;
//!
//! assert_eq!(tokens::count_tokens(""), 0);
//! assert_eq!(tokens::format_token_count(1500), "1.5k");
//! ```

use crate::models::ServerConfig;

const CHARS_PER_TOKEN: usize = 4;

/// Approximate token count of `content`.
#[must_use]
pub fn count_tokens(content: &str) -> usize {
    content.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Approximate context cost of a server definition.
///
/// Based on the definition's compact JSON form.
#[must_use]
pub fn estimate_server_tokens(config: &ServerConfig) -> usize {
    serde_json::to_string(config).map_or(0, |json| count_tokens(&json))
}

/// Format a token count for human-readable display.
///
/// Formats large numbers with k/M suffixes for readability.
///
/// ```rust
/// use mcp_gate::tokens::format_token_count;
///
/// assert_eq!(format_token_count(500), "500");
/// assert_eq!(format_token_count(1500000), "1.5M");
/// ```
#[must_use]
pub fn format_token_count(count: usize) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}k", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}
