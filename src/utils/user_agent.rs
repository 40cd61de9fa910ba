//! User-agent parsing
//!
//! Thin wrapper around woothee that reduces a raw User-Agent header to the
//! `(browser, platform)` pair stored on click records. Pure and infallible:
//! anything woothee cannot classify comes back as empty strings.

use once_cell::sync::Lazy;
use woothee::parser::Parser;

static PARSER: Lazy<Parser> = Lazy::new(Parser::new);

/// Parse a raw User-Agent string into `(browser, platform)`.
pub fn parse(raw: &str) -> (String, String) {
    match PARSER.parse(raw) {
        Some(result) => {
            let browser = if result.name.is_empty() || result.name == "UNKNOWN" {
                String::new()
            } else {
                result.name.to_string()
            };
            let platform = if result.os.is_empty() || result.os == "UNKNOWN" {
                String::new()
            } else {
                result.os.to_string()
            };
            (browser, platform)
        }
        None => (String::new(), String::new()),
    }
}
