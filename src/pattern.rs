/// URL glob matching for grouping rules
use log::warn;
use regex::{Regex, RegexBuilder};

/// Check whether a URL matches any of the given glob patterns
///
/// Pattern syntax:
/// - `*` matches any sequence of characters, including none
/// - every other character matches itself literally
/// - the pattern must cover the whole URL (implicit `^` and `$`)
///
/// Comparison is case-insensitive. An empty pattern list never matches.
/// A pattern that cannot be compiled is logged and treated as a non-match,
/// so a bad rule never interrupts event handling.
///
/// Examples:
/// - `https://mail.example.com/x` vs `https://mail.example.com/*` → true
/// - `https://mail.example.org/x` vs `https://mail.example.com/*` → false
pub fn matches(url: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| match compile_glob(pattern) {
        Ok(regex) => regex.is_match(url),
        Err(e) => {
            warn!("Skipping unusable pattern {:?}: {}", pattern, e);
            false
        }
    })
}

/// Translate a glob into an anchored, case-insensitive regex
fn compile_glob(pattern: &str) -> Result<Regex, regex::Error> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    RegexBuilder::new(&format!("^{}$", body))
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
}
