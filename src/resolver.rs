/// First-match lookup of the grouping rule for a URL
use crate::config::{Config, Rule};
use crate::pattern::matches;

/// Find the rule that applies to a URL
///
/// Rules are tried in configuration order and the first match wins; later
/// matching rules are ignored. Returns `None` when the configuration is not
/// loaded, the URL is absent or nothing matches.
pub fn resolve_rule<'a>(url: Option<&str>, config: Option<&'a Config>) -> Option<&'a Rule> {
    let url = url?;
    config?.rules.iter().find(|rule| matches(url, &rule.urls))
}
