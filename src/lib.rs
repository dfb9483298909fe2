/// Tab Grouper - Chrome Extension that files tabs into tab groups by URL
/// Built with Rust + WASM

mod config;
mod dispatcher;
mod groups;
mod host;
mod pattern;
mod resolver;
mod tab_data;

#[cfg(target_arch = "wasm32")]
mod chrome;

#[cfg(test)]
mod fake_host;

pub use config::{Config, ConfigError, ConfigHandle, ConfigState, GroupColor, Rule, parse_config};
pub use dispatcher::{DispatchError, EventDispatcher, Outcome, SkipReason, SweepReport};
pub use groups::{GroupError, GroupManager};
pub use host::{HostError, TabHost};
pub use pattern::matches;
pub use resolver::resolve_rule;
pub use tab_data::{GroupId, GroupInfo, GroupUpdate, RemoveInfo, TabChange, TabId, TabInfo, WindowId};

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start grouping tabs from the extension's service worker
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_background() {
    chrome::start();
}

// Options page helper: does `url` match any of `patterns` (an array of strings)?
#[wasm_bindgen]
pub fn matches_url(url: &str, patterns: JsValue) -> bool {
    match serde_wasm_bindgen::from_value::<Vec<String>>(patterns) {
        Ok(patterns) => pattern::matches(url, &patterns),
        Err(e) => {
            log::warn!("Pattern list is not an array of strings: {:?}", e);
            false
        }
    }
}

// Options page helper: title of the group `url` would be filed under
#[wasm_bindgen]
pub fn group_for_url(url: &str, config: JsValue) -> Option<String> {
    let config = parse_config_value(config)
        .map_err(|e| log::warn!("{}", e))
        .ok()?;
    resolver::resolve_rule(Some(url), Some(&config)).map(|rule| rule.group.clone())
}

/// Decode and validate a configuration object handed over from JS
pub(crate) fn parse_config_value(value: JsValue) -> Result<Config, ConfigError> {
    let config: Config =
        serde_wasm_bindgen::from_value(value).map_err(|e| ConfigError::Decode(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
