/// Grouping rules and the load-once configuration slot
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Root configuration document (`config.json`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub rules: Vec<Rule>,
}

/// Maps a set of URL globs to the group tabs should land in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub group: String,
    pub color: GroupColor,
    #[serde(default)]
    pub collapsed: bool,
    pub urls: Vec<String>,
}

/// Colors Chrome accepts for tab groups
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    Grey,
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Decode(String),

    #[error("rule #{index} has an empty group title")]
    EmptyGroupTitle { index: usize },

    #[error("configuration was already set")]
    AlreadySet,
}

impl Config {
    /// Check invariants serde cannot express
    ///
    /// Rules without patterns are allowed but can never match, so they are
    /// only reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.group.trim().is_empty() {
                return Err(ConfigError::EmptyGroupTitle { index });
            }
            if rule.urls.is_empty() {
                warn!("Rule {:?} has no URL patterns and will never match", rule.group);
            }
        }
        Ok(())
    }
}

/// Parse and validate a configuration document
pub fn parse_config(json: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Where the configuration is in its one-way lifecycle
#[derive(Debug, Clone)]
pub enum ConfigState {
    Loading,
    Ready(Rc<Config>),
    Unavailable(String),
}

/// Shared, single-threaded handle to the configuration slot
///
/// Event listeners are registered before the asynchronous load finishes, so
/// "not loaded yet" is a normal state. The slot leaves `Loading` exactly once.
#[derive(Clone)]
pub struct ConfigHandle {
    state: Rc<RefCell<ConfigState>>,
}

impl ConfigHandle {
    pub fn new() -> Self {
        ConfigHandle {
            state: Rc::new(RefCell::new(ConfigState::Loading)),
        }
    }

    /// A handle that is already loaded, for callers that have the config at hand
    pub fn ready(config: Config) -> Self {
        ConfigHandle {
            state: Rc::new(RefCell::new(ConfigState::Ready(Rc::new(config)))),
        }
    }

    pub fn install(&self, config: Config) -> Result<(), ConfigError> {
        let rules = config.rules.len();
        self.transition(ConfigState::Ready(Rc::new(config)))?;
        info!("Loaded {} grouping rule(s)", rules);
        Ok(())
    }

    pub fn mark_unavailable(&self, reason: impl fmt::Display) -> Result<(), ConfigError> {
        self.transition(ConfigState::Unavailable(reason.to_string()))
    }

    /// The loaded configuration, or `None` while loading or after a failed load
    pub fn snapshot(&self) -> Option<Rc<Config>> {
        match &*self.state.borrow() {
            ConfigState::Ready(config) => Some(Rc::clone(config)),
            _ => None,
        }
    }

    pub fn state(&self) -> ConfigState {
        self.state.borrow().clone()
    }

    fn transition(&self, next: ConfigState) -> Result<(), ConfigError> {
        let mut state = self.state.borrow_mut();
        if !matches!(*state, ConfigState::Loading) {
            return Err(ConfigError::AlreadySet);
        }
        *state = next;
        Ok(())
    }
}

impl Default for ConfigHandle {
    fn default() -> Self {
        Self::new()
    }
}
