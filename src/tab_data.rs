/// Data structures for tabs, tab changes and tab groups
use serde::{Deserialize, Serialize};

use crate::config::{GroupColor, Rule};

pub type TabId = i32;
pub type WindowId = i32;
pub type GroupId = i32;

/// Information about a browser tab, as delivered with tab events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,
    pub window_id: WindowId,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub pending_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl TabInfo {
    pub fn new(id: TabId, window_id: WindowId, url: &str) -> TabInfo {
        TabInfo {
            id,
            window_id,
            url: Some(url.to_string()),
            pending_url: None,
            title: None,
        }
    }

    /// The URL the tab is heading to: the pending URL while a navigation is
    /// in flight, otherwise the committed one. Empty strings count as absent.
    pub fn target_url(&self) -> Option<&str> {
        non_empty(self.pending_url.as_deref()).or_else(|| non_empty(self.url.as_deref()))
    }
}

/// The set of properties that changed in a tab-updated event
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabChange {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub fav_icon_url: Option<String>,
}

impl TabChange {
    pub fn url(url: &str) -> TabChange {
        TabChange {
            url: Some(url.to_string()),
            ..TabChange::default()
        }
    }

    /// The new URL, if this change is a navigation
    pub fn changed_url(&self) -> Option<&str> {
        non_empty(self.url.as_deref())
    }
}

/// Details passed along with a tab-removed event
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoveInfo {
    pub window_id: WindowId,
    #[serde(default)]
    pub is_window_closing: bool,
}

/// A tab group as reported by the browser
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupInfo {
    pub id: GroupId,
    pub window_id: WindowId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub color: Option<GroupColor>,
    #[serde(default)]
    pub collapsed: bool,
}

/// Display properties applied to a freshly created group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupUpdate {
    pub title: String,
    pub color: GroupColor,
    pub collapsed: bool,
}

impl From<&Rule> for GroupUpdate {
    fn from(rule: &Rule) -> Self {
        GroupUpdate {
            title: rule.group.clone(),
            color: rule.color,
            collapsed: rule.collapsed,
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}
