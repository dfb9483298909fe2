/// The browser operations the grouping logic depends on
use thiserror::Error;

use crate::tab_data::{GroupId, GroupInfo, GroupUpdate, TabId, WindowId};

/// A browser call that failed, with the operation that was attempted
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{operation} failed: {message}")]
pub struct HostError {
    pub operation: &'static str,
    pub message: String,
}

impl HostError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        HostError {
            operation,
            message: message.into(),
        }
    }
}

/// Tab and tab-group operations provided by the browser
///
/// Implementations are single-threaded: futures are awaited on the JS event
/// loop and need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait TabHost {
    /// Groups in a window, optionally restricted to an exact title
    async fn query_groups(
        &self,
        window_id: WindowId,
        title: Option<&str>,
    ) -> Result<Vec<GroupInfo>, HostError>;

    /// Create a new group in a window holding the given tabs
    async fn create_group(
        &self,
        window_id: WindowId,
        tab_ids: &[TabId],
    ) -> Result<GroupId, HostError>;

    async fn update_group(&self, group_id: GroupId, update: &GroupUpdate) -> Result<(), HostError>;

    /// Ids of the tabs currently in a group
    async fn group_tabs(&self, group_id: GroupId) -> Result<Vec<TabId>, HostError>;

    /// Move tabs into an existing group
    async fn add_to_group(&self, group_id: GroupId, tab_ids: &[TabId]) -> Result<(), HostError>;

    async fn remove_group(&self, group_id: GroupId) -> Result<(), HostError>;

    async fn windows(&self) -> Result<Vec<WindowId>, HostError>;
}
