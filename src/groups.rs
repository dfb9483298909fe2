/// Finding or creating the tab group a rule points at
use log::{info, warn};
use thiserror::Error;

use crate::config::Rule;
use crate::host::{HostError, TabHost};
use crate::tab_data::{GroupId, GroupUpdate, TabId, WindowId};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GroupError {
    #[error("could not look up group {title:?}: {source}")]
    Query { title: String, source: HostError },

    #[error("could not create group {title:?}: {source}")]
    Create { title: String, source: HostError },

    /// The group exists but still carries the browser's default title and color
    #[error("created group {group_id} but could not configure it as {title:?}: {source}")]
    Configure {
        group_id: GroupId,
        title: String,
        source: HostError,
    },
}

impl GroupError {
    /// The group left behind by a failed configuration step, if any
    pub fn created_group(&self) -> Option<GroupId> {
        match self {
            GroupError::Configure { group_id, .. } => Some(*group_id),
            _ => None,
        }
    }
}

pub struct GroupManager<'h, H> {
    host: &'h H,
}

impl<'h, H: TabHost> GroupManager<'h, H> {
    pub fn new(host: &'h H) -> Self {
        GroupManager { host }
    }

    /// Return the id of the window's group titled `rule.group`, creating it
    /// when there is none
    ///
    /// A new group is created empty. Chrome refuses to create a group without
    /// tabs, so against `ChromeHost` this only succeeds when the group already
    /// exists; use [`ensure_group_with`](Self::ensure_group_with) to seed it.
    pub async fn ensure_group(&self, window_id: WindowId, rule: &Rule) -> Result<GroupId, GroupError> {
        self.ensure_group_with(window_id, rule, &[]).await
    }

    /// Like [`ensure_group`](Self::ensure_group), but a newly created group
    /// starts out holding `seed` so it is never observed empty
    ///
    /// Lookup is by title on every call; ids are never cached. The browser's
    /// title filter is a pattern match, so only groups whose title equals
    /// `rule.group` exactly are reused. When several share the title the first
    /// one the browser lists is used.
    pub async fn ensure_group_with(
        &self,
        window_id: WindowId,
        rule: &Rule,
        seed: &[TabId],
    ) -> Result<GroupId, GroupError> {
        let existing = self
            .host
            .query_groups(window_id, Some(&rule.group))
            .await
            .map_err(|source| GroupError::Query {
                title: rule.group.clone(),
                source,
            })?;

        if let Some(group) = existing
            .iter()
            .find(|g| g.title.as_deref() == Some(rule.group.as_str()))
        {
            return Ok(group.id);
        }

        let group_id = self
            .host
            .create_group(window_id, seed)
            .await
            .map_err(|source| GroupError::Create {
                title: rule.group.clone(),
                source,
            })?;

        if let Err(source) = self.host.update_group(group_id, &GroupUpdate::from(rule)).await {
            warn!("Group {} left unconfigured: {}", group_id, source);
            return Err(GroupError::Configure {
                group_id,
                title: rule.group.clone(),
                source,
            });
        }

        info!("Created group {:?} ({}) in window {}", rule.group, group_id, window_id);
        Ok(group_id)
    }
}
