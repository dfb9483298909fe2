/// Tab event handling: route tabs into groups and sweep empty groups
use futures_util::lock::Mutex;
use log::{debug, info, warn};
use thiserror::Error;

use crate::config::ConfigHandle;
use crate::groups::{GroupError, GroupManager};
use crate::host::{HostError, TabHost};
use crate::resolver::resolve_rule;
use crate::tab_data::{GroupId, RemoveInfo, TabChange, TabId, TabInfo, WindowId};

/// What handling a tab event amounted to
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Grouped { tab_id: TabId, group_id: GroupId },
    Skipped(SkipReason),
    Failed(DispatchError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ConfigUnavailable,
    NoUrl,
    NotNavigation,
    NoMatchingRule,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DispatchError {
    #[error(transparent)]
    Group(#[from] GroupError),

    #[error("could not move tab {tab_id} into group {group_id}: {source}")]
    Assign {
        tab_id: TabId,
        group_id: GroupId,
        source: HostError,
    },
}

/// Result of a cleanup sweep
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    pub removed: Vec<GroupId>,
    pub failures: Vec<HostError>,
}

/// Reacts to tab lifecycle events
///
/// Every handler returns a value instead of an error so that one bad event
/// never stops later ones; failures are logged here as well. Grouping and
/// sweeping hold `busy` from lookup to assignment, so two events for the
/// same title cannot both create a group, and a sweep never sees a group
/// between creation and assignment.
pub struct EventDispatcher<H> {
    host: H,
    config: ConfigHandle,
    busy: Mutex<()>,
}

impl<H: TabHost> EventDispatcher<H> {
    pub fn new(host: H, config: ConfigHandle) -> Self {
        EventDispatcher {
            host,
            config,
            busy: Mutex::new(()),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub async fn on_tab_created(&self, tab: &TabInfo) -> Outcome {
        self.group_tab(tab.id, tab.window_id, tab.target_url()).await
    }

    /// Only navigations matter; title, favicon and status changes are ignored
    pub async fn on_tab_updated(&self, tab_id: TabId, change: &TabChange, tab: &TabInfo) -> Outcome {
        let Some(url) = change.changed_url() else {
            return Outcome::Skipped(SkipReason::NotNavigation);
        };
        self.group_tab(tab_id, tab.window_id, Some(url)).await
    }

    pub async fn on_tab_removed(&self, tab_id: TabId, info: &RemoveInfo) -> SweepReport {
        if info.is_window_closing {
            debug!("Tab {} removed with window {}", tab_id, info.window_id);
        }
        self.cleanup_empty_groups().await
    }

    /// Delete every group, in every window, that has no tabs left
    ///
    /// A failure on one window or group is recorded and the sweep moves on.
    pub async fn cleanup_empty_groups(&self) -> SweepReport {
        let _busy = self.busy.lock().await;
        let mut report = SweepReport::default();

        let windows = match self.host.windows().await {
            Ok(windows) => windows,
            Err(e) => {
                warn!("Cleanup skipped: {}", e);
                report.failures.push(e);
                return report;
            }
        };

        for window_id in windows {
            self.sweep_window(window_id, &mut report).await;
        }

        report
    }

    async fn sweep_window(&self, window_id: WindowId, report: &mut SweepReport) {
        let groups = match self.host.query_groups(window_id, None).await {
            Ok(groups) => groups,
            Err(e) => {
                warn!("Could not list groups in window {}: {}", window_id, e);
                report.failures.push(e);
                return;
            }
        };

        for group in groups {
            let empty = match self.host.group_tabs(group.id).await {
                Ok(tabs) => tabs.is_empty(),
                Err(e) => {
                    warn!("Could not list tabs of group {}: {}", group.id, e);
                    report.failures.push(e);
                    continue;
                }
            };
            if !empty {
                continue;
            }

            match self.host.remove_group(group.id).await {
                Ok(()) => {
                    info!("Removed empty group {:?} ({})", group.title, group.id);
                    report.removed.push(group.id);
                }
                Err(e) => {
                    warn!("Could not remove group {}: {}", group.id, e);
                    report.failures.push(e);
                }
            }
        }
    }

    async fn group_tab(&self, tab_id: TabId, window_id: WindowId, url: Option<&str>) -> Outcome {
        let Some(config) = self.config.snapshot() else {
            debug!("Tab {}: configuration not available", tab_id);
            return Outcome::Skipped(SkipReason::ConfigUnavailable);
        };
        let Some(url) = url else {
            return Outcome::Skipped(SkipReason::NoUrl);
        };
        let Some(rule) = resolve_rule(Some(url), Some(&*config)) else {
            debug!("Tab {}: no rule for {}", tab_id, url);
            return Outcome::Skipped(SkipReason::NoMatchingRule);
        };

        let _busy = self.busy.lock().await;
        let manager = GroupManager::new(&self.host);

        let (group_id, partial) = match manager.ensure_group_with(window_id, rule, &[tab_id]).await {
            Ok(group_id) => (group_id, None),
            Err(e) => match e.created_group() {
                Some(group_id) => (group_id, Some(e)),
                None => {
                    warn!("Tab {} not grouped: {}", tab_id, e);
                    return Outcome::Failed(e.into());
                }
            },
        };

        if let Err(source) = self.host.add_to_group(group_id, &[tab_id]).await {
            let e = DispatchError::Assign {
                tab_id,
                group_id,
                source,
            };
            warn!("{}", e);
            return Outcome::Failed(e);
        }

        match partial {
            Some(e) => Outcome::Failed(e.into()),
            None => {
                debug!("Tab {} grouped under {:?} ({})", tab_id, rule.group, group_id);
                Outcome::Grouped { tab_id, group_id }
            }
        }
    }
}
