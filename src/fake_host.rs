/// In-memory browser used by the unit tests
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::config::GroupColor;
use crate::host::{HostError, TabHost};
use crate::pattern::matches;
use crate::tab_data::{GroupId, GroupInfo, GroupUpdate, TabId, WindowId};

#[derive(Default)]
struct FakeState {
    next_group_id: GroupId,
    windows: Vec<WindowId>,
    groups: Vec<GroupInfo>,
    members: BTreeMap<TabId, GroupId>,
    failing: HashSet<&'static str>,
    pattern_titles: bool,
    calls: Vec<&'static str>,
}

#[derive(Default)]
pub struct FakeHost {
    state: RefCell<FakeState>,
}

impl FakeHost {
    pub fn with_windows(windows: &[WindowId]) -> Self {
        let host = FakeHost::default();
        {
            let mut state = host.state.borrow_mut();
            state.windows = windows.to_vec();
            state.next_group_id = 100;
        }
        host
    }

    /// Make every later call of `operation` fail
    pub fn fail_on(&self, operation: &'static str) {
        self.state.borrow_mut().failing.insert(operation);
    }

    /// Treat the title passed to `query_groups` as a glob, as Chrome does
    pub fn match_titles_as_patterns(&self) {
        self.state.borrow_mut().pattern_titles = true;
    }

    pub fn heal(&self, operation: &'static str) {
        self.state.borrow_mut().failing.remove(operation);
    }

    pub fn calls(&self, operation: &'static str) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| **c == operation)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.state.borrow().calls.len()
    }

    pub fn groups(&self) -> Vec<GroupInfo> {
        self.state.borrow().groups.clone()
    }

    pub fn groups_titled(&self, window_id: WindowId, title: &str) -> Vec<GroupInfo> {
        self.groups()
            .into_iter()
            .filter(|g| g.window_id == window_id && g.title.as_deref() == Some(title))
            .collect()
    }

    pub fn members(&self, group_id: GroupId) -> Vec<TabId> {
        self.state
            .borrow()
            .members
            .iter()
            .filter(|(_, g)| **g == group_id)
            .map(|(tab, _)| *tab)
            .collect()
    }

    /// Simulate the user closing a tab; the browser does not drop the group
    pub fn close_tab(&self, tab_id: TabId) {
        self.state.borrow_mut().members.remove(&tab_id);
    }

    /// Insert a group directly, bypassing the grouping logic
    pub fn seed_group(&self, window_id: WindowId, title: &str) -> GroupId {
        let mut state = self.state.borrow_mut();
        let id = state.next_group_id;
        state.next_group_id += 1;
        state.groups.push(GroupInfo {
            id,
            window_id,
            title: Some(title.to_string()),
            color: Some(GroupColor::Grey),
            collapsed: false,
        });
        id
    }

    pub fn seed_member(&self, group_id: GroupId, tab_id: TabId) {
        self.state.borrow_mut().members.insert(tab_id, group_id);
    }

    fn enter(&self, operation: &'static str) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(operation);
        if state.failing.contains(operation) {
            return Err(HostError::new(operation, "injected failure"));
        }
        Ok(())
    }
}

impl TabHost for FakeHost {
    async fn query_groups(
        &self,
        window_id: WindowId,
        title: Option<&str>,
    ) -> Result<Vec<GroupInfo>, HostError> {
        self.enter("query_groups")?;
        YieldOnce(false).await;
        let state = self.state.borrow();
        let title_matches = |group: &GroupInfo| match (title, group.title.as_deref()) {
            (None, _) => true,
            (Some(query), Some(actual)) if state.pattern_titles => {
                matches(actual, &[query.to_string()])
            }
            (Some(query), actual) => actual == Some(query),
        };
        Ok(state
            .groups
            .iter()
            .filter(|g| g.window_id == window_id)
            .filter(|g| title_matches(*g))
            .cloned()
            .collect())
    }

    async fn create_group(
        &self,
        window_id: WindowId,
        tab_ids: &[TabId],
    ) -> Result<GroupId, HostError> {
        self.enter("create_group")?;
        let mut state = self.state.borrow_mut();
        if !state.windows.contains(&window_id) {
            return Err(HostError::new("create_group", "no such window"));
        }
        let id = state.next_group_id;
        state.next_group_id += 1;
        state.groups.push(GroupInfo {
            id,
            window_id,
            title: None,
            color: Some(GroupColor::Grey),
            collapsed: false,
        });
        for tab in tab_ids {
            state.members.insert(*tab, id);
        }
        Ok(id)
    }

    async fn update_group(&self, group_id: GroupId, update: &GroupUpdate) -> Result<(), HostError> {
        self.enter("update_group")?;
        let mut state = self.state.borrow_mut();
        let group = state
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| HostError::new("update_group", "no such group"))?;
        group.title = Some(update.title.clone());
        group.color = Some(update.color);
        group.collapsed = update.collapsed;
        Ok(())
    }

    async fn group_tabs(&self, group_id: GroupId) -> Result<Vec<TabId>, HostError> {
        self.enter("group_tabs")?;
        Ok(self.members(group_id))
    }

    async fn add_to_group(&self, group_id: GroupId, tab_ids: &[TabId]) -> Result<(), HostError> {
        self.enter("add_to_group")?;
        let mut state = self.state.borrow_mut();
        if !state.groups.iter().any(|g| g.id == group_id) {
            return Err(HostError::new("add_to_group", "no such group"));
        }
        for tab in tab_ids {
            state.members.insert(*tab, group_id);
        }
        Ok(())
    }

    async fn remove_group(&self, group_id: GroupId) -> Result<(), HostError> {
        self.enter("remove_group")?;
        let mut state = self.state.borrow_mut();
        state.groups.retain(|g| g.id != group_id);
        state.members.retain(|_, g| *g != group_id);
        Ok(())
    }

    async fn windows(&self) -> Result<Vec<WindowId>, HostError> {
        self.enter("windows")?;
        Ok(self.state.borrow().windows.clone())
    }
}

/// Suspends once, like a real browser round trip, so concurrent handlers
/// get a chance to interleave
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            return Poll::Ready(());
        }
        self.0 = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}
