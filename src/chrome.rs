/// Chrome bindings: the `TabHost` backed by chrome.tabs / chrome.tabGroups,
/// event listener registration and the startup configuration fetch
use std::rc::Rc;

use log::{debug, error, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::config::{Config, ConfigError, ConfigHandle};
use crate::dispatcher::{EventDispatcher, Outcome};
use crate::host::{HostError, TabHost};
use crate::tab_data::{GroupId, GroupInfo, GroupUpdate, RemoveInfo, TabChange, TabId, TabInfo, WindowId};

// Import JS bridge functions
#[wasm_bindgen(module = "/background.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn queryGroups(window_id: i32, title: Option<String>) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn createGroup(window_id: i32, tab_ids: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateGroup(group_id: i32, properties: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getGroupTabIds(group_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn addToGroup(group_id: i32, tab_ids: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeGroup(group_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getWindowIds() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn loadConfig() -> Result<JsValue, JsValue>;

    fn addTabListeners(
        on_created: &js_sys::Function,
        on_updated: &js_sys::Function,
        on_removed: &js_sys::Function,
    );
}

/// `TabHost` over the extension APIs
pub struct ChromeHost;

impl TabHost for ChromeHost {
    async fn query_groups(
        &self,
        window_id: WindowId,
        title: Option<&str>,
    ) -> Result<Vec<GroupInfo>, HostError> {
        let groups = queryGroups(window_id, title.map(str::to_string))
            .await
            .map_err(|e| js_error("tabGroups.query", e))?;
        decode("tabGroups.query", groups)
    }

    async fn create_group(
        &self,
        window_id: WindowId,
        tab_ids: &[TabId],
    ) -> Result<GroupId, HostError> {
        let group_id = createGroup(window_id, encode("tabs.group", tab_ids)?)
            .await
            .map_err(|e| js_error("tabs.group", e))?;
        decode("tabs.group", group_id)
    }

    async fn update_group(&self, group_id: GroupId, update: &GroupUpdate) -> Result<(), HostError> {
        updateGroup(group_id, encode("tabGroups.update", update)?)
            .await
            .map_err(|e| js_error("tabGroups.update", e))
    }

    async fn group_tabs(&self, group_id: GroupId) -> Result<Vec<TabId>, HostError> {
        let tab_ids = getGroupTabIds(group_id)
            .await
            .map_err(|e| js_error("tabs.query", e))?;
        decode("tabs.query", tab_ids)
    }

    async fn add_to_group(&self, group_id: GroupId, tab_ids: &[TabId]) -> Result<(), HostError> {
        addToGroup(group_id, encode("tabs.group", tab_ids)?)
            .await
            .map_err(|e| js_error("tabs.group", e))
    }

    async fn remove_group(&self, group_id: GroupId) -> Result<(), HostError> {
        removeGroup(group_id)
            .await
            .map_err(|e| js_error("tabs.ungroup", e))
    }

    async fn windows(&self) -> Result<Vec<WindowId>, HostError> {
        let windows = getWindowIds()
            .await
            .map_err(|e| js_error("windows.getAll", e))?;
        decode("windows.getAll", windows)
    }
}

/// Wire the dispatcher to the tab events and kick off the config fetch
///
/// Listeners go in first; events arriving before the fetch completes are
/// skipped by the dispatcher.
pub fn start() {
    let config = ConfigHandle::new();
    let dispatcher = Rc::new(EventDispatcher::new(ChromeHost, config.clone()));

    let on_created = {
        let dispatcher = dispatcher.clone();
        Closure::wrap(Box::new(move |tab: JsValue| {
            let dispatcher = dispatcher.clone();
            spawn_local(async move {
                match serde_wasm_bindgen::from_value::<TabInfo>(tab) {
                    Ok(tab) => log_outcome(dispatcher.on_tab_created(&tab).await),
                    Err(e) => warn!("Ignoring tab-created event: {:?}", e),
                }
            });
        }) as Box<dyn Fn(JsValue)>)
    };

    let on_updated = {
        let dispatcher = dispatcher.clone();
        Closure::wrap(Box::new(move |tab_id: i32, change: JsValue, tab: JsValue| {
            let dispatcher = dispatcher.clone();
            spawn_local(async move {
                let change = serde_wasm_bindgen::from_value::<TabChange>(change);
                let tab = serde_wasm_bindgen::from_value::<TabInfo>(tab);
                match (change, tab) {
                    (Ok(change), Ok(tab)) => {
                        log_outcome(dispatcher.on_tab_updated(tab_id, &change, &tab).await)
                    }
                    (Err(e), _) | (_, Err(e)) => warn!("Ignoring tab-updated event: {:?}", e),
                }
            });
        }) as Box<dyn Fn(i32, JsValue, JsValue)>)
    };

    let on_removed = {
        let dispatcher = dispatcher.clone();
        Closure::wrap(Box::new(move |tab_id: i32, info: JsValue| {
            let dispatcher = dispatcher.clone();
            spawn_local(async move {
                let info = serde_wasm_bindgen::from_value::<RemoveInfo>(info).unwrap_or_default();
                let report = dispatcher.on_tab_removed(tab_id, &info).await;
                if !report.failures.is_empty() {
                    warn!("Cleanup finished with {} failure(s)", report.failures.len());
                }
            });
        }) as Box<dyn Fn(i32, JsValue)>)
    };

    addTabListeners(
        on_created.as_ref().unchecked_ref(),
        on_updated.as_ref().unchecked_ref(),
        on_removed.as_ref().unchecked_ref(),
    );

    // Listeners live as long as the service worker
    on_created.forget();
    on_updated.forget();
    on_removed.forget();

    spawn_local(async move {
        let loaded = fetch_config().await;
        let installed = match loaded {
            Ok(parsed) => config.install(parsed),
            Err(e) => {
                error!("Failed to load configuration, tab grouping disabled: {}", e);
                config.mark_unavailable(e)
            }
        };
        if let Err(e) = installed {
            warn!("{}", e);
        }
    });
}

async fn fetch_config() -> Result<Config, ConfigError> {
    let raw = loadConfig()
        .await
        .map_err(|e| ConfigError::Decode(format!("Failed to fetch config.json: {:?}", e)))?;
    crate::parse_config_value(raw)
}

// Failures are logged by the dispatcher itself
fn log_outcome(outcome: Outcome) {
    if let Outcome::Skipped(reason) = outcome {
        debug!("Event skipped: {:?}", reason);
    }
}

fn js_error(operation: &'static str, e: JsValue) -> HostError {
    HostError::new(operation, format!("{:?}", e))
}

fn encode<T: Serialize + ?Sized>(operation: &'static str, value: &T) -> Result<JsValue, HostError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| HostError::new(operation, format!("Failed to serialize: {:?}", e)))
}

fn decode<T: DeserializeOwned>(operation: &'static str, value: JsValue) -> Result<T, HostError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| HostError::new(operation, format!("Failed to parse: {:?}", e)))
}
