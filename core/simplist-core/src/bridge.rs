//! Host-side bridge: lets the main app write into the widget's namespace.
//!
//! The host calls `saveWidgetData` with `{ "key": ..., "value": ... }` on its
//! platform channel. This is the one boundary in the crate that reports
//! failure to its caller, because the caller is trusted code that can react.

use serde_json::Value;
use simplist_widget_protocol::{parse_save_widget_data, ErrorInfo, SAVE_WIDGET_DATA};
use tracing::{info, warn};

use crate::config::WidgetConfig;
use crate::shared_store::SharedStore;
use crate::storage::StorageConfig;

/// A method invocation arriving from the host runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Option<Value>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Option<Value>) -> Self {
        MethodCall {
            method: method.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeReply {
    Success(Value),
    Error(ErrorInfo),
    /// The channel has no handler for this method name.
    NotImplemented,
}

#[derive(Debug, Clone)]
pub struct HostBridge {
    storage: StorageConfig,
    app_group: String,
}

impl HostBridge {
    pub fn new(storage: StorageConfig, config: &WidgetConfig) -> Self {
        HostBridge {
            storage,
            app_group: config.app_group.clone(),
        }
    }

    pub fn app_group(&self) -> &str {
        &self.app_group
    }

    pub fn handle(&self, call: &MethodCall) -> BridgeReply {
        if call.method != SAVE_WIDGET_DATA {
            warn!(method = %call.method, "Bridge method not implemented");
            return BridgeReply::NotImplemented;
        }

        match parse_save_widget_data(call.arguments.as_ref()) {
            Ok(args) => BridgeReply::Success(Value::Bool(
                self.save_widget_data(&args.key, &args.value),
            )),
            Err(err) => {
                warn!(code = %err.code, "Rejected saveWidgetData call");
                BridgeReply::Error(err)
            }
        }
    }

    /// Writes one pair into the shared namespace and flushes it.
    ///
    /// Returns true once the call is accepted; a store that turns out to be
    /// unavailable swallows the write like any other store write.
    pub fn save_widget_data(&self, key: &str, value: &str) -> bool {
        let store = SharedStore::open(&self.storage, &self.app_group);
        store.set(key, value);
        store.flush();
        info!(
            app_group = %self.app_group,
            key = %key,
            bytes = value.len(),
            "Saved widget data to app group"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use simplist_widget_protocol::INVALID_ARGS;
    use tempfile::tempdir;

    fn bridge(root: &std::path::Path) -> HostBridge {
        HostBridge::new(
            StorageConfig::with_root(root.to_path_buf()),
            &WidgetConfig::default(),
        )
    }

    #[test]
    fn save_writes_into_shared_store() {
        let temp = tempdir().unwrap();
        let bridge = bridge(temp.path());
        let reply = bridge.handle(&MethodCall::new(
            "saveWidgetData",
            Some(json!({ "key": "todos", "value": "[]" })),
        ));
        assert_eq!(reply, BridgeReply::Success(json!(true)));

        let store = SharedStore::open(
            &StorageConfig::with_root(temp.path().to_path_buf()),
            bridge.app_group(),
        );
        assert_eq!(store.get("todos").as_deref(), Some("[]"));
    }

    #[test]
    fn invalid_arguments_return_structured_error() {
        let temp = tempdir().unwrap();
        let bridge = bridge(temp.path());
        for arguments in [
            None,
            Some(json!("todos")),
            Some(json!({ "key": "todos" })),
            Some(json!({ "key": 1, "value": "[]" })),
        ] {
            let reply = bridge.handle(&MethodCall::new("saveWidgetData", arguments));
            let BridgeReply::Error(err) = reply else {
                panic!("expected error reply");
            };
            assert_eq!(err.code, INVALID_ARGS);
            assert_eq!(err.message, "Invalid arguments");
        }
        assert!(
            SharedStore::open(
                &StorageConfig::with_root(temp.path().to_path_buf()),
                bridge.app_group()
            )
            .keys()
            .is_empty()
        );
    }

    #[test]
    fn unknown_method_is_not_implemented() {
        let temp = tempdir().unwrap();
        let reply = bridge(temp.path()).handle(&MethodCall::new("reloadWidgets", None));
        assert_eq!(reply, BridgeReply::NotImplemented);
    }
}
