//! IPC protocol types and validation for the widget host.
//!
//! This crate is shared by the host daemon, the in-process bridge and the CLI
//! client so the argument contract for `saveWidgetData` lives in one place.
//! The host remains the authority on validation, but clients can reuse the
//! same types to construct valid requests.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PROTOCOL_VERSION: u32 = 1;
pub const MAX_REQUEST_BYTES: usize = 1024 * 1024; // 1MB

/// Method name the host application invokes on its platform channel.
pub const SAVE_WIDGET_DATA: &str = "saveWidgetData";

/// Error code returned when bridge arguments are missing or mistyped.
pub const INVALID_ARGS: &str = "INVALID_ARGS";
const INVALID_ARGS_MESSAGE: &str = "Invalid arguments";

/// Error code for a method name the receiving side has no handler for.
pub const NOT_IMPLEMENTED: &str = "not_implemented";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum Method {
    GetHealth,
    SaveWidgetData,
    GetWidgetData,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Request {
    pub protocol_version: u32,
    pub method: Method,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_args() -> Self {
        Self::new(INVALID_ARGS, INVALID_ARGS_MESSAGE)
    }

    pub fn not_implemented(method: &str) -> Self {
        Self::new(NOT_IMPLEMENTED, format!("method not implemented: {}", method))
    }
}

impl Response {
    pub fn ok(id: Option<String>, data: Value) -> Self {
        Self {
            ok: true,
            id,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(id: Option<String>, code: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id,
            data: None,
            error: Some(ErrorInfo::new(code, message)),
        }
    }

    pub fn error_with_info(id: Option<String>, error: ErrorInfo) -> Self {
        Self {
            ok: false,
            id,
            data: None,
            error: Some(error),
        }
    }
}

/// Arguments of a `saveWidgetData` call: one key/value pair for the shared store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveWidgetData {
    pub key: String,
    pub value: String,
}

/// Arguments of a `get_widget_data` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetWidgetData {
    pub key: String,
}

/// Validates `saveWidgetData` arguments.
///
/// Both `key` and `value` must be present and string-typed. Empty strings are
/// accepted; the store treats them like any other key or value.
pub fn parse_save_widget_data(params: Option<&Value>) -> Result<SaveWidgetData, ErrorInfo> {
    let args = params
        .and_then(Value::as_object)
        .ok_or_else(ErrorInfo::invalid_args)?;
    let key = require_string(args.get("key"))?;
    let value = require_string(args.get("value"))?;
    Ok(SaveWidgetData { key, value })
}

pub fn parse_get_widget_data(params: Option<&Value>) -> Result<GetWidgetData, ErrorInfo> {
    let args = params
        .and_then(Value::as_object)
        .ok_or_else(ErrorInfo::invalid_args)?;
    let key = require_string(args.get("key"))?;
    Ok(GetWidgetData { key })
}

fn require_string(value: Option<&Value>) -> Result<String, ErrorInfo> {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(ErrorInfo::invalid_args)
}
