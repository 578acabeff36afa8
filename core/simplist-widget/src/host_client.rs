//! Client for the widget host daemon's unix socket.
//!
//! Transport failures are retried once after a short delay; a request the
//! host rejected (for example `INVALID_ARGS`) is returned as-is.

use serde_json::{json, Value};
use simplist_core::StorageConfig;
use simplist_widget_protocol::{
    ErrorInfo, Method, Request, Response, MAX_REQUEST_BYTES, PROTOCOL_VERSION,
};
use std::env;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SOCKET_ENV: &str = "SIMPLIST_HOST_SOCKET";
const READ_TIMEOUT_MS: u64 = 600;
const WRITE_TIMEOUT_MS: u64 = 600;
const RETRY_DELAY_MS: u64 = 50;

#[derive(Debug, thiserror::Error)]
pub enum HostClientError {
    #[error("Failed to reach widget host: {0}")]
    Transport(String),

    #[error("Widget host rejected request: {}: {}", .0.code, .0.message)]
    Rejected(ErrorInfo),
}

pub fn socket_path(storage: &StorageConfig) -> PathBuf {
    match env::var_os(SOCKET_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => storage.socket_path(),
    }
}

pub fn save_widget_data(socket: &Path, key: &str, value: &str) -> Result<bool, HostClientError> {
    let data = call_with_retry(socket, Method::SaveWidgetData, || {
        Some(json!({ "key": key, "value": value }))
    })?;
    Ok(data.as_bool().unwrap_or(false))
}

pub fn health(socket: &Path) -> Result<Value, HostClientError> {
    call_with_retry(socket, Method::GetHealth, || None)
}

fn call_with_retry<F>(socket: &Path, method: Method, params: F) -> Result<Value, HostClientError>
where
    F: Fn() -> Option<Value>,
{
    match call(socket, method, params()) {
        Err(HostClientError::Transport(err)) => {
            tracing::warn!(error = %err, ?method, "Failed to reach widget host; retrying");
            std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS));
            call(socket, method, params()).inspect_err(|retry_err| {
                tracing::warn!(error = %retry_err, ?method, "Retry to widget host failed");
            })
        }
        other => other,
    }
}

fn call(socket: &Path, method: Method, params: Option<Value>) -> Result<Value, HostClientError> {
    let request = Request {
        protocol_version: PROTOCOL_VERSION,
        method,
        id: Some(format!("cli-{}", chrono::Utc::now().timestamp_millis())),
        params,
    };

    let response = send_request(socket, &request).map_err(HostClientError::Transport)?;
    if response.ok {
        Ok(response.data.unwrap_or(Value::Null))
    } else {
        Err(HostClientError::Rejected(response.error.unwrap_or_else(
            || ErrorInfo::new("unknown", "Unknown widget host error"),
        )))
    }
}

fn send_request(socket: &Path, request: &Request) -> Result<Response, String> {
    let mut stream = UnixStream::connect(socket)
        .map_err(|err| format!("Failed to connect to host socket: {}", err))?;
    let _ = stream.set_read_timeout(Some(Duration::from_millis(READ_TIMEOUT_MS)));
    let _ = stream.set_write_timeout(Some(Duration::from_millis(WRITE_TIMEOUT_MS)));

    serde_json::to_writer(&mut stream, request)
        .map_err(|err| format!("Failed to write request: {}", err))?;
    stream
        .write_all(b"\n")
        .map_err(|err| format!("Failed to flush request: {}", err))?;
    stream.flush().ok();

    read_response(&mut stream)
}

fn read_response(stream: &mut UnixStream) -> Result<Response, String> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                buffer.extend_from_slice(&chunk[..n]);
                if buffer.len() > MAX_REQUEST_BYTES {
                    return Err("Response exceeded maximum size".to_string());
                }
                if chunk[..n].contains(&b'\n') {
                    break;
                }
            }
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                return Err("Timed out waiting for host response".to_string());
            }
            Err(err) => return Err(format!("Failed to read response: {}", err)),
        }
    }

    let newline_index = buffer.iter().position(|b| *b == b'\n');
    let response_bytes = match newline_index {
        Some(index) => &buffer[..index],
        None => buffer.as_slice(),
    };

    if response_bytes.is_empty() {
        return Err("Host response was empty".to_string());
    }

    serde_json::from_slice(response_bytes)
        .map_err(|err| format!("Failed to parse response JSON: {}", err))
}
