//! Widget host daemon entrypoint.
//!
//! Runs alongside the host application and exposes the `saveWidgetData`
//! bridge over a unix socket, so any host process can push a full rewrite of
//! the todo list into the app group the widget reads. One JSON request per
//! line, one JSON response per line.

use fs_err as fs;
use std::env;
use std::io::{BufRead, BufReader, Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use simplist_core::{StorageConfig, WidgetConfig, WidgetEngine};
use simplist_widget_protocol::{ErrorInfo, Request, Response, MAX_REQUEST_BYTES};

mod handler;

const READ_TIMEOUT_SECS: u64 = 2;
const DEBUG_ENV: &str = "SIMPLIST_DEBUG_LOG";

fn main() {
    init_logging();

    let storage = match StorageConfig::from_env() {
        Ok(storage) => storage,
        Err(err) => {
            error!(error = %err, "Failed to resolve storage root");
            std::process::exit(1);
        }
    };
    let config = WidgetConfig::resolve(&storage);
    let socket_path = storage.socket_path();

    let listener = match bind_socket(&socket_path) {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, path = %socket_path.display(), "Failed to bind host socket");
            std::process::exit(1);
        }
    };

    info!(
        path = %socket_path.display(),
        app_group = %config.app_group,
        todos_key = %config.todos_key,
        "Widget host started"
    );

    let engine = Arc::new(WidgetEngine::with_storage(storage, config));

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let engine = Arc::clone(&engine);
                thread::spawn(move || handle_connection(stream, &engine));
            }
            Err(err) => {
                warn!(error = %err, "Failed to accept host connection");
            }
        }
    }
}

fn init_logging() {
    let filter = match env::var(DEBUG_ENV).as_deref() {
        Ok("1" | "true" | "TRUE" | "yes" | "YES") => EnvFilter::new("debug"),
        _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Binds the host socket, replacing a socket file left by an earlier run.
fn bind_socket(socket_path: &Path) -> std::io::Result<UnixListener> {
    if let Some(parent) = socket_path.parent() {
        fs::create_dir_all(parent)?;
    }
    if socket_path.exists() {
        fs::remove_file(socket_path)?;
    }
    UnixListener::bind(socket_path)
}

fn handle_connection(mut stream: UnixStream, engine: &WidgetEngine) {
    let response = match read_request(&mut stream) {
        Ok(request) => {
            tracing::debug!(method = ?request.method, id = ?request.id, "Host request received");
            handler::handle_request(request, engine)
        }
        Err(err) => {
            warn!(code = %err.code, message = %err.message, "Failed to read request");
            Response::error_with_info(None, err)
        }
    };
    if let Err(err) = write_response(&mut stream, &response) {
        warn!(error = %err, "Failed to write host response");
    }
}

/// Reads one newline-terminated request, refusing to buffer more than
/// `MAX_REQUEST_BYTES`.
fn read_request(stream: &mut UnixStream) -> Result<Request, ErrorInfo> {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(READ_TIMEOUT_SECS)));

    let mut line = Vec::new();
    let limit = MAX_REQUEST_BYTES as u64 + 1;
    let mut reader = BufReader::new(std::io::Read::by_ref(stream).take(limit));
    match reader.read_until(b'\n', &mut line) {
        Ok(_) if line.len() > MAX_REQUEST_BYTES => Err(ErrorInfo::new(
            "request_too_large",
            "request exceeded maximum size",
        )),
        Ok(_) => handler::parse_request(&line),
        Err(err)
            if matches!(
                err.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ) =>
        {
            Err(ErrorInfo::new("read_timeout", "request timed out"))
        }
        Err(err) => Err(ErrorInfo::new(
            "read_error",
            format!("failed to read request: {}", err),
        )),
    }
}

fn write_response(stream: &mut UnixStream, response: &Response) -> std::io::Result<()> {
    let mut line = serde_json::to_vec(response)?;
    line.push(b'\n');
    stream.write_all(&line)?;
    stream.flush()
}
