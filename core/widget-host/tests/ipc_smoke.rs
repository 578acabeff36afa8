use serde_json::json;
use simplist_core::{decode, SharedStore, StorageConfig, TodoItem, DEFAULT_APP_GROUP};
use simplist_widget_protocol::{Method, Request, Response, PROTOCOL_VERSION};
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};
use tempfile::TempDir;

struct HostGuard {
    child: Child,
}

impl Drop for HostGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn spawn_host(home: &Path) -> Child {
    Command::new(env!("CARGO_BIN_EXE_widget-host"))
        .env("HOME", home)
        .env_remove("SIMPLIST_HOME")
        .env_remove("SIMPLIST_APP_GROUP")
        .env_remove("SIMPLIST_TODOS_KEY")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn widget-host")
}

fn storage_root(home: &Path) -> PathBuf {
    home.join(".simplist")
}

fn wait_for_socket(path: &Path, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if path.exists() {
            return;
        }
        sleep(Duration::from_millis(25));
    }
    panic!("Timed out waiting for host socket at {}", path.display());
}

fn send_request(socket: &Path, request: Request) -> Response {
    let mut stream = UnixStream::connect(socket).expect("Failed to connect to host socket");
    serde_json::to_writer(&mut stream, &request).expect("Failed to serialize request");
    stream.write_all(b"\n").expect("Failed to write request");
    stream.flush().ok();
    read_response(&mut stream)
}

fn send_raw(socket: &Path, payload: &[u8]) -> Response {
    let mut stream = UnixStream::connect(socket).expect("Failed to connect to host socket");
    stream.write_all(payload).expect("Failed to write payload");
    stream.flush().ok();
    read_response(&mut stream)
}

fn read_response(stream: &mut UnixStream) -> Response {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk).expect("Failed to read response");
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if chunk[..n].contains(&b'\n') {
            break;
        }
    }

    let newline_index = buffer.iter().position(|b| *b == b'\n');
    let response_bytes = match newline_index {
        Some(index) => &buffer[..index],
        None => buffer.as_slice(),
    };

    serde_json::from_slice(response_bytes).expect("Failed to parse response JSON")
}

#[test]
fn host_ipc_health_and_save_smoke() {
    let home = TempDir::new().expect("Failed to create temp HOME");
    let root = storage_root(home.path());
    let storage = StorageConfig::with_root(root.clone());
    let socket = storage.socket_path();
    let _guard = HostGuard {
        child: spawn_host(home.path()),
    };

    wait_for_socket(&socket, Duration::from_secs(2));

    let health = send_request(
        &socket,
        Request {
            protocol_version: PROTOCOL_VERSION,
            method: Method::GetHealth,
            id: Some("health-check".to_string()),
            params: None,
        },
    );
    assert!(health.ok, "health response was not ok");
    let data = health.data.expect("health data");
    assert_eq!(data["status"], "ok");
    assert_eq!(data["app_group"], DEFAULT_APP_GROUP);

    let todos = r#"[{"text":"Buy groceries","isDone":false},{"text":"Call mom","isDone":true}]"#;
    let saved = send_request(
        &socket,
        Request {
            protocol_version: PROTOCOL_VERSION,
            method: Method::SaveWidgetData,
            id: Some("save-1".to_string()),
            params: Some(json!({ "key": "todos", "value": todos })),
        },
    );
    assert!(saved.ok, "save response was not ok: {:?}", saved.error);
    assert_eq!(saved.data, Some(json!(true)));

    let store = SharedStore::open(&storage, DEFAULT_APP_GROUP);
    assert_eq!(
        decode(store.get("todos").as_deref()),
        vec![
            TodoItem::new("Buy groceries", false),
            TodoItem::new("Call mom", true),
        ]
    );

    let fetched = send_request(
        &socket,
        Request {
            protocol_version: PROTOCOL_VERSION,
            method: Method::GetWidgetData,
            id: Some("get-1".to_string()),
            params: Some(json!({ "key": "todos" })),
        },
    );
    assert!(fetched.ok);
    assert_eq!(fetched.data.expect("get data")["value"], todos);
}

#[test]
fn host_rejects_invalid_requests() {
    let home = TempDir::new().expect("Failed to create temp HOME");
    let storage = StorageConfig::with_root(storage_root(home.path()));
    let socket = storage.socket_path();
    let _guard = HostGuard {
        child: spawn_host(home.path()),
    };

    wait_for_socket(&socket, Duration::from_secs(2));

    let invalid_args = send_request(
        &socket,
        Request {
            protocol_version: PROTOCOL_VERSION,
            method: Method::SaveWidgetData,
            id: Some("save-bad".to_string()),
            params: Some(json!({ "key": "todos", "value": 42 })),
        },
    );
    assert!(!invalid_args.ok);
    assert_eq!(invalid_args.error.expect("error").code, "INVALID_ARGS");
    assert!(SharedStore::open(&storage, DEFAULT_APP_GROUP)
        .keys()
        .is_empty());

    let invalid_json = send_raw(&socket, b"{not json}\n");
    assert_eq!(invalid_json.error.expect("error").code, "invalid_json");

    let unknown = send_raw(
        &socket,
        b"{\"protocol_version\":1,\"method\":\"reload_all_timelines\"}\n",
    );
    assert!(!unknown.ok);
    assert_eq!(unknown.error.expect("error").code, "not_implemented");

    let mismatch = send_request(
        &socket,
        Request {
            protocol_version: PROTOCOL_VERSION + 1,
            method: Method::GetHealth,
            id: None,
            params: None,
        },
    );
    assert_eq!(mismatch.error.expect("error").code, "protocol_mismatch");
}
