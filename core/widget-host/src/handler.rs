//! Request parsing and dispatch, kept free of socket I/O.

use serde_json::{json, Value};
use tracing::info;

use simplist_core::{BridgeReply, MethodCall, SharedStore, WidgetEngine};
use simplist_widget_protocol::{
    parse_get_widget_data, ErrorInfo, Method, Request, Response, PROTOCOL_VERSION,
    SAVE_WIDGET_DATA,
};

/// Parses the first line of a raw request buffer.
///
/// A well-formed request naming a method this host doesn't serve is reported
/// as `not_implemented` rather than as bad JSON.
pub fn parse_request(buffer: &[u8]) -> Result<Request, ErrorInfo> {
    let line = match buffer.iter().position(|b| *b == b'\n') {
        Some(index) => &buffer[..index],
        None => buffer,
    };

    if line.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(ErrorInfo::new("empty_request", "request body was empty"));
    }

    let value: Value = serde_json::from_slice(line).map_err(|err| {
        ErrorInfo::new(
            "invalid_json",
            format!("request was not valid JSON: {}", err),
        )
    })?;

    if let Some(method) = value.get("method").and_then(Value::as_str) {
        if serde_json::from_value::<Method>(Value::from(method)).is_err() {
            return Err(ErrorInfo::not_implemented(method));
        }
    }

    serde_json::from_value(value).map_err(|err| {
        ErrorInfo::new(
            "invalid_json",
            format!("request did not match the protocol: {}", err),
        )
    })
}

pub fn handle_request(request: Request, engine: &WidgetEngine) -> Response {
    if request.protocol_version != PROTOCOL_VERSION {
        return Response::error(
            request.id,
            "protocol_mismatch",
            "unsupported protocol version",
        );
    }

    match request.method {
        Method::GetHealth => Response::ok(
            request.id,
            json!({
                "status": "ok",
                "pid": std::process::id(),
                "version": env!("CARGO_PKG_VERSION"),
                "protocol_version": PROTOCOL_VERSION,
                "app_group": engine.config().app_group,
                "todos_key": engine.config().todos_key,
            }),
        ),
        Method::SaveWidgetData => {
            let call = MethodCall::new(SAVE_WIDGET_DATA, request.params);
            match engine.host_bridge().handle(&call) {
                BridgeReply::Success(data) => {
                    info!(saved = %data, "Handled save_widget_data");
                    Response::ok(request.id, data)
                }
                BridgeReply::Error(err) => Response::error_with_info(request.id, err),
                BridgeReply::NotImplemented => {
                    Response::error_with_info(request.id, ErrorInfo::not_implemented(&call.method))
                }
            }
        }
        Method::GetWidgetData => {
            let args = match parse_get_widget_data(request.params.as_ref()) {
                Ok(args) => args,
                Err(err) => return Response::error_with_info(request.id, err),
            };
            let store = SharedStore::open(engine.storage(), &engine.config().app_group);
            let versioned = store.get_versioned(&args.key);
            Response::ok(
                request.id,
                json!({
                    "key": args.key,
                    "value": versioned.value,
                    "revision": versioned.revision,
                }),
            )
        }
    }
}
