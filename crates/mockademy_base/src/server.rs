use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::MockademyResult;
use crate::err;
use crate::http::{
    HttpMethod, HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService,
    HttpStatusCode,
};

/// How often the accept loop checks the shutdown flag while idle.
const RECV_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Start an HTTP server with the given service.
///
/// The server starts immediately on a background thread and listens for
/// connections. When the returned handle is dropped (or `shutdown()` is
/// called), the loop stops accepting new connections and exits.
///
/// Service errors never terminate the loop: a `NotFound` error is reported
/// to the client as a 404 with the error message, anything else as a generic
/// 500 with the fault's description.
pub fn start_http_server(
    service: Box<dyn HttpService>,
    config: HttpServerConfig,
) -> MockademyResult<HttpServerHandle> {
    let address = config.address();
    let server = tiny_http::Server::http(address.as_str())
        .map_err(|e| err!("Failed to bind HTTP server to {}: {}", address, e))?;

    let port = server
        .server_addr()
        .to_ip()
        .map(|addr| addr.port())
        .unwrap_or_else(|| config.port.unwrap_or(0));

    let handle = HttpServerHandle::new(port);
    let shutdown = handle.shutdown_flag().clone();
    let server_name = config.server_name.clone();

    info!(server = %server_name, port, "HTTP server listening");

    std::thread::spawn(move || {
        loop {
            if shutdown.load(std::sync::atomic::Ordering::SeqCst) {
                debug!(server = %server_name, "shutdown requested, stopping accept loop");
                break;
            }
            match server.recv_timeout(RECV_POLL_INTERVAL) {
                Ok(Some(request)) => handle_connection(service.as_ref(), request),
                Ok(None) => continue,
                Err(e) => {
                    error!(error = %e, "failed to receive HTTP request");
                }
            }
        }
    });

    Ok(handle)
}

/// Convert one tiny_http request, dispatch it to the service, and respond.
fn handle_connection(service: &dyn HttpService, request: tiny_http::Request) {
    let method_str = request.method().to_string();
    let url = request.url().to_string();

    let response = match HttpMethod::parse(&method_str) {
        Some(method) => {
            let mut http_request = HttpRequest::new(method, url.as_str());
            for header in request.headers() {
                http_request
                    .headers_mut()
                    .insert(header.field.as_str().as_str(), header.value.as_str());
            }
            match service.handle_request(http_request) {
                Ok(response) => response,
                Err(e) if e.is_not_found() => not_found_response(&e.to_string()),
                Err(e) => {
                    error!(method = %method_str, url = %url, error = %e, "request failed");
                    internal_error_response(&e.to_string())
                }
            }
        }
        // Unknown method tokens fall through to the generic unmatched-route body
        None => not_found_response("API endpoint not found"),
    };

    debug!(method = %method_str, url = %url, status = response.status().as_u16(), "handled request");
    respond(request, response);
}

fn not_found_response(message: &str) -> HttpResponse {
    HttpResponse::json(serde_json::json!({ "error": message }).to_string())
        .with_status(HttpStatusCode::NotFound)
}

fn internal_error_response(message: &str) -> HttpResponse {
    HttpResponse::json(
        serde_json::json!({
            "error": "Internal server error",
            "message": message,
        })
        .to_string(),
    )
    .with_status(HttpStatusCode::InternalServerError)
}

/// Send an [`HttpResponse`] back over the wire.
fn respond(request: tiny_http::Request, mut response: HttpResponse) {
    // The browser clients this mock backs are served from another origin
    response
        .headers_mut()
        .insert("Access-Control-Allow-Origin", "*");

    let status = response.status().as_u16();
    let mut out = tiny_http::Response::from_data(response.body().as_bytes().to_vec())
        .with_status_code(status);

    for (key, value) in response.headers().all() {
        match tiny_http::Header::from_bytes(key.as_bytes(), value.as_bytes()) {
            Ok(header) => out.add_header(header),
            Err(()) => warn!(key = %key, "skipping malformed response header"),
        }
    }

    if let Err(e) = request.respond(out) {
        warn!(error = %e, "failed to send response");
    }
}
