use std::collections::HashMap;
use std::sync::Arc;

use percent_encoding::percent_decode_str;

/// HTTP methods supported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    /// Parse an HTTP method from a string.
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "PATCH" => Some(Self::Patch),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            _ => None,
        }
    }

    /// Convert the method to its string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// HTTP headers collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    inner: HashMap<String, String>,
}

impl HttpHeaders {
    /// Create empty headers.
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    /// Insert a header.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), value.into());
    }

    /// Get a header value.
    pub fn get(&self, key: &str) -> Option<&String> {
        self.inner.get(key)
    }

    /// Check if a header exists.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Get all headers as a reference.
    pub fn all(&self) -> &HashMap<String, String> {
        &self.inner
    }
}

/// Fixed-size HTTP body content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpBody(Vec<u8>);

impl HttpBody {
    /// Create an empty body.
    pub fn empty() -> Self {
        Self(vec![])
    }

    /// Create from bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Create from string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into().into_bytes())
    }

    /// Get content as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get content as a string if valid UTF-8.
    pub fn as_string(&self) -> Option<String> {
        String::from_utf8(self.0.clone()).ok()
    }

    /// Check if body is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the content length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Take ownership of the content.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for HttpBody {
    fn from(v: Vec<u8>) -> Self {
        Self::from_bytes(v)
    }
}

impl From<String> for HttpBody {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl From<&str> for HttpBody {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

/// HTTP request structure.
///
/// The path keeps its raw query string; use [`HttpRequest::route_path`] for
/// routing and [`HttpRequest::query_param`] for decoded parameter values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: HttpMethod,
    path: String,
    headers: HttpHeaders,
    body: HttpBody,
}

impl HttpRequest {
    /// Create a new HTTP request.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HttpHeaders::new(),
            body: HttpBody::empty(),
        }
    }

    /// Get the HTTP method.
    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    /// Get the full request path, including any query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the request path with the query string removed.
    pub fn route_path(&self) -> &str {
        self.path.split('?').next().unwrap_or(&self.path)
    }

    /// Get a percent-decoded query parameter value.
    ///
    /// Returns `None` when the parameter is absent or its value is not
    /// valid UTF-8 after decoding. `+` is decoded as a space.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.path.split_once('?')?.1;
        query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            if key != name {
                return None;
            }
            let value = value.replace('+', " ");
            percent_decode_str(&value)
                .decode_utf8()
                .ok()
                .map(|decoded| decoded.into_owned())
        })
    }

    /// Get the request headers.
    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    /// Get mutable access to headers.
    pub fn headers_mut(&mut self) -> &mut HttpHeaders {
        &mut self.headers
    }

    /// Get the request body.
    pub fn body(&self) -> &HttpBody {
        &self.body
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<HttpBody>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }
}

/// HTTP status codes used by the API surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatusCode {
    Ok = 200,
    BadRequest = 400,
    NotFound = 404,
    MethodNotAllowed = 405,
    InternalServerError = 500,
}

impl HttpStatusCode {
    /// Get the numeric status code.
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the standard reason phrase.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::InternalServerError => "Internal Server Error",
        }
    }
}

/// HTTP response structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: HttpStatusCode,
    headers: HttpHeaders,
    body: HttpBody,
}

impl HttpResponse {
    /// Create a new response with the given status.
    pub fn new(status: HttpStatusCode) -> Self {
        Self {
            status,
            headers: HttpHeaders::new(),
            body: HttpBody::empty(),
        }
    }

    /// Create a 200 OK response.
    pub fn ok() -> Self {
        Self::new(HttpStatusCode::Ok)
    }

    /// Create a 404 Not Found response.
    pub fn not_found() -> Self {
        Self::new(HttpStatusCode::NotFound)
    }

    /// Create a 500 Internal Server Error response.
    pub fn internal_error() -> Self {
        Self::new(HttpStatusCode::InternalServerError)
    }

    /// Get the status code.
    pub fn status(&self) -> HttpStatusCode {
        self.status
    }

    /// Get the headers.
    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    /// Get mutable access to headers.
    pub fn headers_mut(&mut self) -> &mut HttpHeaders {
        &mut self.headers
    }

    /// Get the body.
    pub fn body(&self) -> &HttpBody {
        &self.body
    }

    /// Take ownership of the body.
    pub fn into_body(self) -> HttpBody {
        self.body
    }

    /// Set the response body.
    pub fn with_body(mut self, body: impl Into<HttpBody>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Set the Content-Type header.
    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header("Content-Type", content_type)
    }

    /// Set the status code.
    pub fn with_status(mut self, status: HttpStatusCode) -> Self {
        self.status = status;
        self
    }

    /// Create a JSON response.
    pub fn json(body: impl Into<String>) -> Self {
        Self::ok()
            .with_content_type("application/json")
            .with_body(body.into())
    }
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on. If None, the OS will assign an available port.
    pub port: Option<u16>,
    /// Server name used in log output.
    pub server_name: String,
}

impl HttpServerConfig {
    /// Create a new configuration with the given host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            server_name: "mockademy".to_string(),
        }
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the server name.
    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    /// Get the address string (host:port, port 0 for OS-assigned).
    pub fn address(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => format!("{}:0", self.host),
        }
    }
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: None,
            server_name: "mockademy".to_string(),
        }
    }
}

/// Trait for handling HTTP requests.
///
/// Implement this trait to create an HTTP service. The service receives raw
/// HTTP requests and returns responses.
///
/// An `Err` return is treated as an internal fault by the server loop: the
/// client receives a generic 500 response and the process keeps serving.
/// Expected failure modes (unknown route, missing record) should be expressed
/// as responses with the appropriate status instead.
pub trait HttpService: std::fmt::Debug + Send + Sync + 'static {
    /// Handle an HTTP request and return a response.
    fn handle_request(&self, request: HttpRequest) -> crate::MockademyResult<HttpResponse>;
}

/// Handle to a running HTTP server.
///
/// When dropped, the server is signaled to shut down: it stops accepting new
/// connections and the serving thread exits.
#[derive(Debug, Clone)]
pub struct HttpServerHandle {
    port: u16,
    shutdown: Arc<std::sync::atomic::AtomicBool>,
}

impl HttpServerHandle {
    /// Create a new handle for the given port.
    pub fn new(port: u16) -> Self {
        Self {
            port,
            shutdown: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        }
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Signal the server to shut down.
    pub fn shutdown(&self) {
        self.shutdown
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }

    /// Check if the server has been signaled to shut down.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Access the shutdown flag (for internal use by the server loop).
    pub fn shutdown_flag(&self) -> &Arc<std::sync::atomic::AtomicBool> {
        &self.shutdown
    }
}

impl Drop for HttpServerHandle {
    fn drop(&mut self) {
        // Signal shutdown when the last handle is dropped
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_parse() {
        assert_eq!(HttpMethod::parse("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("POST"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::parse("put"), Some(HttpMethod::Put)); // Case insensitive
        assert_eq!(HttpMethod::parse("INVALID"), None);
    }

    #[test]
    fn test_http_method_display() {
        assert_eq!(format!("{}", HttpMethod::Get), "GET");
        assert_eq!(format!("{}", HttpMethod::Delete), "DELETE");
    }

    #[test]
    fn test_http_headers() {
        let mut headers = HttpHeaders::new();
        headers.insert("Content-Type", "application/json");

        assert_eq!(
            headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
        assert!(headers.contains("Content-Type"));
        assert!(!headers.contains("X-Custom"));
    }

    #[test]
    fn test_http_body() {
        let body = HttpBody::from_string("Hello, World!");
        assert_eq!(body.as_string(), Some("Hello, World!".to_string()));
        assert_eq!(body.len(), 13);

        let empty = HttpBody::empty();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_request_route_path_strips_query() {
        let request = HttpRequest::new(HttpMethod::Get, "/api/courses?q=rust&page=2");
        assert_eq!(request.route_path(), "/api/courses");
        assert_eq!(request.path(), "/api/courses?q=rust&page=2");
    }

    #[test]
    fn test_request_query_param() {
        let request = HttpRequest::new(HttpMethod::Get, "/api/courses?q=rust&page=2&sort=rating");
        assert_eq!(request.query_param("q"), Some("rust".to_string()));
        assert_eq!(request.query_param("page"), Some("2".to_string()));
        assert_eq!(request.query_param("sort"), Some("rating".to_string()));
        assert_eq!(request.query_param("level"), None);
    }

    #[test]
    fn test_request_query_param_decoding() {
        let request = HttpRequest::new(HttpMethod::Get, "/api/courses?q=web+development");
        assert_eq!(request.query_param("q"), Some("web development".to_string()));

        let request = HttpRequest::new(HttpMethod::Get, "/api/courses?category=Data%20Science");
        assert_eq!(
            request.query_param("category"),
            Some("Data Science".to_string())
        );
    }

    #[test]
    fn test_request_without_query_string() {
        let request = HttpRequest::new(HttpMethod::Get, "/api/stats");
        assert_eq!(request.route_path(), "/api/stats");
        assert_eq!(request.query_param("q"), None);
    }

    #[test]
    fn test_http_response_helpers() {
        let ok = HttpResponse::ok();
        assert_eq!(ok.status(), HttpStatusCode::Ok);

        let not_found = HttpResponse::not_found();
        assert_eq!(not_found.status(), HttpStatusCode::NotFound);

        let json = HttpResponse::json("{\"data\": []}");
        assert_eq!(json.status(), HttpStatusCode::Ok);
        assert_eq!(
            json.headers().get("Content-Type"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_http_status_code() {
        assert_eq!(HttpStatusCode::Ok.as_u16(), 200);
        assert_eq!(HttpStatusCode::NotFound.as_u16(), 404);
        assert_eq!(HttpStatusCode::InternalServerError.as_u16(), 500);
        assert_eq!(HttpStatusCode::NotFound.reason_phrase(), "Not Found");
    }

    #[test]
    fn test_http_server_config() {
        let config = HttpServerConfig::new("127.0.0.1")
            .with_port(8080)
            .with_server_name("test-server");

        assert_eq!(config.address(), "127.0.0.1:8080");
        assert_eq!(config.server_name, "test-server");

        let default = HttpServerConfig::default();
        assert_eq!(default.address(), "127.0.0.1:0");
    }

    #[test]
    fn test_http_server_handle() {
        let handle = HttpServerHandle::new(8080);
        assert_eq!(handle.port(), 8080);

        assert!(!handle.is_shutdown());
        handle.shutdown();
        assert!(handle.is_shutdown());
    }

    #[test]
    fn test_http_service_trait() {
        #[derive(Debug)]
        struct TestService;
        impl HttpService for TestService {
            fn handle_request(&self, request: HttpRequest) -> crate::MockademyResult<HttpResponse> {
                if request.route_path() == "/test" {
                    Ok(HttpResponse::json("{\"ok\":true}"))
                } else {
                    Ok(HttpResponse::not_found())
                }
            }
        }

        let service = TestService;
        let resp = service
            .handle_request(HttpRequest::new(HttpMethod::Get, "/test"))
            .unwrap();
        assert_eq!(resp.status(), HttpStatusCode::Ok);

        let resp = service
            .handle_request(HttpRequest::new(HttpMethod::Get, "/other"))
            .unwrap();
        assert_eq!(resp.status(), HttpStatusCode::NotFound);
    }
}
