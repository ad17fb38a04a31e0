use serde::Serialize;
use tracing::debug;

use mockademy_base::http::{HttpMethod, HttpRequest, HttpResponse, HttpService, HttpStatusCode};
use mockademy_base::{MockademyResult, err};

use crate::catalog::CatalogHandle;
use crate::query::{CourseQuery, DEFAULT_PAGE, DEFAULT_PER_PAGE, SortKey};

/// Body served for any request that matches no API route.
const ENDPOINT_NOT_FOUND: &str = "API endpoint not found";

/// Health check response payload.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    data_loaded: DataLoaded,
}

/// Table sizes reported by the health check.
#[derive(Serialize)]
struct DataLoaded {
    courses: usize,
    instructors: usize,
    reviews: usize,
    users: usize,
}

/// HTTP service exposing the catalog query engine as a JSON API.
///
/// One service handles every endpoint, routing internally on the request
/// path:
/// - `GET /api/courses` — filtered, sorted, paginated course listing
/// - `GET /api/courses/featured` — bestseller/high-rating selection
/// - `GET /api/courses/{id}` — course detail with reviews and related courses
/// - `GET /api/instructors` — instructors with aggregates
/// - `GET /api/instructors/{id}` — instructor detail
/// - `GET /api/categories` — distinct categories with counts
/// - `GET /api/stats` — whole-catalog snapshot
/// - `GET /api/health` — liveness info with loaded table sizes
///
/// Everything else, including non-GET methods, gets a JSON 404. Lookup
/// misses surface as 404 with the entity's message; unexpected faults
/// propagate as errors for the server loop to report as 500.
#[derive(Clone)]
pub struct ApiService {
    catalog: CatalogHandle,
}

impl std::fmt::Debug for ApiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiService").finish()
    }
}

impl ApiService {
    /// Create a new ApiService over the given catalog.
    pub fn new(catalog: CatalogHandle) -> Self {
        Self { catalog }
    }

    /// Serialize data to JSON and wrap it in an HTTP 200 response.
    fn serialize_json_response<T: Serialize>(data: &T) -> MockademyResult<HttpResponse> {
        serde_json::to_string(data)
            .map(HttpResponse::json)
            .map_err(|e| err!("JSON serialization error: {}", e))
    }

    fn json_error(status: HttpStatusCode, message: &str) -> HttpResponse {
        HttpResponse::json(serde_json::json!({ "error": message }).to_string()).with_status(status)
    }

    fn endpoint_not_found() -> HttpResponse {
        Self::json_error(HttpStatusCode::NotFound, ENDPOINT_NOT_FOUND)
    }

    fn handle_course_list(&self, request: &HttpRequest) -> MockademyResult<HttpResponse> {
        let query = CourseQuery {
            search: request.query_param("q").unwrap_or_default(),
            category: request.query_param("category").unwrap_or_default(),
            level: request.query_param("level").unwrap_or_default(),
            page: parse_positive(request.query_param("page"), DEFAULT_PAGE),
            limit: parse_positive(request.query_param("limit"), DEFAULT_PER_PAGE),
            sort: SortKey::parse(request.query_param("sort").unwrap_or_default().as_str()),
        };
        debug!(?query, "listing courses");
        Self::serialize_json_response(&self.catalog.list_courses(&query))
    }

    fn handle_featured(&self) -> MockademyResult<HttpResponse> {
        Self::serialize_json_response(&self.catalog.featured_courses())
    }

    fn handle_course_detail(&self, id: &str) -> MockademyResult<HttpResponse> {
        match self.catalog.course_detail(id) {
            Ok(detail) => Self::serialize_json_response(&detail),
            Err(e) if e.is_not_found() => {
                Ok(Self::json_error(HttpStatusCode::NotFound, &e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    fn handle_instructor_list(&self) -> MockademyResult<HttpResponse> {
        Self::serialize_json_response(&self.catalog.instructors_overview())
    }

    fn handle_instructor_detail(&self, id: &str) -> MockademyResult<HttpResponse> {
        match self.catalog.instructor_detail(id) {
            Ok(detail) => Self::serialize_json_response(&detail),
            Err(e) if e.is_not_found() => {
                Ok(Self::json_error(HttpStatusCode::NotFound, &e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    fn handle_categories(&self) -> MockademyResult<HttpResponse> {
        Self::serialize_json_response(&self.catalog.categories())
    }

    fn handle_stats(&self) -> MockademyResult<HttpResponse> {
        Self::serialize_json_response(&self.catalog.stats())
    }

    fn handle_health(&self) -> MockademyResult<HttpResponse> {
        let response = HealthResponse {
            status: "OK",
            timestamp: chrono::Utc::now().to_rfc3339(),
            data_loaded: DataLoaded {
                courses: self.catalog.courses().len(),
                instructors: self.catalog.instructors().len(),
                reviews: self.catalog.reviews().len(),
                users: self.catalog.users().len(),
            },
        };
        Self::serialize_json_response(&response)
    }
}

impl HttpService for ApiService {
    fn handle_request(&self, request: HttpRequest) -> MockademyResult<HttpResponse> {
        // The unmatched-route 404 covers every method, so non-GET requests
        // fall through to it rather than a 405.
        if request.method() != &HttpMethod::Get {
            return Ok(Self::endpoint_not_found());
        }

        let path = request.route_path();
        // Tolerate trailing slashes the way non-strict Express routing does
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };

        match path {
            "/api/courses" => self.handle_course_list(&request),
            // Matched before the {id} fallthrough below; a literal "featured"
            // segment must never be consumed as a course id.
            "/api/courses/featured" => self.handle_featured(),
            "/api/instructors" => self.handle_instructor_list(),
            "/api/categories" => self.handle_categories(),
            "/api/stats" => self.handle_stats(),
            "/api/health" => self.handle_health(),
            _ => {
                if let Some(id) = extract_id(path, "courses") {
                    self.handle_course_detail(id)
                } else if let Some(id) = extract_id(path, "instructors") {
                    self.handle_instructor_detail(id)
                } else {
                    Ok(Self::endpoint_not_found())
                }
            }
        }
    }
}

/// Parse the id from a `/api/{collection}/{id}` path.
fn extract_id<'a>(path: &'a str, collection: &str) -> Option<&'a str> {
    let parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    if parts.len() == 3 && parts[0] == "api" && parts[1] == collection && !parts[2].is_empty() {
        Some(parts[2])
    } else {
        None
    }
}

/// Parse a 1-based numeric parameter, falling back to the default for
/// missing, non-numeric, or zero values.
fn parse_positive(value: Option<String>, default: usize) -> usize {
    value
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}
