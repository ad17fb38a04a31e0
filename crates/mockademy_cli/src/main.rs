use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use mockademy_base::http::HttpServerConfig;
use mockademy_base::server::start_http_server;
use mockademy_base::tracing::init_tracing;
use mockademy_engine::catalog::CatalogHandle;
use mockademy_engine::{ApiService, load_catalog};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATA_DIR: &str = "mock-data";

/// Serve the mock course-catalog API.
///
/// The dataset is read from `mock-data` in the current directory; the
/// listening port is taken from the `PORT` environment variable (default
/// 3000). There are no other configuration knobs.
///
/// Data loading is fail-open: a missing or broken dataset logs an error and
/// the server starts with empty tables instead of refusing to come up.
fn main() {
    init_tracing().unwrap();

    let data_dir = PathBuf::from(DEFAULT_DATA_DIR);

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let catalog = CatalogHandle::new(load_catalog(&data_dir));
    println!(
        "Loaded: {} courses, {} instructors, {} reviews, {} users",
        catalog.courses().len(),
        catalog.instructors().len(),
        catalog.reviews().len(),
        catalog.users().len()
    );

    let service = ApiService::new(catalog);
    let config = HttpServerConfig::new("0.0.0.0").with_port(port);
    let handle = match start_http_server(Box::new(service), config) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Error: failed to start HTTP server: {}", e);
            process::exit(1);
        }
    };

    println!("Mock API server running on port {}", handle.port());
    println!("Health check: http://localhost:{}/api/health", handle.port());
    println!("Courses: http://localhost:{}/api/courses", handle.port());
    println!(
        "Featured: http://localhost:{}/api/courses/featured",
        handle.port()
    );
    println!(
        "Instructors: http://localhost:{}/api/instructors",
        handle.port()
    );

    // The server runs on its own thread; keep the handle alive so the
    // accept loop is not signaled to shut down.
    loop {
        std::thread::sleep(Duration::from_secs(60));
    }
}
