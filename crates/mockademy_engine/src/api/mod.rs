//! HTTP service implementations exposing the catalog over REST.

mod service;

pub use service::ApiService;
