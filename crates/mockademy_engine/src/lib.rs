pub mod api;
pub mod catalog;
pub mod loader;
pub mod model;
pub mod query;

pub use api::ApiService;
pub use catalog::{Catalog, CatalogHandle};
pub use loader::load_catalog;
pub use model::{Course, Instructor, InstructorRef, Review, User, UserRef};
pub use query::{
    CatalogStats, CategoryCount, CourseDetail, CoursePage, CourseQuery, CourseSummary, SortKey,
};
