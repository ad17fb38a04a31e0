use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{error, info};

use mockademy_base::error::ErrorKind;
use mockademy_base::{MockademyError, MockademyResult, err};

use crate::catalog::Catalog;
use crate::model::{Course, Instructor, Review, User};

pub const COURSES_FILE: &str = "courses.json";
pub const INSTRUCTORS_FILE: &str = "instructors.json";
pub const REVIEWS_FILE: &str = "course_reviews.json";
pub const USERS_FILE: &str = "users.json";

/// Load the four catalog tables from JSON files in `data_dir`.
///
/// Loading is fail-open: a table whose file is missing or malformed is
/// served empty and the error is logged, but the process keeps going. Each
/// table degrades independently, so one bad file does not take down the
/// other three.
pub fn load_catalog(data_dir: &Path) -> Catalog {
    let courses: Vec<Course> = load_table(data_dir, COURSES_FILE);
    let instructors: Vec<Instructor> = load_table(data_dir, INSTRUCTORS_FILE);
    let reviews: Vec<Review> = load_table(data_dir, REVIEWS_FILE);
    let users: Vec<User> = load_table(data_dir, USERS_FILE);

    // Catalog::new drops course records with an empty id or title
    let catalog = Catalog::new(courses, instructors, reviews, users);
    info!(
        courses = catalog.courses().len(),
        instructors = catalog.instructors().len(),
        reviews = catalog.reviews().len(),
        users = catalog.users().len(),
        "catalog loaded"
    );
    catalog
}

fn load_table<T: DeserializeOwned>(data_dir: &Path, file_name: &str) -> Vec<T> {
    match read_table(data_dir.join(file_name)) {
        Ok(records) => records,
        Err(e) => {
            error!(file = file_name, error = %e, "failed to load table, serving it empty");
            Vec::new()
        }
    }
}

fn read_table<T: DeserializeOwned>(path: PathBuf) -> MockademyResult<Vec<T>> {
    let contents = fs::read_to_string(&path).map_err(|e| {
        Box::new(MockademyError::new(ErrorKind::FileError {
            path: path.clone(),
            source: e,
        }))
    })?;
    serde_json::from_str(&contents).map_err(|e| err!("Invalid JSON in {}: {}", path.display(), e))
}
