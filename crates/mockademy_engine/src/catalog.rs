use std::ops::Deref;
use std::sync::Arc;

use crate::model::{Course, Instructor, InstructorRef, Review, User};

/// The four in-memory catalog tables.
///
/// A catalog is built exactly once at startup and never mutated afterwards;
/// request handlers only ever read it. All lookups are linear scans, which is
/// fine for a static mock dataset of this size — no indexes are built.
///
/// Foreign keys are not validated: `instructor_id`, `course_id` and `user_id`
/// may point at records that do not exist, and every join helper here returns
/// `None`/nothing for such references instead of failing.
#[derive(Debug, Default)]
pub struct Catalog {
    courses: Vec<Course>,
    instructors: Vec<Instructor>,
    reviews: Vec<Review>,
    users: Vec<User>,
}

impl Catalog {
    /// Build a catalog from raw tables.
    ///
    /// Courses with an empty id or title are dropped here, so the invariant
    /// holds no matter where the tables came from (dataset files or test
    /// fixtures).
    pub fn new(
        courses: Vec<Course>,
        instructors: Vec<Instructor>,
        reviews: Vec<Review>,
        users: Vec<User>,
    ) -> Self {
        let courses = courses
            .into_iter()
            .filter(|course| !course.id.is_empty() && !course.title.is_empty())
            .collect();
        Self {
            courses,
            instructors,
            reviews,
            users,
        }
    }

    /// An empty catalog, used when the dataset cannot be loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn instructors(&self) -> &[Instructor] {
        &self.instructors
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Look up a course by exact id.
    pub fn find_course(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|course| course.id == id)
    }

    /// Look up an instructor by exact id.
    pub fn find_instructor(&self, id: &str) -> Option<&Instructor> {
        self.instructors.iter().find(|instructor| instructor.id == id)
    }

    /// Look up a user by exact id.
    pub fn find_user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    /// All reviews written for the given course.
    pub fn reviews_for_course<'a>(&'a self, course_id: &'a str) -> impl Iterator<Item = &'a Review> {
        self.reviews
            .iter()
            .filter(move |review| review.course_id == course_id)
    }

    /// All courses taught by the given instructor, in table order.
    pub fn courses_by_instructor<'a>(
        &'a self,
        instructor_id: &'a str,
    ) -> impl Iterator<Item = &'a Course> {
        self.courses
            .iter()
            .filter(move |course| course.instructor_id.as_deref() == Some(instructor_id))
    }

    /// Reduced instructor projection for a course, `None` when the foreign
    /// key is absent or dangling.
    pub fn instructor_ref_for(&self, course: &Course) -> Option<InstructorRef> {
        course
            .instructor_id
            .as_deref()
            .and_then(|id| self.find_instructor(id))
            .map(InstructorRef::from)
    }
}

/// A cheaply cloneable handle to a loaded catalog.
///
/// The catalog is immutable after load, so sharing is a plain `Arc` — no
/// locking is needed for concurrent request handling.
#[derive(Debug, Clone)]
pub struct CatalogHandle(Arc<Catalog>);

impl CatalogHandle {
    /// Wrap a catalog for sharing across threads.
    pub fn new(catalog: Catalog) -> Self {
        Self(Arc::new(catalog))
    }
}

impl Deref for CatalogHandle {
    type Target = Catalog;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
