use serde::Serialize;

use mockademy_base::{MockademyError, MockademyResult};

use crate::catalog::Catalog;
use crate::model::{Course, Instructor, InstructorRef, Review, UserRef};

/* The query engine. Every operation here is a pure function of the catalog
tables plus the caller's parameters: linear filter scans, stable sorts,
slice-based pagination, and denormalized join assembly. Nothing is cached and
nothing is mutated. */

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PER_PAGE: usize = 12;

/// Featured selection keeps at most this many courses.
const FEATURED_LIMIT: usize = 8;
/// A course with at least this rating is featured even without the
/// bestseller flag.
const FEATURED_RATING_FLOOR: f64 = 4.8;
/// Course detail carries at most this many same-category courses.
const RELATED_LIMIT: usize = 4;

/// Sort order for course listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Ascending by price, missing price treated as 0.
    PriceAsc,
    /// Descending by price, missing price treated as 0.
    PriceDesc,
    /// Descending by rating, missing rating treated as 0.
    Rating,
    /// Descending by the stored `number_of_reviews` statistic.
    Reviews,
    /// Ascending by case-folded title; also the fallback for unrecognized
    /// sort values.
    #[default]
    Title,
}

impl SortKey {
    /// Parse a sort key from its query-string value.
    pub fn parse(value: &str) -> Self {
        match value {
            "price_asc" => Self::PriceAsc,
            "price_desc" => Self::PriceDesc,
            "rating" => Self::Rating,
            "reviews" => Self::Reviews,
            _ => Self::Title,
        }
    }
}

/// Parameters for [`Catalog::list_courses`].
///
/// Empty strings mean "no constraint". `page` is 1-indexed; a zero `page` or
/// `limit` falls back to the defaults rather than failing.
#[derive(Debug, Clone)]
pub struct CourseQuery {
    pub search: String,
    pub category: String,
    pub level: String,
    pub page: usize,
    pub limit: usize,
    pub sort: SortKey,
}

impl Default for CourseQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: String::new(),
            level: String::new(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_PER_PAGE,
            sort: SortKey::Title,
        }
    }
}

/// A course enriched for list responses.
///
/// `actual_review_count` is computed live from the reviews table and may
/// disagree with the course's stored `number_of_reviews` statistic; both are
/// exposed deliberately.
#[derive(Debug, Clone, Serialize)]
pub struct CourseSummary {
    #[serde(flatten)]
    pub course: Course,
    /// Reduced projection, null when the instructor reference dangles.
    pub instructor: Option<InstructorRef>,
    pub actual_review_count: usize,
}

/// A course enriched with just the reduced instructor projection, used for
/// featured and related course lists.
#[derive(Debug, Clone, Serialize)]
pub struct CourseWithInstructor {
    #[serde(flatten)]
    pub course: Course,
    pub instructor: Option<InstructorRef>,
}

/// Page metadata for course listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_courses: usize,
    pub per_page: usize,
}

/// One page of filtered, sorted, enriched courses.
#[derive(Debug, Clone, Serialize)]
pub struct CoursePage {
    pub courses: Vec<CourseSummary>,
    pub pagination: Pagination,
}

/// A review enriched with its author's reduced projection.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewWithUser {
    #[serde(flatten)]
    pub review: Review,
    /// Null when the review's user reference dangles.
    pub user: Option<UserRef>,
}

/// Aggregates computed from a course's reviews.
#[derive(Debug, Clone, Serialize)]
pub struct CourseStats {
    pub total_reviews: usize,
    /// Mean of the review ratings, 0 when there are none. Computed
    /// independently from the course's stored `rating` field.
    pub average_rating: f64,
}

/// Full course detail response.
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    /// Full instructor record, omitted when the reference dangles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<Instructor>,
    pub reviews: Vec<ReviewWithUser>,
    pub related_courses: Vec<CourseWithInstructor>,
    pub stats: CourseStats,
}

/// An instructor enriched with aggregate course figures.
#[derive(Debug, Clone, Serialize)]
pub struct InstructorOverview {
    #[serde(flatten)]
    pub instructor: Instructor,
    pub course_count: usize,
    /// Sum of the courses' stored `number_of_reviews`, used as an
    /// enrollment proxy by the dataset.
    pub total_students: u64,
    pub average_rating: f64,
}

/// Aggregates for a single instructor's detail response.
#[derive(Debug, Clone, Serialize)]
pub struct InstructorStats {
    pub total_courses: usize,
    pub total_students: u64,
    pub total_reviews: usize,
    pub average_rating: f64,
}

/// Full instructor detail response.
#[derive(Debug, Clone, Serialize)]
pub struct InstructorDetail {
    #[serde(flatten)]
    pub instructor: Instructor,
    pub courses: Vec<Course>,
    pub stats: InstructorStats,
}

/// A distinct category with its course count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub course_count: usize,
}

/// Whole-catalog aggregate snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub total_courses: usize,
    pub total_instructors: usize,
    pub total_users: usize,
    pub total_reviews: usize,
    pub categories: usize,
    pub average_rating: f64,
    pub bestseller_count: usize,
    pub new_courses_count: usize,
}

impl Catalog {
    /// Filter, sort, paginate, and enrich the course table.
    pub fn list_courses(&self, query: &CourseQuery) -> CoursePage {
        let search = query.search.to_lowercase();
        let mut filtered: Vec<&Course> = self
            .courses()
            .iter()
            .filter(|course| matches_filters(course, query, &search))
            .collect();
        sort_courses(&mut filtered, query.sort);

        let page = if query.page == 0 { DEFAULT_PAGE } else { query.page };
        let per_page = if query.limit == 0 {
            DEFAULT_PER_PAGE
        } else {
            query.limit
        };
        let total_courses = filtered.len();
        let start = (page - 1).saturating_mul(per_page).min(total_courses);
        let end = start.saturating_add(per_page).min(total_courses);

        let courses = filtered[start..end]
            .iter()
            .map(|course| self.summarize(course))
            .collect();

        CoursePage {
            courses,
            pagination: Pagination {
                current_page: page,
                total_pages: total_courses.div_ceil(per_page),
                total_courses,
                per_page,
            },
        }
    }

    /// Bestseller-flagged or highly rated courses, best rating first,
    /// capped at [`FEATURED_LIMIT`].
    pub fn featured_courses(&self) -> Vec<CourseWithInstructor> {
        let mut featured: Vec<&Course> = self
            .courses()
            .iter()
            .filter(|course| {
                course.bestseller()
                    || course.rating.is_some_and(|rating| rating >= FEATURED_RATING_FLOOR)
            })
            .collect();
        featured.sort_by(|a, b| b.rating_or_zero().total_cmp(&a.rating_or_zero()));
        featured.truncate(FEATURED_LIMIT);
        featured
            .into_iter()
            .map(|course| self.with_instructor(course))
            .collect()
    }

    /// Full detail for one course: instructor, reviews with their authors,
    /// related courses, and live review aggregates.
    pub fn course_detail(&self, id: &str) -> MockademyResult<CourseDetail> {
        let course = self
            .find_course(id)
            .ok_or_else(|| Box::new(MockademyError::not_found("Course", id)))?;

        let reviews: Vec<ReviewWithUser> = self
            .reviews_for_course(id)
            .map(|review| ReviewWithUser {
                review: review.clone(),
                user: self.find_user(&review.user_id).map(UserRef::from),
            })
            .collect();

        // Courses without a category relate to each other: both sides compare
        // as a missing value, matching the dataset's loose join semantics.
        let related_courses: Vec<CourseWithInstructor> = self
            .courses()
            .iter()
            .filter(|candidate| candidate.category == course.category && candidate.id != course.id)
            .take(RELATED_LIMIT)
            .map(|candidate| self.with_instructor(candidate))
            .collect();

        let total_reviews = reviews.len();
        let rating_sum: f64 = reviews.iter().map(|r| r.review.rating).sum();

        Ok(CourseDetail {
            course: course.clone(),
            instructor: course
                .instructor_id
                .as_deref()
                .and_then(|instructor_id| self.find_instructor(instructor_id))
                .cloned(),
            reviews,
            related_courses,
            stats: CourseStats {
                total_reviews,
                average_rating: mean(rating_sum, total_reviews),
            },
        })
    }

    /// All instructors with per-instructor course aggregates.
    pub fn instructors_overview(&self) -> Vec<InstructorOverview> {
        self.instructors()
            .iter()
            .map(|instructor| {
                let courses: Vec<&Course> = self.courses_by_instructor(&instructor.id).collect();
                let total_students: u64 =
                    courses.iter().map(|c| c.review_count_or_zero()).sum();
                let rating_sum: f64 = courses.iter().map(|c| c.rating_or_zero()).sum();
                InstructorOverview {
                    instructor: instructor.clone(),
                    course_count: courses.len(),
                    total_students,
                    average_rating: mean(rating_sum, courses.len()),
                }
            })
            .collect()
    }

    /// Full detail for one instructor: their courses and review aggregates
    /// across those courses.
    pub fn instructor_detail(&self, id: &str) -> MockademyResult<InstructorDetail> {
        let instructor = self
            .find_instructor(id)
            .ok_or_else(|| Box::new(MockademyError::not_found("Instructor", id)))?;

        let courses: Vec<Course> = self.courses_by_instructor(id).cloned().collect();
        let reviews: Vec<&Review> = self
            .reviews()
            .iter()
            .filter(|review| courses.iter().any(|course| course.id == review.course_id))
            .collect();
        let rating_sum: f64 = reviews.iter().map(|r| r.rating).sum();

        Ok(InstructorDetail {
            instructor: instructor.clone(),
            stats: InstructorStats {
                total_courses: courses.len(),
                total_students: courses.iter().map(|c| c.review_count_or_zero()).sum(),
                total_reviews: reviews.len(),
                average_rating: mean(rating_sum, reviews.len()),
            },
            courses,
        })
    }

    /// Distinct non-empty categories in first-occurrence order, with counts.
    pub fn categories(&self) -> Vec<CategoryCount> {
        let mut categories: Vec<CategoryCount> = Vec::new();
        for course in self.courses() {
            let Some(name) = course.category.as_deref() else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            match categories.iter_mut().find(|entry| entry.name == name) {
                Some(entry) => entry.course_count += 1,
                None => categories.push(CategoryCount {
                    name: name.to_string(),
                    course_count: 1,
                }),
            }
        }
        categories
    }

    /// Whole-catalog aggregate snapshot.
    pub fn stats(&self) -> CatalogStats {
        let courses = self.courses();
        let rating_sum: f64 = courses.iter().map(|c| c.rating_or_zero()).sum();
        CatalogStats {
            total_courses: courses.len(),
            total_instructors: self.instructors().len(),
            total_users: self.users().len(),
            total_reviews: self.reviews().len(),
            categories: self.categories().len(),
            average_rating: mean(rating_sum, courses.len()),
            bestseller_count: courses.iter().filter(|c| c.bestseller()).count(),
            new_courses_count: courses.iter().filter(|c| c.newly_added()).count(),
        }
    }

    fn summarize(&self, course: &Course) -> CourseSummary {
        CourseSummary {
            course: course.clone(),
            instructor: self.instructor_ref_for(course),
            actual_review_count: self.reviews_for_course(&course.id).count(),
        }
    }

    fn with_instructor(&self, course: &Course) -> CourseWithInstructor {
        CourseWithInstructor {
            course: course.clone(),
            instructor: self.instructor_ref_for(course),
        }
    }
}

fn matches_filters(course: &Course, query: &CourseQuery, search_lower: &str) -> bool {
    let matches_search = search_lower.is_empty()
        || course.title.to_lowercase().contains(search_lower)
        || field_contains(&course.description, search_lower)
        || field_contains(&course.category, search_lower);

    // Category and level are exact, case-sensitive matches, unlike the text
    // search; a course with the field absent never matches a constraint.
    let matches_category =
        query.category.is_empty() || course.category.as_deref() == Some(query.category.as_str());
    let matches_level =
        query.level.is_empty() || course.level.as_deref() == Some(query.level.as_str());

    matches_search && matches_category && matches_level
}

fn field_contains(field: &Option<String>, needle: &str) -> bool {
    field
        .as_deref()
        .is_some_and(|value| value.to_lowercase().contains(needle))
}

fn sort_courses(courses: &mut [&Course], sort: SortKey) {
    // sort_by is stable, so equal keys keep their filtered order
    match sort {
        SortKey::PriceAsc => {
            courses.sort_by(|a, b| a.price_or_zero().total_cmp(&b.price_or_zero()))
        }
        SortKey::PriceDesc => {
            courses.sort_by(|a, b| b.price_or_zero().total_cmp(&a.price_or_zero()))
        }
        SortKey::Rating => courses.sort_by(|a, b| b.rating_or_zero().total_cmp(&a.rating_or_zero())),
        SortKey::Reviews => {
            courses.sort_by(|a, b| b.review_count_or_zero().cmp(&a.review_count_or_zero()))
        }
        SortKey::Title => {
            courses.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        }
    }
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}
