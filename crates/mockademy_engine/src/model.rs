use serde::{Deserialize, Serialize};

/* The four catalog record types mirror the shape of the static JSON dataset.
Every field tolerates absence in the source data: strings default to empty,
numbers to None, flags to 0. The "missing means zero/null" rules used by the
query engine live in the accessors here rather than being scattered through
the filter and sort code. */

/// A course record from the static catalog.
///
/// `is_bestseller` and `is_new` are integer flags (1 = set), kept as numbers
/// to match the dataset encoding. `number_of_reviews` is a pre-denormalized
/// statistic carried by the source data; it is not derived from the reviews
/// table and may disagree with the live review count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_reviews: Option<u64>,
    #[serde(default)]
    pub is_bestseller: i64,
    #[serde(default)]
    pub is_new: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_id: Option<String>,
}

impl Course {
    /// Price with a missing value treated as 0.
    pub fn price_or_zero(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }

    /// Rating with a missing value treated as 0.
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    /// Stored review-count statistic with a missing value treated as 0.
    pub fn review_count_or_zero(&self) -> u64 {
        self.number_of_reviews.unwrap_or(0)
    }

    /// Whether the bestseller flag is set.
    pub fn bestseller(&self) -> bool {
        self.is_bestseller == 1
    }

    /// Whether the new-course flag is set.
    pub fn newly_added(&self) -> bool {
        self.is_new == 1
    }
}

/// An instructor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A course review left by a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub course_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Reduced instructor projection embedded in enriched course responses,
/// instead of exposing the full related record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorRef {
    pub id: String,
    pub fullname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl From<&Instructor> for InstructorRef {
    fn from(instructor: &Instructor) -> Self {
        Self {
            id: instructor.id.clone(),
            fullname: instructor.fullname.clone(),
            avatar: instructor.avatar.clone(),
        }
    }
}

/// Reduced user projection embedded in enriched review responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: String,
    pub username: String,
    pub fullname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            fullname: user.fullname.clone(),
            avatar: user.avatar.clone(),
        }
    }
}
