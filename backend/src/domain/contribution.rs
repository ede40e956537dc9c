//! Contribution record: a single faculty review authored by one user.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{Error, ErrorCode};

/// Maximum stored length of a review, in characters.
pub const REVIEW_MAX_CHARS: usize = 500;
/// Maximum review length in whitespace-delimited words.
pub const REVIEW_MAX_WORDS: usize = 100;

/// Validation errors raised while constructing contribution components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContributionValidationError {
    #[error("All fields are required.")]
    MissingField,
    #[error("Rating must be between 1 and 5.")]
    RatingOutOfRange,
    #[error("Review must be {REVIEW_MAX_CHARS} characters or less.")]
    ReviewTooLong,
    #[error("Review must be {REVIEW_MAX_WORDS} words or less.")]
    TooManyWords,
    #[error("Your review contains abusive words. It cannot be submitted.")]
    FlaggedContent,
}

impl From<ContributionValidationError> for Error {
    fn from(value: ContributionValidationError) -> Self {
        Self::new(ErrorCode::InvalidRequest, value.to_string())
    }
}

/// An integer rating between 1 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Rating(i32);

impl Rating {
    /// Validate a raw rating value.
    pub fn new(value: i32) -> Result<Self, ContributionValidationError> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ContributionValidationError::RatingOutOfRange)
        }
    }

    /// Rehydrate a rating loaded from storage.
    pub fn from_stored(value: i32) -> Self {
        Self(value)
    }

    /// The numeric value.
    pub fn value(self) -> i32 {
        self.0
    }
}

/// Predicate deciding whether review text is unacceptable.
///
/// The denylist below is a blunt placeholder, not a moderation system; the
/// trait seam exists so it can be replaced without touching the write path.
pub trait ContentFilter: Send + Sync {
    /// Returns true when the text must be rejected.
    fn flags(&self, text: &str) -> bool;
}

/// Case-insensitive substring denylist, no stemming or word boundaries.
#[derive(Debug, Clone)]
pub struct DenylistFilter {
    words: Vec<String>,
}

impl Default for DenylistFilter {
    fn default() -> Self {
        Self {
            words: ["abuse", "abusive", "harmful", "offensive"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl ContentFilter for DenylistFilter {
    fn flags(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.words.iter().any(|word| lowered.contains(word))
    }
}

/// Validated review text: bounded in characters and words, filter-approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReviewText(String);

impl ReviewText {
    /// Validate raw review text against the length limits and the filter.
    pub fn new(raw: &str, filter: &dyn ContentFilter) -> Result<Self, ContributionValidationError> {
        if raw.trim().is_empty() {
            return Err(ContributionValidationError::MissingField);
        }
        if raw.chars().count() > REVIEW_MAX_CHARS {
            return Err(ContributionValidationError::ReviewTooLong);
        }
        if raw.split_whitespace().count() > REVIEW_MAX_WORDS {
            return Err(ContributionValidationError::TooManyWords);
        }
        if filter.flags(raw) {
            return Err(ContributionValidationError::FlaggedContent);
        }
        Ok(Self(raw.to_owned()))
    }

    /// Rehydrate review text loaded from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl AsRef<str> for ReviewText {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ReviewText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// A stored faculty review.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub faculty_name: String,
    /// Lowercased on write by the persistence layer.
    pub faculty_email: String,
    pub rating: Rating,
    pub review: ReviewText,
    pub created_at: DateTime<Utc>,
}

/// A contribution joined with its author's display name for read models.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionWithAuthor {
    pub contribution: Contribution,
    pub reviewer_name: String,
}
