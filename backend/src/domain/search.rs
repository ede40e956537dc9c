//! Public review search: substring matching plus per-faculty aggregation.

use std::sync::Arc;

use super::contribution::ContributionWithAuthor;
use super::ports::{ContributionRepository, ContributionStoreError};
use super::Error;

fn map_store_error(error: ContributionStoreError) -> Error {
    match error {
        ContributionStoreError::Connection { message } => Error::service_unavailable(message),
        ContributionStoreError::Query { message } => Error::internal(message),
    }
}

/// All reviews for one faculty member, with the mean rating to one decimal.
#[derive(Debug, Clone, PartialEq)]
pub struct FacultyAggregate {
    pub faculty_name: String,
    pub faculty_email: String,
    /// Rendered with exactly one decimal place, truncating-free rounding to
    /// the nearest tenth (half away from zero).
    pub average_rating: String,
    pub reviews: Vec<ContributionWithAuthor>,
}

/// What a search returned.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Empty query: the full flattened review list.
    All(Vec<ContributionWithAuthor>),
    /// Non-empty query: matches grouped per faculty email.
    Grouped(Vec<FacultyAggregate>),
}

/// Mean of integer ratings rendered to one decimal place.
///
/// Integer-only: tenths = round(10 * sum / count), then split into whole and
/// fractional digits. Ratings are 1..=5 so none of this can overflow i64.
fn format_average(ratings: &[i32]) -> String {
    let count = ratings.len() as i64;
    debug_assert!(count > 0);
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    let tenths = (20 * sum + count) / (2 * count);
    format!("{}.{}", tenths / 10, tenths % 10)
}

/// Search service over the contribution store.
#[derive(Clone)]
pub struct SearchService {
    contributions: Arc<dyn ContributionRepository>,
}

impl SearchService {
    /// Create the service over the contribution store.
    pub fn new(contributions: Arc<dyn ContributionRepository>) -> Self {
        Self { contributions }
    }

    /// Run a search. An empty query lists everything ungrouped.
    ///
    /// The split is on emptiness alone; a whitespace-only query is a real
    /// substring query and matches faculty names containing spaces.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, Error> {
        if query.is_empty() {
            let all = self
                .contributions
                .list_all()
                .await
                .map_err(map_store_error)?;
            if all.is_empty() {
                return Err(Error::not_found("No contributions found."));
            }
            return Ok(SearchOutcome::All(all));
        }

        let matches = self
            .contributions
            .search(query)
            .await
            .map_err(map_store_error)?;
        if matches.is_empty() {
            return Err(Error::not_found("No contributions found."));
        }
        Ok(SearchOutcome::Grouped(group_by_faculty(matches)))
    }
}

/// Group matches per faculty email, preserving first-seen group order and
/// storage order within each group. Stored emails are already lowercased, so
/// the key needs no folding.
fn group_by_faculty(matches: Vec<ContributionWithAuthor>) -> Vec<FacultyAggregate> {
    let mut groups: Vec<(String, Vec<ContributionWithAuthor>)> = Vec::new();
    for item in matches {
        let key = item.contribution.faculty_email.clone();
        match groups.iter_mut().find(|(email, _)| *email == key) {
            Some((_, members)) => members.push(item),
            None => groups.push((key, vec![item])),
        }
    }
    groups
        .into_iter()
        .map(|(faculty_email, reviews)| {
            let ratings: Vec<i32> = reviews
                .iter()
                .map(|r| r.contribution.rating.value())
                .collect();
            FacultyAggregate {
                faculty_name: reviews[0].contribution.faculty_name.clone(),
                faculty_email,
                average_rating: format_average(&ratings),
                reviews,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    //! Aggregation and formatting coverage.
    use super::*;
    use crate::domain::contribution::{Contribution, Rating, ReviewText};
    use crate::domain::ports::{MemoryContributionRepository, MemoryStore};
    use crate::domain::ErrorCode;
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    #[case(&[4], "4.0")]
    #[case(&[5, 4], "4.5")]
    #[case(&[5, 5, 4], "4.7")]
    #[case(&[1, 2], "1.5")]
    #[case(&[3, 3, 3], "3.0")]
    fn averages_render_to_one_decimal(#[case] ratings: &[i32], #[case] expected: &str) {
        assert_eq!(format_average(ratings), expected);
    }

    async fn service_with(reviews: Vec<(&str, &str, i32)>) -> SearchService {
        let store = Arc::new(MemoryStore::default());
        let repository = Arc::new(MemoryContributionRepository::new(store));
        for (name, email, rating) in reviews {
            let contribution = Contribution {
                id: Uuid::new_v4(),
                owner_id: Uuid::new_v4(),
                faculty_name: name.to_owned(),
                faculty_email: email.to_owned(),
                rating: Rating::from_stored(rating),
                review: ReviewText::from_stored("Fine."),
                created_at: Utc::now(),
            };
            repository
                .insert(&contribution)
                .await
                .expect("seed insert succeeds");
        }
        SearchService::new(repository)
    }

    #[tokio::test]
    async fn an_empty_query_lists_everything_flat() {
        let service = service_with(vec![
            ("Dr. Rao", "rao@gitam.edu", 5),
            ("Dr. Mehta", "mehta@gitam.edu", 3),
        ]).await;
        let outcome = service.search("").await.expect("search succeeds");
        match outcome {
            SearchOutcome::All(all) => assert_eq!(all.len(), 2),
            SearchOutcome::Grouped(_) => panic!("empty query must not group"),
        }
    }

    #[tokio::test]
    async fn a_whitespace_query_is_a_substring_query() {
        let service = service_with(vec![
            ("Dr. Rao", "rao@gitam.edu", 5),
            ("Mehta", "mehta@gitam.edu", 3),
        ]).await;
        let outcome = service.search(" ").await.expect("search succeeds");
        let SearchOutcome::Grouped(groups) = outcome else {
            panic!("a space must behave as a real query");
        };
        // Only "Dr. Rao" contains a space.
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].faculty_email, "rao@gitam.edu");
    }

    #[tokio::test]
    async fn a_query_groups_matches_per_faculty_email() {
        let service = service_with(vec![
            ("Dr. Rao", "rao@gitam.edu", 5),
            ("Dr. Mehta", "mehta@gitam.edu", 3),
            ("Dr. Rao", "rao@gitam.edu", 4),
        ]).await;
        let outcome = service.search("rao").await.expect("search succeeds");
        let SearchOutcome::Grouped(groups) = outcome else {
            panic!("query must group");
        };
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].faculty_email, "rao@gitam.edu");
        assert_eq!(groups[0].average_rating, "4.5");
        assert_eq!(groups[0].reviews.len(), 2);
    }

    #[tokio::test]
    async fn matching_is_case_insensitive_over_name_and_email() {
        let service = service_with(vec![("Dr. Rao", "rao@gitam.edu", 5)]).await;
        for query in ["RAO", "dr.", "gitam"] {
            let outcome = service.search(query).await.expect("search succeeds");
            let SearchOutcome::Grouped(groups) = outcome else {
                panic!("query must group");
            };
            assert_eq!(groups.len(), 1, "query {query:?} should match");
        }
    }

    #[tokio::test]
    async fn no_matches_is_not_found() {
        let service = service_with(vec![("Dr. Rao", "rao@gitam.edu", 5)]).await;
        let err = service
            .search("nobody")
            .await
            .expect_err("no matches must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "No contributions found.");
    }

    #[tokio::test]
    async fn an_empty_store_is_not_found_even_for_a_blank_query() {
        let service = service_with(vec![]).await;
        let err = service.search("").await.expect_err("empty store must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
