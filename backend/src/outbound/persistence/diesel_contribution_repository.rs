//! Diesel-backed contribution repository for PostgreSQL.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ContributionRow, NewContributionRow};
use super::pool::DbPool;
use super::schema::{contributions, users};
use crate::domain::contribution::{
    Contribution, ContributionWithAuthor, Rating, ReviewText,
};
use crate::domain::ports::{ContributionRepository, ContributionStoreError};

/// Contribution repository backed by the `contributions` table.
#[derive(Clone)]
pub struct DieselContributionRepository {
    pool: DbPool,
}

impl DieselContributionRepository {
    /// Create a repository using the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: DieselError) -> ContributionStoreError {
    map_diesel_error(
        error,
        ContributionStoreError::query,
        ContributionStoreError::connection,
    )
}

/// Escape LIKE metacharacters so the query matches them literally.
fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn row_to_domain((row, reviewer_name): (ContributionRow, String)) -> ContributionWithAuthor {
    ContributionWithAuthor {
        contribution: Contribution {
            id: row.id,
            owner_id: row.owner_id,
            faculty_name: row.faculty_name,
            faculty_email: row.faculty_email,
            rating: Rating::from_stored(row.rating),
            review: ReviewText::from_stored(row.review),
            created_at: row.created_at,
        },
        reviewer_name,
    }
}

#[async_trait]
impl ContributionRepository for DieselContributionRepository {
    async fn insert(&self, contribution: &Contribution) -> Result<(), ContributionStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ContributionStoreError::connection))?;

        let folded_email = contribution.faculty_email.to_lowercase();
        let row = NewContributionRow {
            id: contribution.id,
            owner_id: contribution.owner_id,
            faculty_name: &contribution.faculty_name,
            faculty_email: &folded_email,
            rating: contribution.rating.value(),
            review: contribution.review.as_ref(),
            created_at: contribution.created_at,
        };

        diesel::insert_into(contributions::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn exists_for_faculty(
        &self,
        owner_id: Uuid,
        faculty_email: &str,
    ) -> Result<bool, ContributionStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ContributionStoreError::connection))?;

        let count: i64 = contributions::table
            .filter(contributions::owner_id.eq(owner_id))
            .filter(contributions::faculty_email.eq(faculty_email))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_error)?;

        Ok(count > 0)
    }

    async fn list_for_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<ContributionWithAuthor>, ContributionStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ContributionStoreError::connection))?;

        let rows = contributions::table
            .inner_join(users::table)
            .filter(contributions::owner_id.eq(owner_id))
            .order(contributions::created_at.asc())
            .select((ContributionRow::as_select(), users::name))
            .load::<(ContributionRow, String)>(&mut conn)
            .await
            .map_err(map_error)?;

        Ok(rows.into_iter().map(row_to_domain).collect())
    }

    async fn list_all(&self) -> Result<Vec<ContributionWithAuthor>, ContributionStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ContributionStoreError::connection))?;

        let rows = contributions::table
            .inner_join(users::table)
            .order(contributions::created_at.asc())
            .select((ContributionRow::as_select(), users::name))
            .load::<(ContributionRow, String)>(&mut conn)
            .await
            .map_err(map_error)?;

        Ok(rows.into_iter().map(row_to_domain).collect())
    }

    async fn search(
        &self,
        query: &str,
    ) -> Result<Vec<ContributionWithAuthor>, ContributionStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ContributionStoreError::connection))?;

        let pattern = format!("%{}%", escape_like(query));
        let rows = contributions::table
            .inner_join(users::table)
            .filter(
                contributions::faculty_name
                    .ilike(&pattern)
                    .or(contributions::faculty_email.ilike(&pattern)),
            )
            .order(contributions::created_at.asc())
            .select((ContributionRow::as_select(), users::name))
            .load::<(ContributionRow, String)>(&mut conn)
            .await
            .map_err(map_error)?;

        Ok(rows.into_iter().map(row_to_domain).collect())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ContributionStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ContributionStoreError::connection))?;

        let deleted = diesel::delete(contributions::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_error)?;

        Ok(deleted > 0)
    }
}
