//! Diesel-backed credential repository for PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CodeUpdate, CredentialRow, NewCredentialRow};
use super::pool::DbPool;
use super::schema::{contributions, users};
use crate::domain::credential::{
    Credential, DisplayName, PasswordHash, StudentEmail, VerificationCode, VerificationStatus,
};
use crate::domain::ports::{CredentialRepository, CredentialStoreError};

/// Credential repository backed by the `users` table.
#[derive(Clone)]
pub struct DieselCredentialRepository {
    pool: DbPool,
}

impl DieselCredentialRepository {
    /// Create a repository using the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: DieselError) -> CredentialStoreError {
    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) = &error {
        return CredentialStoreError::DuplicateEmail;
    }
    map_diesel_error(
        error,
        CredentialStoreError::query,
        CredentialStoreError::connection,
    )
}

/// Split the verification state into its three column values.
fn status_columns(status: &VerificationStatus) -> (bool, Option<&str>, Option<DateTime<Utc>>) {
    match status {
        VerificationStatus::Verified => (true, None, None),
        VerificationStatus::Pending { code, expires_at } => {
            (false, Some(code.as_ref()), Some(*expires_at))
        }
        VerificationStatus::CodeCleared => (false, None, None),
    }
}

/// Rebuild the verification state from its stored columns.
///
/// A code without an expiry (or vice versa) counts as cleared; the write
/// paths always set or clear both columns together.
fn status_from_columns(
    is_verified: bool,
    code: Option<String>,
    expires_at: Option<DateTime<Utc>>,
) -> VerificationStatus {
    if is_verified {
        return VerificationStatus::Verified;
    }
    match (code, expires_at) {
        (Some(code), Some(expires_at)) => VerificationStatus::Pending {
            code: VerificationCode::from_stored(code),
            expires_at,
        },
        _ => VerificationStatus::CodeCleared,
    }
}

fn row_to_credential(row: CredentialRow) -> Credential {
    let status = status_from_columns(
        row.is_verified,
        row.verification_code,
        row.verification_code_expires,
    );
    Credential {
        id: row.id,
        name: DisplayName::from_stored(row.name),
        email: StudentEmail::from_stored(row.email),
        password_hash: PasswordHash::from_stored(row.password_hash),
        status,
        created_at: row.created_at,
    }
}

#[async_trait]
impl CredentialRepository for DieselCredentialRepository {
    async fn insert(&self, credential: &Credential) -> Result<(), CredentialStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CredentialStoreError::connection))?;

        let (is_verified, code, expires) = status_columns(&credential.status);
        let row = NewCredentialRow {
            id: credential.id,
            name: credential.name.as_ref(),
            email: credential.email.as_ref(),
            password_hash: credential.password_hash.as_ref(),
            is_verified,
            verification_code: code,
            verification_code_expires: expires,
            created_at: credential.created_at,
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Credential>, CredentialStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CredentialStoreError::connection))?;

        let row = users::table
            .filter(users::email.eq(email))
            .select(CredentialRow::as_select())
            .first::<CredentialRow>(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;

        Ok(row.map(row_to_credential))
    }

    async fn set_pending_code(
        &self,
        id: Uuid,
        code: &VerificationCode,
        expires_at: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CredentialStoreError::connection))?;

        diesel::update(users::table.find(id))
            .set(CodeUpdate {
                verification_code: Some(code.as_ref()),
                verification_code_expires: Some(expires_at),
            })
            .execute(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn clear_code(&self, id: Uuid) -> Result<(), CredentialStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CredentialStoreError::connection))?;

        diesel::update(users::table.find(id))
            .set(CodeUpdate {
                verification_code: None,
                verification_code_expires: None,
            })
            .execute(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid) -> Result<(), CredentialStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CredentialStoreError::connection))?;

        diesel::update(users::table.find(id))
            .set((
                users::is_verified.eq(true),
                users::verification_code.eq(None::<String>),
                users::verification_code_expires.eq(None::<DateTime<Utc>>),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<(), CredentialStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CredentialStoreError::connection))?;

        conn.transaction::<_, DieselError, _>(|conn| {
            async move {
                diesel::delete(contributions::table.filter(contributions::owner_id.eq(id)))
                    .execute(conn)
                    .await?;
                diesel::delete(users::table.find(id)).execute(conn).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn pending(code: &str, expires_at: DateTime<Utc>) -> VerificationStatus {
        VerificationStatus::Pending {
            code: VerificationCode::from_stored(code),
            expires_at,
        }
    }

    #[rstest]
    fn verified_rows_ignore_stale_code_columns() {
        let expires = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single();
        let status = status_from_columns(true, Some("123456".into()), expires);
        assert_eq!(status, VerificationStatus::Verified);
    }

    #[rstest]
    fn an_unverified_row_with_both_columns_is_pending() {
        let Some(expires) = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single() else {
            panic!("timestamp must be unambiguous");
        };
        let status = status_from_columns(false, Some("654321".into()), Some(expires));
        assert_eq!(status, pending("654321", expires));
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("123456".to_owned()), None)]
    #[case(None, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single())]
    fn a_half_cleared_row_counts_as_cleared(
        #[case] code: Option<String>,
        #[case] expires: Option<DateTime<Utc>>,
    ) {
        let status = status_from_columns(false, code, expires);
        assert_eq!(status, VerificationStatus::CodeCleared);
    }

    #[rstest]
    fn status_columns_round_trip_through_the_split() {
        let Some(expires) = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single() else {
            panic!("timestamp must be unambiguous");
        };
        let original = pending("111111", expires);
        let (is_verified, code, stored_expiry) = status_columns(&original);
        let rebuilt = status_from_columns(is_verified, code.map(str::to_owned), stored_expiry);
        assert_eq!(rebuilt, original);
    }
}
