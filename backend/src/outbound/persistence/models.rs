//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain. They exist solely to satisfy Diesel's type requirements.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{contributions, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub verification_code: Option<String>,
    pub verification_code_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewCredentialRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub is_verified: bool,
    pub verification_code: Option<&'a str>,
    pub verification_code_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Changeset replacing the outstanding verification code.
///
/// `None` writes SQL NULL so a cleared code really clears both columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CodeUpdate<'a> {
    pub verification_code: Option<&'a str>,
    pub verification_code_expires: Option<DateTime<Utc>>,
}

/// Row struct for reading from the contributions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = contributions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ContributionRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub faculty_name: String,
    pub faculty_email: String,
    pub rating: i32,
    pub review: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new contribution records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = contributions)]
pub(crate) struct NewContributionRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub faculty_name: &'a str,
    pub faculty_email: &'a str,
    pub rating: i32,
    pub review: &'a str,
    pub created_at: DateTime<Utc>,
}
