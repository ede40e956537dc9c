//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Registered student accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name, trimmed on write.
        name -> Varchar,
        /// Lowercased institutional address, unique.
        email -> Varchar,
        /// Bcrypt hash of the password.
        password_hash -> Varchar,
        /// Whether the address has been verified.
        is_verified -> Bool,
        /// Live six-digit verification code, if one is outstanding.
        verification_code -> Nullable<Varchar>,
        /// Expiry of the outstanding code.
        verification_code_expires -> Nullable<Timestamptz>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Faculty reviews, one row per submission.
    contributions (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user; rows are removed with the account.
        owner_id -> Uuid,
        /// Faculty display name as submitted.
        faculty_name -> Varchar,
        /// Faculty address, lowercased on write.
        faculty_email -> Varchar,
        /// Integer rating between 1 and 5.
        rating -> Int4,
        /// Review text, at most 500 characters.
        review -> Text,
        /// Submission timestamp assigned by the server.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(contributions -> users (owner_id));
diesel::allow_tables_to_appear_in_same_query!(contributions, users);
