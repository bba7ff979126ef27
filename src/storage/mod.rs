//!  Storage is organized through [store::Store], with [sqlite::SqliteStore] as the main realization.
//!  The basic idea is:
//!   - Every row belongs to a user and every query is scoped by user id.
//!   - Tracked time is bucketed by a calendar day (`track_date`), never by an instant.
//!   - Uniqueness violations come back typed, see [store::StoreError::UniqueViolation].

pub mod entities;
pub mod sqlite;
pub mod store;
