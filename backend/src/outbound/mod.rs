//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: process-local repositories for database-less runs and tests
//! - **credentials**: Argon2id password hashing and JWT session tokens
//! - **storage**: filesystem media storage for uploaded images
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod credentials;
pub mod memory;
pub mod persistence;
pub mod storage;
