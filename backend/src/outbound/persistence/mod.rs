//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types; business rules stay in the domain services. Row structs
//! (`models.rs`) and table definitions (`schema.rs`) never leave this module.
//!
//! # Example
//!
//! ```ignore
//! use coursehub::outbound::persistence::{DbPool, DieselCourseRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/coursehub")).await?;
//! let courses = DieselCourseRepository::new(pool);
//! ```

mod diesel_course_repository;
mod diesel_enrollment_repository;
mod diesel_user_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_course_repository::DieselCourseRepository;
pub use diesel_enrollment_repository::DieselEnrollmentRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError, run_migrations};
