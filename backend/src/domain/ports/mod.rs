//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`) are called by inbound adapters;
//! driven ports (repositories, credentials, media storage) are implemented by
//! outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod account_query;
mod catalog_command;
mod catalog_query;
mod course_repository;
mod credentials;
mod enrollment_command;
mod enrollment_query;
mod enrollment_repository;
mod media_storage;
mod user_repository;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, AuthenticatedAccount, PasswordChange, Registration};
#[cfg(test)]
pub use account_query::MockAccountQuery;
pub use account_query::AccountQuery;
#[cfg(test)]
pub use catalog_command::MockCatalogCommand;
pub use catalog_command::CatalogCommand;
#[cfg(test)]
pub use catalog_query::MockCatalogQuery;
pub use catalog_query::CatalogQuery;
#[cfg(test)]
pub use course_repository::MockCourseRepository;
pub use course_repository::{CoursePersistenceError, CourseRepository};
#[cfg(test)]
pub use credentials::{MockPasswordHasher, MockTokenService};
pub use credentials::{CredentialError, PasswordHasher, TokenRejection, TokenService};
#[cfg(test)]
pub use enrollment_command::MockEnrollmentCommand;
pub use enrollment_command::EnrollmentCommand;
#[cfg(test)]
pub use enrollment_query::MockEnrollmentQuery;
pub use enrollment_query::EnrollmentQuery;
#[cfg(test)]
pub use enrollment_repository::MockEnrollmentRepository;
pub use enrollment_repository::{EnrollmentPersistenceError, EnrollmentRepository};
#[cfg(test)]
pub use media_storage::MockMediaStorage;
pub use media_storage::{MediaStorage, MediaStorageError, StoredMedia};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
