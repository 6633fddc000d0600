//! UUID-backed identifiers for the aggregates.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raised when an identifier string is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} must be a valid UUID")]
pub struct InvalidId {
    kind: &'static str,
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Parse an identifier from its canonical string form.
            pub fn new(id: impl AsRef<str>) -> Result<Self, InvalidId> {
                let raw = id.as_ref();
                if raw.trim() != raw {
                    return Err(InvalidId { kind: $kind });
                }
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| InvalidId { kind: $kind })
            }

            /// Generate a fresh random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidId;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

uuid_id!(
    /// Stable user identifier.
    UserId,
    "user id"
);
uuid_id!(
    /// Stable course identifier.
    CourseId,
    "course id"
);
uuid_id!(
    /// Stable enrollment identifier.
    EnrollmentId,
    "enrollment id"
);

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("not-a-uuid")]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    fn rejects_malformed_ids(#[case] raw: &str) {
        let error = CourseId::new(raw).expect_err("malformed id");
        assert_eq!(error.to_string(), "course id must be a valid UUID");
    }

    #[rstest]
    fn round_trips_through_display() {
        let id = EnrollmentId::random();
        let parsed: EnrollmentId = id.to_string().parse().expect("valid id");
        assert_eq!(parsed, id);
    }

    #[rstest]
    fn serialises_as_plain_string() {
        let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
        let value = serde_json::to_value(id).expect("serialise");
        assert_eq!(value, serde_json::json!("3fa85f64-5717-4562-b3fc-2c963f66afa6"));
    }
}
