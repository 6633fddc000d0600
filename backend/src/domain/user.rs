//! Account data model.
//!
//! Users are identified by a unique, lowercased email address and carry one of
//! three roles. Profile fields are validated on construction so the account
//! store only ever sees well-formed values.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::auth::PasswordHash;
use super::ids::UserId;
use super::media::MediaReference;

/// Minimum length for first and last names.
pub const NAME_MIN: usize = 2;
/// Maximum length for first and last names.
pub const NAME_MAX: usize = 50;
/// Maximum length of the free-form biography.
pub const BIO_MAX: usize = 500;

/// Validation errors raised by account value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("Please provide a valid email")]
    InvalidEmail,
    #[error("{field} must be between {min} and {max} characters")]
    NameLength {
        field: &'static str,
        min: usize,
        max: usize,
    },
    #[error("Bio cannot exceed {max} characters")]
    BioTooLong { max: usize },
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Access role attached to every account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Manager,
    Admin,
}

impl Role {
    /// Canonical wire form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Manager => "MANAGER",
            Self::Admin => "ADMIN",
        }
    }

    /// Managers and admins curate the catalog.
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Manager | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "MANAGER" => Ok(Self::Manager),
            "ADMIN" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Email address, trimmed and lowercased.
///
/// # Examples
/// ```
/// use coursehub::domain::EmailAddress;
///
/// let email = EmailAddress::new("  Ada@Example.COM ").expect("valid email");
/// assert_eq!(email.as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Normalise and validate an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// First or last name, trimmed, between [`NAME_MIN`] and [`NAME_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    /// Validate a name; `field` names the input in error messages.
    pub fn new(field: &'static str, raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        let length = trimmed.chars().count();
        if !(NAME_MIN..=NAME_MAX).contains(&length) {
            return Err(UserValidationError::NameLength {
                field,
                min: NAME_MIN,
                max: NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Free-form biography capped at [`BIO_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Bio(String);

impl Bio {
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let bio = raw.into();
        if bio.chars().count() > BIO_MAX {
            return Err(UserValidationError::BioTooLong { max: BIO_MAX });
        }
        Ok(Self(bio))
    }
}

impl AsRef<str> for Bio {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Optional personal details shown on the profile page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub phone: Option<String>,
    pub bio: Option<Bio>,
    pub location: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub occupation: Option<String>,
    pub education: Option<String>,
}

/// Stored account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub password_hash: PasswordHash,
    pub role: Role,
    pub avatar: MediaReference,
    pub profile: UserProfile,
    pub is_active: bool,
    pub is_email_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to open a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub password_hash: PasswordHash,
    pub role: Role,
}

impl User {
    /// Build a fresh account with default flags and avatar.
    pub fn register(account: NewAccount, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::random(),
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            password_hash: account.password_hash,
            role: account.role,
            avatar: MediaReference::default_avatar(),
            profile: UserProfile::default(),
            is_active: true,
            is_email_verified: false,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial profile update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
    pub phone: Option<String>,
    pub bio: Option<Bio>,
    pub location: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub occupation: Option<String>,
    pub education: Option<String>,
}

impl ProfileUpdate {
    /// Apply the supplied fields to `user` and bump its modification time.
    pub fn apply_to(self, user: &mut User, now: DateTime<Utc>) {
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        let profile = &mut user.profile;
        if self.phone.is_some() {
            profile.phone = self.phone;
        }
        if self.bio.is_some() {
            profile.bio = self.bio;
        }
        if self.location.is_some() {
            profile.location = self.location;
        }
        if self.date_of_birth.is_some() {
            profile.date_of_birth = self.date_of_birth;
        }
        if self.occupation.is_some() {
            profile.occupation = self.occupation;
        }
        if self.education.is_some() {
            profile.education = self.education;
        }
        user.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    #[fixture]
    fn user(now: DateTime<Utc>) -> User {
        User::register(
            NewAccount {
                first_name: PersonName::new("firstName", "Ada").expect("valid name"),
                last_name: PersonName::new("lastName", "Lovelace").expect("valid name"),
                email: EmailAddress::new("ada@example.com").expect("valid email"),
                password_hash: PasswordHash::new("hash"),
                role: Role::User,
            },
            now,
        )
    }

    #[rstest]
    #[case("ada@example.com", "ada@example.com")]
    #[case("  ADA@Example.com\t", "ada@example.com")]
    fn email_is_normalised(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(EmailAddress::new(raw).expect("valid").as_ref(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("ada")]
    #[case("ada@example")]
    #[case("a da@example.com")]
    fn email_rejects_malformed_values(#[case] raw: &str) {
        assert_eq!(EmailAddress::new(raw), Err(UserValidationError::InvalidEmail));
    }

    #[rstest]
    #[case("A")]
    #[case("   ")]
    #[case(&"x".repeat(51))]
    fn names_enforce_length(#[case] raw: &str) {
        let error = PersonName::new("firstName", raw).expect_err("invalid name");
        assert_eq!(
            error.to_string(),
            "firstName must be between 2 and 50 characters"
        );
    }

    #[rstest]
    fn names_are_trimmed() {
        let name = PersonName::new("lastName", "  Hopper ").expect("valid name");
        assert_eq!(name.as_ref(), "Hopper");
    }

    #[rstest]
    fn bio_rejects_long_text() {
        assert_eq!(
            Bio::new("b".repeat(501)),
            Err(UserValidationError::BioTooLong { max: 500 })
        );
        assert!(Bio::new("b".repeat(500)).is_ok());
    }

    #[rstest]
    #[case("USER", Role::User)]
    #[case("MANAGER", Role::Manager)]
    #[case("ADMIN", Role::Admin)]
    fn roles_parse_from_wire_form(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(raw.parse::<Role>(), Ok(expected));
        assert_eq!(expected.as_str(), raw);
    }

    #[rstest]
    fn register_applies_defaults(user: User, now: DateTime<Utc>) {
        assert!(user.is_active);
        assert!(!user.is_email_verified);
        assert_eq!(user.avatar, MediaReference::default_avatar());
        assert_eq!(user.created_at, now);
        assert!(user.last_login.is_none());
    }

    #[rstest]
    fn profile_update_only_touches_supplied_fields(mut user: User, now: DateTime<Utc>) {
        user.profile.phone = Some("555-0100".to_owned());
        let later = now + chrono::TimeDelta::hours(1);
        ProfileUpdate {
            occupation: Some("Engineer".to_owned()),
            ..ProfileUpdate::default()
        }
        .apply_to(&mut user, later);

        assert_eq!(user.profile.phone.as_deref(), Some("555-0100"));
        assert_eq!(user.profile.occupation.as_deref(), Some("Engineer"));
        assert_eq!(user.first_name.as_ref(), "Ada");
        assert_eq!(user.updated_at, later);
    }
}
