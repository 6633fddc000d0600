//! HS256 JSON Web Token implementation of the `TokenService` port.
//!
//! Expiry is checked against the injected clock rather than the system time
//! so that tests can move time forward deterministically.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{CredentialError, TokenRejection, TokenService};
use crate::domain::{EmailAddress, Role, SessionClaims, SessionToken, UserId};

/// Registered and private claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    email: String,
    role: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    pub fn new(secret: &[u8], ttl: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            clock,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

impl fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn invalid(message: impl Into<String>) -> TokenRejection {
    TokenRejection::invalid(message)
}

impl TokenService for JwtTokenService {
    fn issue(&self, claims: &SessionClaims) -> Result<SessionToken, CredentialError> {
        let issued_at = self.clock.utc();
        let expires_at = issued_at + self.ttl;
        let wire = WireClaims {
            sub: claims.user_id.to_string(),
            email: claims.email.to_string(),
            role: claims.role.as_str().to_owned(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &wire, &self.encoding)
            .map_err(|error| CredentialError::signing(error.to_string()))?;
        Ok(SessionToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<SessionClaims, TokenRejection> {
        let data = decode::<WireClaims>(token, &self.decoding, &Self::validation()).map_err(
            |error| match error.kind() {
                ErrorKind::ExpiredSignature => TokenRejection::expired(),
                _ => invalid(error.to_string()),
            },
        )?;
        let wire = data.claims;
        let expires_at = DateTime::<Utc>::from_timestamp(wire.exp, 0)
            .ok_or_else(|| invalid("exp out of range"))?;
        if expires_at <= self.clock.utc() {
            return Err(TokenRejection::expired());
        }
        Ok(SessionClaims {
            user_id: UserId::new(&wire.sub).map_err(|error| invalid(error.to_string()))?,
            email: EmailAddress::new(&wire.email).map_err(|error| invalid(error.to_string()))?,
            role: Role::from_str(&wire.role).map_err(|error| invalid(error.to_string()))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MutableClock;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        Arc::new(MutableClock::new(start))
    }

    fn claims() -> SessionClaims {
        SessionClaims {
            user_id: UserId::random(),
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            role: Role::Manager,
        }
    }

    fn service(secret: &[u8], clock: Arc<MutableClock>) -> JwtTokenService {
        JwtTokenService::new(secret, TimeDelta::hours(1), clock)
    }

    #[rstest]
    fn issued_tokens_verify_back_to_the_same_claims(clock: Arc<MutableClock>) {
        let tokens = service(b"secret", clock);
        let original = claims();
        let issued = tokens.issue(&original).expect("token issued");

        assert_eq!(tokens.verify(&issued.token), Ok(original));
    }

    #[rstest]
    fn tokens_expire_after_the_ttl(clock: Arc<MutableClock>) {
        let tokens = service(b"secret", Arc::clone(&clock));
        let issued = tokens.issue(&claims()).expect("token issued");

        clock.advance_seconds(3600);

        assert_eq!(tokens.verify(&issued.token), Err(TokenRejection::Expired));
    }

    #[rstest]
    fn tokens_signed_with_another_secret_are_rejected(clock: Arc<MutableClock>) {
        let issued = service(b"first", Arc::clone(&clock))
            .issue(&claims())
            .expect("token issued");
        let result = service(b"second", clock).verify(&issued.token);
        assert!(matches!(result, Err(TokenRejection::Invalid { .. })));
    }

    #[rstest]
    #[case("")]
    #[case("not.a.jwt")]
    fn garbage_is_rejected(clock: Arc<MutableClock>, #[case] token: &str) {
        let result = service(b"secret", clock).verify(token);
        assert!(matches!(result, Err(TokenRejection::Invalid { .. })));
    }
}
