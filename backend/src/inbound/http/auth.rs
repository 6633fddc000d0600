//! Bearer token authentication and role gates.
//!
//! [`Authenticated`] resolves the caller from the `Authorization` header.
//! [`Authorized`] additionally checks the caller's role against a
//! [`RolePolicy`] so forbidden requests are rejected during extraction, before
//! a handler body runs.

use std::marker::PhantomData;

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::{Error, Role, SessionClaims, UserId};

use super::state::HttpState;

const TOKEN_REQUIRED: &str = "token is required";
const INVALID_TOKEN: &str = "invalid token";
const ROLE_NOT_AUTHORIZED: &str = "this role is not authorized";

/// Verified identity of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated(pub SessionClaims);

impl Authenticated {
    pub fn user_id(&self) -> &UserId {
        &self.0.user_id
    }

    pub fn role(&self) -> Role {
        self.0.role
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized(TOKEN_REQUIRED))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized(INVALID_TOKEN))?;
    value
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized(INVALID_TOKEN))
}

fn authenticate(req: &HttpRequest) -> Result<Authenticated, Error> {
    let token = bearer_token(req)?;
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    state.tokens.verify(token).map(Authenticated).map_err(|rejection| {
        debug!(%rejection, "bearer token rejected");
        Error::unauthorized(INVALID_TOKEN)
    })
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

/// Set of roles allowed through an [`Authorized`] gate.
pub trait RolePolicy {
    const ALLOWED: &'static [Role];
}

/// Managers and admins.
#[derive(Debug, Clone, Copy)]
pub struct Staff;

impl RolePolicy for Staff {
    const ALLOWED: &'static [Role] = &[Role::Manager, Role::Admin];
}

/// Authenticated caller whose role satisfies `P`.
#[derive(Debug, Clone)]
pub struct Authorized<P> {
    caller: Authenticated,
    policy: PhantomData<P>,
}

impl<P> Authorized<P> {
    pub fn caller(&self) -> &Authenticated {
        &self.caller
    }

    pub fn user_id(&self) -> &UserId {
        self.caller.user_id()
    }
}

fn authorize<P: RolePolicy>(req: &HttpRequest) -> Result<Authorized<P>, Error> {
    let caller = authenticate(req)?;
    if !P::ALLOWED.contains(&caller.role()) {
        debug!(role = %caller.role(), "role gate rejected caller");
        return Err(Error::forbidden(ROLE_NOT_AUTHORIZED));
    }
    Ok(Authorized {
        caller,
        policy: PhantomData,
    })
}

impl<P: RolePolicy> FromRequest for Authorized<P> {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authorize::<P>(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::inbound::http::test_utils::{TestHarness, bearer};
    use actix_web::test::TestRequest;
    use rstest::rstest;

    fn request_with(harness: &TestHarness, header: Option<String>) -> HttpRequest {
        let request = TestRequest::default().app_data(harness.state());
        match header {
            Some(value) => request.insert_header((AUTHORIZATION, value)),
            None => request,
        }
        .to_http_request()
    }

    #[rstest]
    fn missing_header_requires_a_token() {
        let harness = TestHarness::new();
        let error = authenticate(&request_with(&harness, None)).expect_err("no header");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.message(), TOKEN_REQUIRED);
    }

    #[rstest]
    #[case("Bearer")]
    #[case("Basic abc")]
    #[case("Bearer not-a-token")]
    fn malformed_or_unknown_tokens_are_invalid(#[case] header: &str) {
        let harness = TestHarness::new();
        let error = authenticate(&request_with(&harness, Some(header.to_owned())))
            .expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.message(), INVALID_TOKEN);
    }

    #[rstest]
    fn valid_tokens_resolve_the_caller() {
        let harness = TestHarness::new();
        let (user_id, token) = harness.token_for(Role::User);
        let caller = authenticate(&request_with(&harness, Some(bearer(&token))))
            .expect("authenticated");
        assert_eq!(caller.user_id(), &user_id);
    }

    #[rstest]
    #[case(Role::User, false)]
    #[case(Role::Manager, true)]
    #[case(Role::Admin, true)]
    fn staff_gate_checks_roles(#[case] role: Role, #[case] allowed: bool) {
        let harness = TestHarness::new();
        let (_, token) = harness.token_for(role);
        let result = authorize::<Staff>(&request_with(&harness, Some(bearer(&token))));
        match result {
            Ok(_) => assert!(allowed),
            Err(error) => {
                assert!(!allowed);
                assert_eq!(error.code(), ErrorCode::Forbidden);
            }
        }
    }
}
