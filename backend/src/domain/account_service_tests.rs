//! Tests for the account service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{
    MockMediaStorage, MockPasswordHasher, MockTokenService, MockUserRepository,
};
use crate::domain::{
    EmailAddress, ErrorCode, MediaKind, MediaReference, PasswordHash, PersonName, PlainPassword,
    SessionToken,
};
use crate::test_support::MutableClock;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rstest::{fixture, rstest};
use zeroize::Zeroizing;

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn existing_user(now: DateTime<Utc>) -> User {
    User::register(
        NewAccount {
            first_name: PersonName::new("firstName", "Ada").expect("valid name"),
            last_name: PersonName::new("lastName", "Lovelace").expect("valid name"),
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            password_hash: PasswordHash::new("hashed:secret1"),
            role: Role::User,
        },
        now - TimeDelta::days(30),
    )
}

fn registration(requested_role: Option<Role>) -> Registration {
    Registration {
        first_name: PersonName::new("firstName", "Grace").expect("valid name"),
        last_name: PersonName::new("lastName", "Hopper").expect("valid name"),
        email: EmailAddress::new("grace@example.com").expect("valid email"),
        password: PlainPassword::new("cobol-rules").expect("valid password"),
        requested_role,
    }
}

/// Hasher that prefixes the plain text, so verification is a string compare.
fn echo_hasher() -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|password| Ok(PasswordHash::new(format!("hashed:{}", password.expose()))));
    hasher
        .expect_verify()
        .returning(|candidate, hash| Ok(hash.as_str() == format!("hashed:{candidate}")));
    hasher
}

fn issuing_tokens(now: DateTime<Utc>) -> MockTokenService {
    let mut tokens = MockTokenService::new();
    tokens.expect_issue().returning(move |claims| {
        Ok(SessionToken {
            token: format!("token-for-{}", claims.user_id),
            expires_at: now + TimeDelta::days(1),
        })
    });
    tokens
}

fn make_service(
    users: MockUserRepository,
    media: MockMediaStorage,
    now: DateTime<Utc>,
) -> AccountService<MockUserRepository> {
    AccountService::new(
        Arc::new(users),
        AccountCollaborators {
            hasher: Arc::new(echo_hasher()),
            tokens: Arc::new(issuing_tokens(now)),
            media: Arc::new(media),
            clock: Arc::new(MutableClock::new(now)),
        },
    )
}

#[rstest]
#[tokio::test]
async fn register_creates_user_with_default_role(now: DateTime<Utc>) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(|_| Ok(None));
    users
        .expect_insert()
        .withf(|user| {
            user.role == Role::User && user.password_hash.as_str() == "hashed:cobol-rules"
        })
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(users, MockMediaStorage::new(), now);
    let account = service
        .register(registration(Some(Role::Admin)))
        .await
        .expect("registration succeeds");

    assert_eq!(account.user.role, Role::User);
    assert_eq!(account.user.created_at, now);
    assert!(account.user.is_active);
    assert_eq!(account.token.token, format!("token-for-{}", account.user.id));
}

#[rstest]
#[tokio::test]
async fn register_honours_role_when_self_assignment_enabled(now: DateTime<Utc>) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(|_| Ok(None));
    users.expect_insert().return_once(|_| Ok(()));

    let service =
        make_service(users, MockMediaStorage::new(), now).with_role_self_assignment(true);
    let account = service
        .register(registration(Some(Role::Manager)))
        .await
        .expect("registration succeeds");
    assert_eq!(account.user.role, Role::Manager);
}

#[rstest]
#[tokio::test]
async fn register_rejects_known_email(now: DateTime<Utc>) {
    let user = existing_user(now);
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(user)));
    users.expect_insert().times(0);

    let service = make_service(users, MockMediaStorage::new(), now);
    let error = service
        .register(registration(None))
        .await
        .expect_err("duplicate email");
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), "User already exists");
}

#[rstest]
#[tokio::test]
async fn register_maps_insert_race_to_conflict(now: DateTime<Utc>) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(|_| Ok(None));
    users
        .expect_insert()
        .return_once(|_| Err(UserPersistenceError::duplicate_email("grace@example.com")));

    let service = make_service(users, MockMediaStorage::new(), now);
    let error = service
        .register(registration(None))
        .await
        .expect_err("duplicate email");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn login_records_last_login(now: DateTime<Utc>) {
    let user = existing_user(now);
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(user)));
    users
        .expect_update()
        .withf(move |saved| saved.last_login == Some(now))
        .times(1)
        .return_once(|_| Ok(true));

    let service = make_service(users, MockMediaStorage::new(), now);
    let credentials =
        LoginCredentials::try_from_parts("ADA@example.com", "secret1").expect("valid input");
    let account = service.login(credentials).await.expect("login succeeds");
    assert_eq!(account.user.last_login, Some(now));
}

#[rstest]
#[case(None)]
#[case(Some("wrong-password"))]
#[tokio::test]
async fn login_failures_share_one_message(now: DateTime<Utc>, #[case] password: Option<&str>) {
    let known = password.map(|_| existing_user(now));
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(move |_| Ok(known));
    users.expect_update().times(0);

    let service = make_service(users, MockMediaStorage::new(), now);
    let credentials =
        LoginCredentials::try_from_parts("ada@example.com", password.unwrap_or("secret1"))
            .expect("valid input");
    let error = service.login(credentials).await.expect_err("login fails");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), "Invalid email or password");
}

#[rstest]
#[tokio::test]
async fn login_refuses_deactivated_accounts(now: DateTime<Utc>) {
    let mut user = existing_user(now);
    user.is_active = false;
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(user)));

    let service = make_service(users, MockMediaStorage::new(), now);
    let credentials =
        LoginCredentials::try_from_parts("ada@example.com", "secret1").expect("valid input");
    let error = service.login(credentials).await.expect_err("inactive");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn change_password_checks_current_password(now: DateTime<Utc>) {
    let user = existing_user(now);
    let user_id = user.id;
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(user)));
    users.expect_update().times(0);

    let service = make_service(users, MockMediaStorage::new(), now);
    let change = PasswordChange {
        current_password: Zeroizing::new("not-it".to_owned()),
        new_password: PlainPassword::new("brand-new").expect("valid password"),
    };
    let error = service
        .change_password(&user_id, change)
        .await
        .expect_err("wrong current password");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "Current password is incorrect");
}

#[rstest]
#[tokio::test]
async fn change_password_stores_new_hash(now: DateTime<Utc>) {
    let user = existing_user(now);
    let user_id = user.id;
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(user)));
    users
        .expect_update()
        .withf(|saved| saved.password_hash.as_str() == "hashed:brand-new")
        .times(1)
        .return_once(|_| Ok(true));

    let service = make_service(users, MockMediaStorage::new(), now);
    let change = PasswordChange {
        current_password: Zeroizing::new("secret1".to_owned()),
        new_password: PlainPassword::new("brand-new").expect("valid password"),
    };
    service
        .change_password(&user_id, change)
        .await
        .expect("password changed");
}

#[rstest]
#[tokio::test]
async fn delete_missing_account_is_not_found(now: DateTime<Utc>) {
    let mut users = MockUserRepository::new();
    users.expect_delete().return_once(|_| Ok(false));

    let service = make_service(users, MockMediaStorage::new(), now);
    let error = service
        .delete_account(&UserId::random())
        .await
        .expect_err("missing account");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "User not found");
}

#[rstest]
#[tokio::test]
async fn replace_avatar_points_profile_at_stored_file(now: DateTime<Utc>) {
    let user = existing_user(now);
    let user_id = user.id;
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(user)));
    users.expect_update().return_once(|_| Ok(true));
    let mut media = MockMediaStorage::new();
    media
        .expect_store()
        .times(1)
        .return_once(|_| Ok(MediaReference::new("uploads/users/avatar.png")));

    let service = make_service(users, media, now);
    let upload = ImageUpload::new(MediaKind::Avatar, "image/png", vec![1, 2, 3])
        .expect("valid upload");
    let updated = service
        .replace_avatar(&user_id, upload)
        .await
        .expect("avatar replaced");
    assert_eq!(updated.avatar.as_ref(), "uploads/users/avatar.png");
}

#[rstest]
#[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(UserPersistenceError::query("bad sql"), ErrorCode::InternalError)]
#[tokio::test]
async fn profile_maps_repository_failures(
    now: DateTime<Utc>,
    #[case] failure: UserPersistenceError,
    #[case] expected: ErrorCode,
) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(move |_| Err(failure));

    let service = make_service(users, MockMediaStorage::new(), now);
    let error = service
        .profile(&UserId::random())
        .await
        .expect_err("repository failure");
    assert_eq!(error.code(), expected);
}

#[rstest]
#[tokio::test]
async fn list_users_reports_pagination(now: DateTime<Utc>) {
    let user = existing_user(now);
    let mut users = MockUserRepository::new();
    users
        .expect_list()
        .return_once(move |_| Ok((vec![user], 11)));

    let service = make_service(users, MockMediaStorage::new(), now);
    let page = pagination::PagePolicy::new(10, 100)
        .resolve(Some(2), None)
        .expect("valid page");
    let listed = service.list_users(page).await.expect("listing succeeds");
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.pagination.total, 11);
    assert_eq!(listed.pagination.pages, 2);
}
