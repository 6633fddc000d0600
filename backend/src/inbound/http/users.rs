//! Account and dashboard handlers.
//!
//! ```text
//! POST /api/users/register {"firstName":"Ada","lastName":"Lovelace","email":"ada@example.com","password":"secret1"}
//! POST /api/users/login {"email":"ada@example.com","password":"secret1"}
//! GET /api/users/profile
//! GET /api/users/dashboard
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use chrono::NaiveDate;
use pagination::PagePolicy;
use serde::Deserialize;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordChange, Registration};
use crate::domain::{
    ApiResult, Bio, CredentialValidationError, EmailAddress, Error, LoginCredentials, MediaKind, PASSWORD_MIN,
    PersonName, PlainPassword, ProfileUpdate, Role, UserValidationError,
};
use crate::inbound::http::auth::{Authenticated, Authorized, Staff};
use crate::inbound::http::envelope::{Envelope, ErrorEnvelope, MessageEnvelope};
use crate::inbound::http::schemas::{
    AuthBody, DashboardBody, PaginationBody, UserBody, UserListBody,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, PageQuery, image_upload, invalid_field_error, missing_field_error,
};

const USERS_PAGE_POLICY: PagePolicy = PagePolicy::new(10, 100);
const ALL_FIELDS_REQUIRED: &str = "All required fields must be provided";
const INVALID_LOGIN: &str = "Invalid email or password";
const PASSWORDS_REQUIRED: &str = "Current password and new password are required";

/// Registration payload for `POST /api/users/register`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[schema(min_length = 6)]
    pub password: Option<String>,
    /// Honoured only when role self-assignment is enabled.
    pub role: Option<Role>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| missing_field_error(FieldName::new(field), ALL_FIELDS_REQUIRED))
}

fn map_user_validation_error(error: UserValidationError) -> Error {
    let field = match &error {
        UserValidationError::InvalidEmail => "email",
        UserValidationError::NameLength { field, .. } => *field,
        UserValidationError::BioTooLong { .. } => "bio",
        UserValidationError::UnknownRole(_) => "role",
    };
    invalid_field_error(FieldName::new(field), error.to_string())
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let first_name = required(value.first_name, "firstName")?;
        let last_name = required(value.last_name, "lastName")?;
        let email = required(value.email, "email")?;
        let password = required(value.password, "password")?;
        let password = PlainPassword::new(&password).map_err(|error| {
            invalid_field_error(FieldName::new("password"), error.to_string())
        })?;
        Ok(Self {
            first_name: PersonName::new("firstName", first_name)
                .map_err(map_user_validation_error)?,
            last_name: PersonName::new("lastName", last_name).map_err(map_user_validation_error)?,
            email: EmailAddress::new(email).map_err(map_user_validation_error)?,
            password,
            requested_role: value.role,
        })
    }
}

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = Envelope<AuthBody>),
        (status = 400, description = "Invalid request or duplicate email", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/users/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner())?;
    let account = state.accounts.register(registration).await?;
    Ok(Envelope::success(AuthBody::new(&account.user, account.token))
        .with_message("User registered successfully")
        .created())
}

/// Login payload for `POST /api/users/login`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            value.email.as_deref().unwrap_or_default(),
            value.password.as_deref().unwrap_or_default(),
        )
        .map_err(|error| match error {
            CredentialValidationError::MissingLoginFields => Error::invalid_request(error.to_string()),
            // A malformed address cannot belong to an account.
            CredentialValidationError::InvalidEmail
            | CredentialValidationError::PasswordTooShort { .. } => {
                Error::unauthorized(INVALID_LOGIN)
            }
        })
    }
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = Envelope<AuthBody>),
        (status = 400, description = "Missing credentials", body = ErrorEnvelope),
        (status = 401, description = "Invalid email or password", body = ErrorEnvelope),
        (status = 403, description = "Account deactivated", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let account = state.accounts.login(credentials).await?;
    Ok(Envelope::success(AuthBody::new(&account.user, account.token))
        .with_message("Login successful")
        .ok())
}

/// List accounts, newest first.
#[utoipa::path(
    get,
    path = "/api/users",
    params(PageQuery),
    responses(
        (status = 200, description = "Users", body = Envelope<UserListBody>),
        (status = 400, description = "Invalid pagination", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 403, description = "Forbidden", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    _staff: Authorized<Staff>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let page = query.resolve(USERS_PAGE_POLICY)?;
    let listed = state.account_query.list_users(page).await?;
    Ok(Envelope::success(UserListBody {
        users: listed.items.iter().map(UserBody::from).collect(),
        pagination: PaginationBody::from(listed.pagination),
    })
    .ok())
}

/// The caller's own account.
#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "Profile", body = Envelope<UserBody>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "User not found", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "getProfile"
)]
#[get("/users/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<HttpResponse> {
    let user = state.account_query.profile(caller.user_id()).await?;
    Ok(Envelope::success(UserBody::from(&user)).ok())
}

/// Editable profile fields. Anything else in the body is ignored.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    #[schema(max_length = 500)]
    pub bio: Option<String>,
    pub location: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub occupation: Option<String>,
    pub education: Option<String>,
}

impl TryFrom<UpdateProfileRequest> for ProfileUpdate {
    type Error = Error;

    fn try_from(value: UpdateProfileRequest) -> Result<Self, Self::Error> {
        let first_name = value
            .first_name
            .map(|raw| PersonName::new("firstName", raw))
            .transpose()
            .map_err(map_user_validation_error)?;
        let last_name = value
            .last_name
            .map(|raw| PersonName::new("lastName", raw))
            .transpose()
            .map_err(map_user_validation_error)?;
        let bio = value
            .bio
            .map(Bio::new)
            .transpose()
            .map_err(map_user_validation_error)?;
        Ok(Self {
            first_name,
            last_name,
            phone: value.phone,
            bio,
            location: value.location,
            date_of_birth: value.date_of_birth,
            occupation: value.occupation,
            education: value.education,
        })
    }
}

#[utoipa::path(
    patch,
    path = "/api/users/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = Envelope<UserBody>),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "User not found", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[patch("/users/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<HttpResponse> {
    let update = ProfileUpdate::try_from(payload.into_inner())?;
    let user = state
        .accounts
        .update_profile(caller.user_id(), update)
        .await?;
    Ok(Envelope::success(UserBody::from(&user))
        .with_message("Profile updated successfully")
        .ok())
}

/// Replace the caller's avatar with the raw image in the request body.
#[utoipa::path(
    put,
    path = "/api/users/profile/avatar",
    request_body(
        content = Vec<u8>,
        content_type = "image/png",
        description = "JPEG, PNG, WebP or GIF image, at most 5 MiB"
    ),
    responses(
        (status = 200, description = "Avatar replaced", body = Envelope<UserBody>),
        (status = 400, description = "Missing or unsupported image", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "uploadAvatar"
)]
#[put("/users/profile/avatar")]
pub async fn upload_avatar(
    state: web::Data<HttpState>,
    caller: Authenticated,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let upload = image_upload(MediaKind::Avatar, &req, body)?;
    let user = state
        .accounts
        .replace_avatar(caller.user_id(), upload)
        .await?;
    Ok(Envelope::success(UserBody::from(&user))
        .with_message("Avatar updated successfully")
        .ok())
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    #[schema(min_length = 6)]
    pub new_password: Option<String>,
}

impl TryFrom<ChangePasswordRequest> for PasswordChange {
    type Error = Error;

    fn try_from(value: ChangePasswordRequest) -> Result<Self, Self::Error> {
        let (Some(current), Some(new)) = (
            value.current_password.filter(|raw| !raw.is_empty()),
            value.new_password.filter(|raw| !raw.is_empty()),
        ) else {
            return Err(Error::invalid_request(PASSWORDS_REQUIRED));
        };
        let new_password = PlainPassword::new(&new).map_err(|_| {
            invalid_field_error(
                FieldName::new("newPassword"),
                format!("New password must be at least {PASSWORD_MIN} characters"),
            )
        })?;
        Ok(Self {
            current_password: Zeroizing::new(current),
            new_password,
        })
    }
}

#[utoipa::path(
    patch,
    path = "/api/users/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageEnvelope),
        (status = 400, description = "Missing, short or incorrect password", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "changePassword"
)]
#[patch("/users/change-password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let change = PasswordChange::try_from(payload.into_inner())?;
    state
        .accounts
        .change_password(caller.user_id(), change)
        .await?;
    Ok(MessageEnvelope::new("Password updated successfully").ok())
}

#[utoipa::path(
    delete,
    path = "/api/users/account",
    responses(
        (status = 200, description = "Account deleted", body = MessageEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "User not found", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "deleteAccount"
)]
#[delete("/users/account")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<HttpResponse> {
    state.accounts.delete_account(caller.user_id()).await?;
    Ok(MessageEnvelope::new("Account deleted successfully").ok())
}

/// Aggregate learning statistics for the caller.
#[utoipa::path(
    get,
    path = "/api/users/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = Envelope<DashboardBody>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "getDashboard"
)]
#[get("/users/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<HttpResponse> {
    let summary = state.enrollment_query.dashboard(caller.user_id()).await?;
    Ok(Envelope::success(DashboardBody::from(&summary)).ok())
}
