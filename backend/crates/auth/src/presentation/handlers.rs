//! HTTP Handlers

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, Query, State};
use axum::{Json, http::StatusCode};
use kernel::response::ApiResponse;

use crate::application::config::IdentityConfig;
use crate::application::notification::Notifier;
use crate::application::{
    LoginInput, LoginUseCase, PasswordResetUseCase, ProfileUseCase, RegisterInput,
    RegisterUseCase, TwoFactorUseCase, UpdateProfileInput, VerifyEmailUseCase,
};
use crate::domain::repository::UserDirectory;
use crate::domain::token::TokenCodec;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult, FieldErrors};
use crate::presentation::dto::{
    ChangeRoleRequest, EmailRequest, EnableTwoFactorRequest, LoginRequest, LoginResponse,
    RegisterRequest, ResetPasswordRequest, TokenQuery, TokenRequest, TwoFactorResponse,
    UpdateUserRequest, UserResponse,
};
use crate::presentation::extract::JsonBody;
use crate::presentation::middleware::AuthenticatedUser;

/// Shared state for identity handlers
pub struct AuthAppState<R>
where
    R: UserDirectory + Send + Sync + 'static,
{
    pub users: Arc<R>,
    pub codec: Arc<TokenCodec>,
    pub notifier: Arc<dyn Notifier>,
    pub config: Arc<IdentityConfig>,
}

// Manual impl: the directory itself need not be Clone.
impl<R> Clone for AuthAppState<R>
where
    R: UserDirectory + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            codec: self.codec.clone(),
            notifier: self.notifier.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R> AuthAppState<R>
where
    R: UserDirectory + Send + Sync + 'static,
{
    fn verify_email(&self) -> VerifyEmailUseCase<R> {
        VerifyEmailUseCase::new(
            self.users.clone(),
            self.codec.clone(),
            self.notifier.clone(),
            self.config.clone(),
        )
    }

    fn password_reset(&self) -> PasswordResetUseCase<R> {
        PasswordResetUseCase::new(
            self.users.clone(),
            self.codec.clone(),
            self.notifier.clone(),
            self.config.clone(),
        )
    }

    fn profile(&self) -> ProfileUseCase<R> {
        ProfileUseCase::new(self.users.clone(), self.codec.clock(), self.config.clone())
    }

    fn two_factor(&self) -> TwoFactorUseCase<R> {
        TwoFactorUseCase::new(self.users.clone(), self.codec.clock(), self.config.clone())
    }
}

// ============================================================================
// Register / Login
// ============================================================================

/// POST /api/users/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> AuthResult<(StatusCode, ApiResponse<UserResponse>)>
where
    R: UserDirectory + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.users.clone(),
        state.codec.clone(),
        state.notifier.clone(),
        state.config.clone(),
    );

    let user = use_case
        .execute(RegisterInput {
            user_name: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(
            "User registered successfully. Please check your email for verification.",
            UserResponse::from(&user),
        ),
    ))
}

/// POST /api/users/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AuthResult<ApiResponse<LoginResponse>>
where
    R: UserDirectory + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.users.clone(), state.codec.clone(), state.config.clone());

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(ApiResponse::ok(
        "Login success",
        LoginResponse {
            token: output.token,
            expires_at: output.expires_at,
            user: UserResponse::from(&output.user),
        },
    ))
}

// ============================================================================
// Email verification
// ============================================================================

/// GET /api/users/verify-email?token=
pub async fn verify_email_link<R>(
    State(state): State<AuthAppState<R>>,
    Query(query): Query<TokenQuery>,
) -> AuthResult<ApiResponse<()>>
where
    R: UserDirectory + Send + Sync + 'static,
{
    let token = query
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| required("token", "Token is required"))?;

    state.verify_email().verify(&token).await?;
    Ok(ApiResponse::message_only("Email verified successfully"))
}

/// POST /api/users/verify-email
pub async fn verify_email<R>(
    State(state): State<AuthAppState<R>>,
    JsonBody(req): JsonBody<TokenRequest>,
) -> AuthResult<ApiResponse<()>>
where
    R: UserDirectory + Send + Sync + 'static,
{
    if req.token.is_empty() {
        return Err(required("token", "Token is required"));
    }

    state.verify_email().verify(&req.token).await?;
    Ok(ApiResponse::message_only("Email verified successfully"))
}

/// POST /api/users/resend-email
pub async fn resend_email<R>(
    State(state): State<AuthAppState<R>>,
    JsonBody(req): JsonBody<EmailRequest>,
) -> AuthResult<ApiResponse<()>>
where
    R: UserDirectory + Send + Sync + 'static,
{
    if req.email.trim().is_empty() {
        return Err(required("email", "Email is required"));
    }

    state.verify_email().resend(&req.email).await?;
    Ok(ApiResponse::message_only("Email verification sent successfully"))
}

// ============================================================================
// Password reset
// ============================================================================

/// POST /api/users/auth/forgot-password
pub async fn forgot_password<R>(
    State(state): State<AuthAppState<R>>,
    JsonBody(req): JsonBody<EmailRequest>,
) -> AuthResult<ApiResponse<()>>
where
    R: UserDirectory + Send + Sync + 'static,
{
    state.password_reset().request(&req.email).await?;
    Ok(ApiResponse::message_only(
        "If the email is registered, a password reset link has been sent",
    ))
}

/// POST /api/users/auth/validate-reset-token
pub async fn validate_reset_token<R>(
    State(state): State<AuthAppState<R>>,
    JsonBody(req): JsonBody<TokenRequest>,
) -> AuthResult<ApiResponse<()>>
where
    R: UserDirectory + Send + Sync + 'static,
{
    state.password_reset().validate(&req.token).await?;
    Ok(ApiResponse::message_only("Token valid"))
}

/// POST /api/users/auth/reset-password
pub async fn reset_password<R>(
    State(state): State<AuthAppState<R>>,
    JsonBody(req): JsonBody<ResetPasswordRequest>,
) -> AuthResult<ApiResponse<()>>
where
    R: UserDirectory + Send + Sync + 'static,
{
    state
        .password_reset()
        .reset(&req.token, req.new_password)
        .await?;
    Ok(ApiResponse::message_only(
        "Your password has been changed, please login with your new password",
    ))
}

// ============================================================================
// Authenticated
// ============================================================================

/// GET /api/users/me
pub async fn current_user<R>(
    State(state): State<AuthAppState<R>>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> AuthResult<ApiResponse<UserResponse>>
where
    R: UserDirectory + Send + Sync + 'static,
{
    let user = state.profile().current(&auth.user_id).await?;
    Ok(ApiResponse::ok("User found", UserResponse::from(&user)))
}

/// PUT /api/users/{id}
pub async fn update_user<R>(
    State(state): State<AuthAppState<R>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> AuthResult<ApiResponse<UserResponse>>
where
    R: UserDirectory + Send + Sync + 'static,
{
    let target = parse_user_id(&id)?;
    let user = state
        .profile()
        .update(
            &auth.user_id,
            &target,
            UpdateProfileInput {
                user_name: req.username,
                email: req.email,
            },
        )
        .await?;

    Ok(ApiResponse::ok("User updated successfully", UserResponse::from(&user)))
}

/// PUT /api/users/{id}/role
pub async fn change_role<R>(
    State(state): State<AuthAppState<R>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    req: Result<JsonBody<ChangeRoleRequest>, AuthError>,
) -> AuthResult<ApiResponse<()>>
where
    R: UserDirectory + Send + Sync + 'static,
{
    let profile = state.profile();
    let parsed = req.and_then(|JsonBody(req)| Ok((parse_user_id(&id)?, req)));
    let (target, req) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => {
            // Non-admins see NotAuthorized whatever the path or body held.
            profile.require_admin(&auth.user_id).await?;
            return Err(err);
        }
    };

    profile.change_role(&auth.user_id, &target, &req.role).await?;
    Ok(ApiResponse::message_only("User role changed successfully"))
}

/// DELETE /api/users/{id}
pub async fn delete_user<R>(
    State(state): State<AuthAppState<R>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AuthResult<ApiResponse<()>>
where
    R: UserDirectory + Send + Sync + 'static,
{
    let target = parse_user_id(&id)?;
    state.profile().delete(&auth.user_id, &target).await?;
    Ok(ApiResponse::message_only("User deleted successfully"))
}

/// POST /api/users/{id}/2fa/enable
pub async fn enable_two_factor<R>(
    State(state): State<AuthAppState<R>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    req: Result<Option<Json<EnableTwoFactorRequest>>, JsonRejection>,
) -> AuthResult<ApiResponse<TwoFactorResponse>>
where
    R: UserDirectory + Send + Sync + 'static,
{
    let target = parse_user_id(&id)?;
    // The body is optional; when present it must be well formed.
    let secret = req?.and_then(|Json(r)| r.secret);

    let enabled = state
        .two_factor()
        .enable(&auth.user_id, &target, secret)
        .await?;

    Ok(ApiResponse::ok(
        "Two-factor authentication enabled",
        TwoFactorResponse {
            secret: enabled.secret,
            otpauth_url: enabled.otpauth_url,
        },
    ))
}

/// POST /api/users/{id}/2fa/disable
pub async fn disable_two_factor<R>(
    State(state): State<AuthAppState<R>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AuthResult<ApiResponse<()>>
where
    R: UserDirectory + Send + Sync + 'static,
{
    let target = parse_user_id(&id)?;
    state.two_factor().disable(&auth.user_id, &target).await?;
    Ok(ApiResponse::message_only("Two-factor authentication disabled"))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_user_id(raw: &str) -> AuthResult<UserId> {
    UserId::from_str(raw).map_err(|_| required("id", "Invalid user id"))
}

fn required(field: &'static str, message: &str) -> AuthError {
    AuthError::Validation(FieldErrors::from([(field, message.to_string())]))
}
