use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::auth::{
        Claims, ForgotPasswordRequest, LoginRequest, LoginResponse, PublicUser, RegisterRequest,
        ResetPasswordRequest, VerifyCodeRequest,
    },
    error::{AppError, AppResult},
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

const RESET_CODE_TTL_MINUTES: i64 = 15;

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<PublicUser>> {
    let RegisterRequest {
        name,
        email,
        password,
    } = payload;

    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(AppError::BadRequest("All fields are required".into()));
    }
    let email = email.trim().to_lowercase();

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("User already exists".into()));
    }

    let password_hash = hash_password(&password)?;
    let id = Uuid::new_v4();

    let user: User = sqlx::query_as(
        "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(id)
    .bind(name.trim())
    .bind(email.as_str())
    .bind(password_hash)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = audit::record(
        &state.pool,
        Some(user.id),
        AuditAction::UserRegister,
        serde_json::json!({ "user_id": user.id }),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "User registered successfully",
        public_user(&user),
        None,
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let user = authenticate(state, &payload.email, &payload.password).await?;
    let token = issue_token(&user)?;

    if let Err(err) = audit::record(
        &state.pool,
        Some(user.id),
        AuditAction::UserLogin,
        serde_json::json!({ "user_id": user.id }),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Login successful",
        LoginResponse {
            token,
            user: public_user(&user),
        },
        Some(Meta::empty()),
    ))
}

/// Verify credentials against the users table. Same error for a missing user
/// and a wrong password.
pub async fn authenticate(state: &AppState, email: &str, password: &str) -> AppResult<User> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email.trim().to_lowercase())
        .fetch_optional(&state.pool)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::Unauthorized),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Unauthorized);
    }

    Ok(user)
}

pub fn issue_token(user: &User) -> AppResult<String> {
    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.clone(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    Ok(token)
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub async fn forgot_password(
    state: &AppState,
    payload: ForgotPasswordRequest,
) -> AppResult<ApiResponse<()>> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".into()));
    }

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let code = generate_code();
    let expires_at = Utc::now() + Duration::minutes(RESET_CODE_TTL_MINUTES);

    sqlx::query("UPDATE users SET reset_code = $1, reset_code_expires_at = $2 WHERE id = $3")
        .bind(code.as_str())
        .bind(expires_at)
        .bind(user.id)
        .execute(&state.pool)
        .await?;

    state
        .mailer
        .send(
            &user.email,
            "Password Reset Code",
            &format!("Your verification code is: {code}"),
        )
        .await
        .map_err(AppError::Internal)?;

    Ok(ApiResponse::message("Verification code sent"))
}

pub async fn verify_code(
    state: &AppState,
    payload: VerifyCodeRequest,
) -> AppResult<ApiResponse<()>> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.code.is_empty() {
        return Err(AppError::BadRequest("Email and code are required".into()));
    }

    check_reset_code(state, &email, &payload.code).await?;
    Ok(ApiResponse::message(
        "Code verified. Proceed to reset password.",
    ))
}

pub async fn reset_password(
    state: &AppState,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<()>> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.code.is_empty() || payload.new_password.is_empty() {
        return Err(AppError::BadRequest(
            "Email, code and new password are required".into(),
        ));
    }

    let user = check_reset_code(state, &email, &payload.code).await?;
    let password_hash = hash_password(payload.new_password.trim())?;

    sqlx::query(
        "UPDATE users SET password_hash = $1, reset_code = NULL, reset_code_expires_at = NULL
         WHERE id = $2",
    )
    .bind(password_hash)
    .bind(user.id)
    .execute(&state.pool)
    .await?;

    Ok(ApiResponse::message("Password reset successfully"))
}

/// Look up the user and validate the stored code against its expiry window.
async fn check_reset_code(state: &AppState, email: &str, code: &str) -> AppResult<User> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(&state.pool)
        .await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let valid = match (&user.reset_code, user.reset_code_expires_at) {
        (Some(stored), Some(expires_at)) => stored == code && expires_at > Utc::now(),
        _ => false,
    };
    if !valid {
        return Err(AppError::BadRequest("Invalid or expired code".into()));
    }

    Ok(user)
}

fn generate_code() -> String {
    // Six digits, derived from OS randomness.
    let n = Uuid::new_v4().as_u128() % 900_000;
    format!("{}", 100_000 + n)
}

pub fn public_user(user: &User) -> PublicUser {
    PublicUser {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role.clone(),
    }
}
