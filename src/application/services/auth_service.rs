//! Account registration, login sessions and session resolution.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use std::sync::Arc;
use tracing::{debug, info, warn};
use validator::ValidateEmail;

use crate::domain::entities::{NewSession, NewUser, OwnerContext, User};
use crate::domain::repositories::{SessionRepository, UserRepository};
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session_id";

/// Session lifetime.
pub const SESSION_TTL_DAYS: i64 = 30;

const SESSION_TOKEN_BYTES: usize = 32;
const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 50;
const MIN_PASSWORD_LEN: usize = 6;

/// Registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// A freshly issued login session. `token` is only ever held by the client.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub owner: OwnerContext,
}

/// Optional client details recorded with a session.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Hashes a password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal("Password hashing failed", json!({ "reason": e.to_string() })))
}

/// Verifies a password against a stored PHC string. Malformed hashes never verify.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Validates registration fields and returns normalized username and email.
pub fn validate_registration(input: &Registration) -> Result<(String, String), AppError> {
    let username = input.username.trim();
    let email = input.email.trim().to_lowercase();

    let username_len = username.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&username_len) {
        return Err(AppError::bad_request(
            "Invalid username",
            json!({ "field": "username", "reason": format!("must be {MIN_USERNAME_LEN} to {MAX_USERNAME_LEN} characters") }),
        ));
    }

    if !email.validate_email() {
        return Err(AppError::bad_request(
            "Invalid email",
            json!({ "field": "email", "reason": "not a valid email address" }),
        ));
    }

    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(
            "Invalid password",
            json!({ "field": "password", "reason": format!("must be at least {MIN_PASSWORD_LEN} characters") }),
        ));
    }

    Ok((username.to_string(), email))
}

/// Service for dashboard accounts and cookie/bearer sessions.
///
/// Session tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`)
/// before storage and comparison. An attacker with read-only access to the
/// database cannot turn a stored hash back into a usable session.
pub struct AuthService<U: UserRepository, S: SessionRepository> {
    users: Arc<U>,
    sessions: Arc<S>,
    signing_secret: String,
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    pub fn new(users: Arc<U>, sessions: Arc<S>, signing_secret: String) -> Self {
        Self {
            users,
            sessions,
            signing_secret,
        }
    }

    /// Hashes a raw session token with HMAC-SHA256 using the server signing secret.
    ///
    /// Returns a 64-character lowercase hex-encoded MAC.
    fn hash_token(&self, token: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn generate_session_token() -> Result<String, AppError> {
        let mut buffer = [0u8; SESSION_TOKEN_BYTES];
        getrandom::fill(&mut buffer).map_err(|e| {
            AppError::internal("Random source unavailable", json!({ "reason": e.to_string() }))
        })?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for invalid fields.
    /// Returns [`AppError::Conflict`] if the username or email is taken.
    pub async fn register(&self, input: Registration) -> Result<User, AppError> {
        let (username, email) = validate_registration(&input)?;

        if self.users.exists(&username, &email).await? {
            return Err(AppError::conflict(
                "Username or email already registered",
                json!({ "username": username }),
            ));
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .users
            .create(NewUser {
                username,
                email,
                password_hash,
            })
            .await?;

        info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Verifies credentials and opens a session.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for an unknown email or wrong password;
    /// the two cases are indistinguishable to the caller.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        client: ClientInfo,
    ) -> Result<IssuedSession, AppError> {
        let email = email.trim().to_lowercase();
        let user = self.users.find_by_email(&email).await?;

        let Some(user) = user.filter(|u| verify_password(password, &u.password_hash)) else {
            warn!("Failed login attempt");
            return Err(AppError::unauthorized(
                "Invalid email or password",
                json!({}),
            ));
        };

        let token = Self::generate_session_token()?;
        let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);

        self.sessions
            .create(NewSession {
                user_id: user.id,
                token_hash: self.hash_token(&token),
                ip_address: client.ip_address,
                user_agent: client.user_agent,
                expires_at,
            })
            .await?;

        info!(user_id = user.id, "User logged in");
        Ok(IssuedSession {
            token,
            expires_at,
            owner: OwnerContext::from(&user),
        })
    }

    /// Resolves a raw session token to its owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is unknown or expired.
    pub async fn resolve(&self, token: &str) -> Result<OwnerContext, AppError> {
        if token.is_empty() {
            return Err(unauthorized());
        }

        let token_hash = self.hash_token(token);
        match self.sessions.find_active(&token_hash).await? {
            Some((session, user)) if !session.is_expired_at(Utc::now()) => {
                Ok(OwnerContext::from(&user))
            }
            _ => {
                debug!("Session token rejected");
                Err(unauthorized())
            }
        }
    }

    /// Ends a session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        let deleted = self.sessions.delete(&self.hash_token(token)).await?;
        debug!(deleted, "Session closed");
        Ok(())
    }

    /// Deletes expired sessions and returns how many were removed.
    pub async fn purge_expired_sessions(&self) -> Result<u64, AppError> {
        self.sessions.purge_expired().await
    }
}

fn unauthorized() -> AppError {
    AppError::unauthorized(
        "Unauthorized",
        json!({ "reason": "Invalid or expired session" }),
    )
}
