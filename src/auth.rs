//! Email/password identity provider.
//!
//! Passwords are hashed with argon2; sessions are stateless JWTs carrying
//! the user id and email. Logout is client-side: the token is discarded by
//! the caller, nothing is revoked on the server.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::User;

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("An account with this email already exists")]
    EmailTaken,
    #[error("Password must be at least 6 characters")]
    WeakPassword,
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Identity store unavailable")]
    Store(#[from] sqlx::Error),
    #[error("Password hashing failed")]
    Hashing(String),
    #[error("Session token could not be issued")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Issued session: bearer token plus the identity it belongs to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub email: String,
}

/// The authenticated caller, as recovered from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iat: i64,
    exp: i64,
}

/// Identity provider over the shared SQLite pool.
#[derive(Clone)]
pub struct AuthService {
    pool: SqlitePool,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl AuthService {
    /// Set up the identity tables and key material.
    pub async fn new(
        pool: SqlitePool,
        jwt_secret: &str,
        token_ttl_minutes: i64,
    ) -> Result<Self, AuthError> {
        Self::initialize_schema(&pool).await?;
        Ok(Self {
            pool,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_ttl: Duration::minutes(token_ttl_minutes),
        })
    }

    async fn initialize_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Create an account and issue a session for it.
    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim().to_lowercase();
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        let existing = sqlx::query("SELECT id FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .to_string();

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash,
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)")
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.created_at.timestamp_millis())
            .execute(&self.pool)
            .await?;

        info!("Account registered");
        self.issue_session(&user.id, &user.email)
    }

    /// Verify credentials and issue a session.
    ///
    /// Unknown email and wrong password are indistinguishable to the
    /// caller.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim().to_lowercase();

        let row = sqlx::query("SELECT id, password_hash FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let user_id: String = row.try_get("id")?;
        let password_hash: String = row.try_get("password_hash")?;

        let parsed =
            PasswordHash::new(&password_hash).map_err(|e| AuthError::Hashing(e.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AuthError::InvalidCredentials)?;

        info!("Login succeeded");
        self.issue_session(&user_id, &email)
    }

    /// Decode a bearer token back into the caller it identifies.
    pub fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| AuthError::NotAuthenticated)?;
        Ok(AuthUser {
            id: data.claims.sub,
            email: data.claims.email,
        })
    }

    fn issue_session(&self, user_id: &str, email: &str) -> Result<Session, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding_key)?;

        Ok(Session {
            token,
            user_id: user_id.to_string(),
            email: email.to_string(),
        })
    }
}
