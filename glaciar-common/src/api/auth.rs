//! Login credentials and roles
//!
//! Passwords are stored as SHA-256 over a per-user random salt followed by
//! the password, hex encoded. Accounts are created from the command line;
//! there is no self-service registration.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::info;

/// Authentication error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiAuthError {
    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("Rol desconocido: {0}")]
    UnknownRole(String),

    #[error("El nombre de usuario y la contraseña no pueden estar vacíos")]
    EmptyCredentials,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for ApiAuthError {
    fn from(e: sqlx::Error) -> Self {
        ApiAuthError::DatabaseError(e.to_string())
    }
}

/// Capability level of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full read and write access
    Admin,
    /// Listing, search, statistics and export only
    Reader,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Reader => "reader",
        }
    }

    /// True when the role may create, modify, delete or import projects
    pub fn can_write(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ApiAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "reader" | "lector" => Ok(Role::Reader),
            _ => Err(ApiAuthError::UnknownRole(s.to_string())),
        }
    }
}

/// An authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub username: String,
    pub role: Role,
}

/// Hex SHA-256 of `salt` followed by `password`
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Whether `password` hashes to `stored_hash`, compared in constant time
pub fn password_matches(salt: &str, password: &str, stored_hash: &str) -> bool {
    hash_password(salt, password)
        .as_bytes()
        .ct_eq(stored_hash.as_bytes())
        .into()
}

/// 16 random bytes, hex encoded
pub fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Create an account, or replace the password and role of an existing one
pub async fn upsert_user(
    db: &SqlitePool,
    username: &str,
    password: &str,
    role: Role,
) -> Result<(), ApiAuthError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(ApiAuthError::EmptyCredentials);
    }

    let salt = generate_salt();
    let hash = hash_password(&salt, password);

    sqlx::query(
        r#"
        INSERT INTO users (guid, username, password_hash, password_salt, role)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(username) DO UPDATE SET
            password_hash = excluded.password_hash,
            password_salt = excluded.password_salt,
            role = excluded.role,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(username)
    .bind(&hash)
    .bind(&salt)
    .bind(role.as_str())
    .execute(db)
    .await?;

    info!("Saved user '{}' with role {}", username, role);
    Ok(())
}

/// Check a username and password against the users table
pub async fn verify_credentials(
    db: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<User, ApiAuthError> {
    let record: Option<(String, String, String)> = sqlx::query_as(
        "SELECT password_hash, password_salt, role FROM users WHERE username = ?",
    )
    .bind(username.trim())
    .fetch_optional(db)
    .await?;

    let Some((stored_hash, salt, role)) = record else {
        return Err(ApiAuthError::InvalidCredentials);
    };

    if !password_matches(&salt, password, &stored_hash) {
        return Err(ApiAuthError::InvalidCredentials);
    }

    Ok(User {
        username: username.trim().to_string(),
        role: role.parse()?,
    })
}

pub async fn count_users(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await?;
    Ok(count)
}
