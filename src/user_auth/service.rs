use anyhow::{Context, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Postgres, Row};
use utoipa::ToSchema;
use validator::Validate;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user_id as string)
    pub exp: usize,  // Expiration time (as UTC timestamp)
    pub iat: usize,  // Issued at
}

/// User Registration Request
///
/// Registration is gated behind the bank's admin password; the public form
/// is a demo and new users must be provisioned by an operator.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[validate(email)]
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[validate(length(min = 8))]
    #[schema(example = "password123")]
    pub password: String,
    #[validate(length(min = 7, max = 20))]
    #[schema(example = "+15551234567")]
    pub phone_number: String,
    #[schema(example = "12 Main St")]
    pub address: Option<String>,
    /// Operator credential authorizing the registration
    pub admin_password: String,
}

/// User Login Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
}

/// Auth Response (JWT)
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: i64,
    pub name: String,
    pub email: String,
}

/// User profile as returned to the owner
#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfile {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

/// Profile update; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 7, max = 20))]
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Admin verification failed")]
    AdminVerificationFailed,
    #[error("Email or phone number already registered")]
    AlreadyRegistered,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub struct UserAuthService {
    db: Pool<Postgres>,
    jwt_secret: String,
    admin_password: String,
}

impl UserAuthService {
    pub fn new(db: Pool<Postgres>, jwt_secret: String, admin_password: String) -> Self {
        Self {
            db,
            jwt_secret,
            admin_password,
        }
    }

    /// Register a new user
    pub async fn register(&self, req: RegisterRequest) -> Result<i64, AuthError> {
        req.validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        if !self.verify_admin(&req.admin_password) {
            return Err(AuthError::AdminVerificationFailed);
        }

        // 1. Hash password
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Hashing failed: {}", e))?
            .to_string();

        // 2. Insert into DB
        let res = sqlx::query(
            "INSERT INTO users_tb (name, email, password_hash, phone_number, address) \
             VALUES ($1, $2, $3, $4, $5) RETURNING user_id",
        )
        .bind(&req.name)
        .bind(&req.email)
        .bind(&password_hash)
        .bind(&req.phone_number)
        .bind(&req.address)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(row) => Ok(row.get("user_id")),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => {
                Err(AuthError::AlreadyRegistered)
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to insert user").into()),
        }
    }

    /// Login user and issue JWT
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AuthError> {
        // 1. Find user by email
        let user = sqlx::query(
            "SELECT user_id, name, email, password_hash FROM users_tb WHERE email = $1",
        )
        .bind(&req.email)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| anyhow::Error::new(e).context("DB query failed"))?
        .ok_or(AuthError::InvalidCredentials)?;

        let password_hash: String = user.get("password_hash");

        // 2. Verify password
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))?;
        Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let user_id: i64 = user.get("user_id");

        // 3. Generate JWT
        let token = self.issue_token(user_id)?;

        Ok(AuthResponse {
            token,
            user_id,
            name: user.get("name"),
            email: user.get("email"),
        })
    }

    fn issue_token(&self, user_id: i64) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(Duration::hours(24))
            .context("valid timestamp")?
            .timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .context("Failed to generate token")
    }

    /// Verify JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Check the operator credential gating registration
    pub fn verify_admin(&self, candidate: &str) -> bool {
        !self.admin_password.is_empty() && candidate == self.admin_password
    }

    pub async fn get_profile(&self, user_id: i64) -> Result<Option<UserProfile>> {
        let row = sqlx::query(
            "SELECT user_id, name, email, phone_number, address FROM users_tb WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("DB query failed")?;

        Ok(row.map(|r| UserProfile {
            user_id: r.get("user_id"),
            name: r.get("name"),
            email: r.get("email"),
            phone_number: r.get("phone_number"),
            address: r.get("address"),
        }))
    }

    /// Apply a partial profile update and return the fresh profile
    pub async fn update_profile(
        &self,
        user_id: i64,
        req: UpdateProfileRequest,
    ) -> Result<Option<UserProfile>, AuthError> {
        req.validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let res = sqlx::query(
            "UPDATE users_tb SET \
               name = COALESCE($1, name), \
               phone_number = COALESCE($2, phone_number), \
               address = COALESCE($3, address), \
               updated_at = now() \
             WHERE user_id = $4",
        )
        .bind(&req.name)
        .bind(&req.phone_number)
        .bind(&req.address)
        .bind(user_id)
        .execute(&self.db)
        .await;

        match res {
            Ok(done) if done.rows_affected() == 0 => Ok(None),
            Ok(_) => Ok(self.get_profile(user_id).await?),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => {
                Err(AuthError::AlreadyRegistered)
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to update profile").into()),
        }
    }
}
