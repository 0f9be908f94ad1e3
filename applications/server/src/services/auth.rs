/// Authentication service - registration, sign-in, JWT and password handling
use crate::error::{Result, ServerError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tunebox_core::{NewUser, TuneboxError, User, UserId, UserStore};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Clone)]
pub struct AuthService {
    secret: String,
    access_token_expiration: Duration,
    refresh_token_expiration: Duration,
    bcrypt_cost: u32,
    // Verified against when the email is unknown so sign-in timing stays uniform
    dummy_hash: Arc<OnceLock<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
    pub token_type: TokenType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Tokens handed out on a successful sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Sign-up input, checked before anything is hashed or stored
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    fn validated(self) -> Result<Self> {
        let username = self.username.trim().to_string();
        let email = self.email.trim().to_string();

        let name_len = username.chars().count();
        if !(3..=32).contains(&name_len) {
            return Err(ServerError::BadRequest(
                "Username must be between 3 and 32 characters".to_string(),
            ));
        }
        if !email.contains('@') {
            return Err(ServerError::BadRequest("Invalid email address".to_string()));
        }
        if self.password.is_empty() {
            return Err(ServerError::BadRequest("Password is required".to_string()));
        }

        Ok(Self {
            username,
            email,
            password: self.password,
        })
    }
}

impl AuthService {
    pub fn new(
        secret: String,
        access_expiration_hours: u64,
        refresh_expiration_days: u64,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            secret,
            access_token_expiration: Duration::hours(access_expiration_hours as i64),
            refresh_token_expiration: Duration::days(refresh_expiration_days as i64),
            bcrypt_cost,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Register a new user
    ///
    /// Username or email collisions surface as `Conflict`, whether caught by
    /// the pre-check or by the store's unique constraint.
    pub async fn register(&self, users: &dyn UserStore, registration: Registration) -> Result<User> {
        let Registration {
            username,
            email,
            password,
        } = registration.validated()?;

        if users.username_or_email_taken(&username, &email).await? {
            return Err(ServerError::Conflict("User already exists".to_string()));
        }

        let password_hash = self.hash_password_blocking(password).await?;

        let user = users
            .create_user(NewUser {
                username,
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                TuneboxError::Duplicate(_) => {
                    ServerError::Conflict("User already exists".to_string())
                }
                other => ServerError::from(other),
            })?;

        tracing::info!(user_id = %user.id, "Registered user {}", user.username);

        Ok(user)
    }

    /// Check an email/password pair and issue tokens
    ///
    /// Unknown email and wrong password fail with the same message.
    pub async fn authenticate(
        &self,
        users: &dyn UserStore,
        email: &str,
        password: &str,
    ) -> Result<TokenPair> {
        let credentials = users.find_credentials_by_email(email.trim()).await?;

        let (user_id, hash) = match credentials {
            Some(creds) => (Some(creds.user.id), creds.password_hash),
            None => (None, self.dummy_hash()?),
        };

        let verified = self
            .verify_password_blocking(password.to_string(), hash)
            .await?;

        match user_id {
            Some(user_id) if verified => self.issue_tokens(&user_id),
            _ => {
                tracing::warn!("Rejected sign-in attempt");
                Err(ServerError::Auth(INVALID_CREDENTIALS.to_string()))
            }
        }
    }

    /// Resolve a bearer token to the acting user
    pub fn validate_token(&self, token: &str) -> Result<UserId> {
        self.verify_access_token(token)
    }

    /// Exchange a refresh token for a new access token
    pub fn refresh(&self, refresh_token: &str) -> Result<String> {
        let user_id = self.verify_refresh_token(refresh_token)?;
        self.create_access_token(&user_id)
    }

    /// Hash a password using bcrypt
    pub fn hash_password(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.bcrypt_cost).map_err(ServerError::from)
    }

    /// Verify a password against a hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash).map_err(ServerError::from)
    }

    /// Create an access token
    pub fn create_access_token(&self, user_id: &UserId) -> Result<String> {
        self.create_token(user_id, TokenType::Access, self.access_token_expiration)
    }

    /// Create a refresh token
    pub fn create_refresh_token(&self, user_id: &UserId) -> Result<String> {
        self.create_token(user_id, TokenType::Refresh, self.refresh_token_expiration)
    }

    /// Verify and decode a token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Verify that a token is an access token
    pub fn verify_access_token(&self, token: &str) -> Result<UserId> {
        let claims = self.verify_token(token)?;
        if claims.token_type != TokenType::Access {
            return Err(ServerError::Auth("Invalid token type".to_string()));
        }
        Ok(UserId::new(claims.sub))
    }

    /// Verify that a token is a refresh token
    pub fn verify_refresh_token(&self, token: &str) -> Result<UserId> {
        let claims = self.verify_token(token)?;
        if claims.token_type != TokenType::Refresh {
            return Err(ServerError::Auth("Invalid token type".to_string()));
        }
        Ok(UserId::new(claims.sub))
    }

    fn issue_tokens(&self, user_id: &UserId) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.create_access_token(user_id)?,
            refresh_token: self.create_refresh_token(user_id)?,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiration.num_seconds(),
        })
    }

    fn create_token(
        &self,
        user_id: &UserId,
        token_type: TokenType,
        expiration: Duration,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + expiration;

        let claims = Claims {
            sub: user_id.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type,
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &encoding_key).map_err(ServerError::from)
    }

    fn dummy_hash(&self) -> Result<String> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash.clone());
        }
        let hash = self.hash_password("tunebox-timing-equalizer")?;
        Ok(self.dummy_hash.get_or_init(|| hash).clone())
    }

    // bcrypt is CPU-bound; keep it off the async workers
    async fn hash_password_blocking(&self, password: String) -> Result<String> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| ServerError::Internal(format!("Hashing task failed: {e}")))?
            .map_err(ServerError::from)
    }

    async fn verify_password_blocking(&self, password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| ServerError::Internal(format!("Hashing task failed: {e}")))?
            .map_err(ServerError::from)
    }
}
