/// Email/password accounts and bearer sessions, stored in Redis.
///
/// Key schema:
/// - `cookify:v1:account:{email}` — JSON `AccountRecord` (email lowercased)
/// - `cookify:v1:session:{token}` — JSON `Session`, expiring with the TTL
///
/// Unlike the favorites cloud store, auth does not degrade silently: with
/// Redis down the operations fail with `CloudUnavailable` and the caller
/// keeps browsing anonymously.
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use cookify_common::error::CommonError;
use cookify_common::redis::RedisStore;
use cookify_common::token::new_token;

use crate::error::AppError;

const KEY_PREFIX: &str = "cookify:v1:";

fn account_key(email: &str) -> String {
    format!("{KEY_PREFIX}account:{email}")
}

fn session_key(token: &str) -> String {
    format!("{KEY_PREFIX}session:{token}")
}

#[derive(Debug, Serialize, Deserialize)]
struct AccountRecord {
    uid: String,
    email: String,
    display_name: Option<String>,
    password_digest: String,
    salt: String,
}

/// An authenticated session, as handed to the client and stored under its
/// bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Clone)]
pub struct AccountStore {
    redis: RedisStore,
    ttl_secs: u64,
}

impl AccountStore {
    pub fn new(redis: RedisStore, ttl_secs: u64) -> Self {
        Self { redis, ttl_secs }
    }

    /// Create an account and sign it in.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Session, AppError> {
        validate_credentials(email, password)?;
        if !self.redis.is_available().await {
            return Err(AppError::CloudUnavailable);
        }

        let email = email.trim().to_lowercase();
        let display_name = display_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let salt = new_token();
        let record = AccountRecord {
            uid: new_token(),
            email: email.clone(),
            display_name,
            password_digest: digest(password, &salt),
            salt,
        };
        let json = serde_json::to_string(&record).map_err(CommonError::from)?;
        // SET NX is the arbiter: a concurrent registration for the same
        // email loses here instead of silently overwriting the winner
        match self.redis.set_if_absent(&account_key(&email), &json).await {
            Some(true) => {}
            Some(false) => return Err(AppError::EmailTaken(email)),
            None => return Err(AppError::CloudUnavailable),
        }

        self.create_session(&record).await
    }

    /// Verify credentials and open a new session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        validate_credentials(email, password)?;
        if !self.redis.is_available().await {
            return Err(AppError::CloudUnavailable);
        }

        let email = email.trim().to_lowercase();
        let json = self
            .redis
            .get(&account_key(&email))
            .await
            .ok_or(AppError::InvalidCredentials)?;
        let record: AccountRecord = serde_json::from_str(&json).map_err(CommonError::from)?;

        if digest(password, &record.salt) != record.password_digest {
            return Err(AppError::InvalidCredentials);
        }
        self.create_session(&record).await
    }

    /// Look a bearer token up. `None` when unknown, expired or Redis is down.
    pub async fn resolve(&self, token: &str) -> Option<Session> {
        let json = self.redis.get(&session_key(token)).await?;
        serde_json::from_str(&json).ok()
    }

    /// Drop a session. Best-effort; an already-gone token is fine.
    pub async fn logout(&self, token: &str) {
        self.redis.delete(&session_key(token)).await;
    }

    async fn create_session(&self, record: &AccountRecord) -> Result<Session, AppError> {
        let session = Session {
            token: new_token(),
            uid: record.uid.clone(),
            email: record.email.clone(),
            display_name: record.display_name.clone(),
        };
        let json = serde_json::to_string(&session).map_err(CommonError::from)?;
        if !self
            .redis
            .set_with_ttl(&session_key(&session.token), &json, self.ttl_secs)
            .await
        {
            return Err(AppError::CloudUnavailable);
        }
        Ok(session)
    }
}

/// Shared validation for register and login. Mirrors the app rules: both
/// fields required, passwords at least 6 characters.
fn validate_credentials(email: &str, password: &str) -> Result<(), AppError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::InvalidInput(
            "email and password are required".to_string(),
        ));
    }
    if password.len() < 6 {
        return Err(AppError::InvalidInput(
            "password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}

fn digest(password: &str, salt: &str) -> String {
    let mut h = Sha256::new();
    h.update(salt.as_bytes());
    h.update(b"|");
    h.update(password.as_bytes());
    format!("{:x}", h.finalize())
}
