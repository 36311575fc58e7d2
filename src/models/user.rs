//! Caller identity: token claims and account roles

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

use super::permission::NOT_AUTHENTICATED;

/// Account role carried in the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Reader,
    Admin,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Reader => "reader",
            AccountType::Admin => "admin",
        }
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub account_type: AccountType,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    pub fn new(user_id: i32, login: impl Into<String>, account_type: AccountType, valid_for: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: login.into(),
            user_id,
            account_type,
            exp: (now + valid_for).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.account_type == AccountType::Admin
    }
}

/// Whoever issued the current request
#[derive(Debug, Clone)]
pub enum Caller {
    Anonymous,
    User(UserClaims),
}

impl Caller {
    pub fn claims(&self) -> Option<&UserClaims> {
        match self {
            Caller::Anonymous => None,
            Caller::User(claims) => Some(claims),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Caller::User(_))
    }

    pub fn is_admin(&self) -> bool {
        self.claims().map(UserClaims::is_admin).unwrap_or(false)
    }

    /// Claims of an authenticated caller, or the anonymous-caller refusal
    pub fn user(&self) -> Result<&UserClaims, AppError> {
        self.claims()
            .ok_or_else(|| AppError::Authorization(NOT_AUTHENTICATED.to_string()))
    }
}
