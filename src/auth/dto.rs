use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::Account;
use crate::error::FieldErrors;

const MAX_USERNAME_LEN: usize = 150;

/// Request body for registration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub university: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl RegisterRequest {
    /// Trims and lower-cases where appropriate, then checks every field.
    pub fn normalize(mut self) -> Result<Self, FieldErrors> {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.university = self.university.trim().to_string();
        self.phone_number = self
            .phone_number
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let mut errors = FieldErrors::new();
        if self.username.is_empty() {
            errors.add("username", "This field may not be blank.");
        } else if self.username.chars().count() > MAX_USERNAME_LEN {
            errors.add("username", "Ensure this field has no more than 150 characters.");
        }
        if !is_valid_email(&self.email) {
            errors.add("email", "Enter a valid email address.");
        }
        if self.password.is_empty() {
            errors.add("password", "This field may not be blank.");
        }
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(errors)
        }
    }
}

/// Request body for `/token` and `/signin`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub access: String,
}

/// Profile returned to the owner on login.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub university: String,
    pub phone_number: Option<String>,
}

impl From<&Account> for PublicUser {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id,
            username: a.username.clone(),
            email: a.email.clone(),
            university: a.university.clone(),
            phone_number: a.phone_number.clone(),
        }
    }
}

/// Entry of the `/users` directory.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<Account> for UserSummary {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            username: a.username,
            email: a.email,
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}
