use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub avatar: Option<String>,
    pub bio: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Self, DomainError> {
        let email = normalize_email(&self.email)?;
        let name = normalize_name(&self.name)?;
        let password_len = self.password.chars().count();
        if password_len < 8 || password_len > 128 {
            return Err(DomainError::Validation {
                field: "password",
                message: "must be 8..128 chars",
            });
        }
        Ok(Self {
            email,
            password: self.password,
            name,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialLoginRequest {
    pub provider: String,
    pub email: String,
    pub name: String,
}

impl SocialLoginRequest {
    pub fn validate(self) -> Result<Self, DomainError> {
        let provider = self.provider.trim().to_lowercase();
        if provider.is_empty() {
            return Err(DomainError::Validation {
                field: "provider",
                message: "must not be empty",
            });
        }
        Ok(Self {
            provider,
            email: normalize_email(&self.email)?,
            name: normalize_name(&self.name)?,
        })
    }
}

/// Partial profile edit; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

pub(crate) fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must be a valid email",
        });
    }
    Ok(email)
}

pub(crate) fn normalize_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() || name.len() > 64 {
        return Err(DomainError::Validation {
            field: "name",
            message: "must be 1..64 chars",
        });
    }
    Ok(name.to_string())
}
