//! Password hashing and opaque session tokens.
//!
//! The store trusts `AuthToken.user.id` as the acting identity once the
//! caller has checked `is_valid`; how tokens travel is the caller's concern.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::user::User;

/// Hash verified when a login targets an unknown email, so both paths cost
/// roughly the same.
pub(crate) const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionIssuer {
    ttl_seconds: i64,
}

impl SessionIssuer {
    pub fn new(ttl_seconds: i64) -> Self {
        Self { ttl_seconds }
    }

    pub fn issue(&self, user: User) -> AuthToken {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        let token = bytes.iter().map(|b| format!("{b:02x}")).collect();
        AuthToken {
            user,
            token,
            expires_at: Utc::now() + Duration::seconds(self.ttl_seconds),
        }
    }
}

pub fn hash_password(raw_password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = argon2()?
        .hash_password(raw_password.as_bytes(), &salt)
        .map_err(|err| DomainError::Unexpected(err.to_string()))?;
    Ok(password_hash.to_string())
}

pub fn verify_password(raw_password: &str, password_hash: &str) -> Result<(), DomainError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|err| DomainError::Unexpected(err.to_string()))?;
    argon2()?
        .verify_password(raw_password.as_bytes(), &parsed_hash)
        .map_err(|err| match err {
            PasswordHashError::Password => DomainError::InvalidCredentials,
            _ => DomainError::Unexpected(err.to_string()),
        })?;

    Ok(())
}

fn argon2() -> Result<Argon2<'static>, DomainError> {
    let params = Params::new(19 * 1024, 2, 1, None)
        .map_err(|err| DomainError::Unexpected(err.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{SessionIssuer, hash_password, verify_password};
    use crate::domain::error::DomainError;
    use crate::domain::user::{Role, User};

    fn sample_user() -> User {
        User {
            id: 1,
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            role: Role::User,
            avatar: None,
            bio: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("correct-password").expect("hash must be created");
        verify_password("correct-password", &hash).expect("verification must succeed");
    }

    #[test]
    fn wrong_password_is_invalid_credentials() {
        let hash = hash_password("correct-password").expect("hash must be created");
        let err = verify_password("wrong-password", &hash).expect_err("verification must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[test]
    fn issued_token_is_valid_until_ttl() {
        let issuer = SessionIssuer::new(3600);
        let token = issuer.issue(sample_user());
        assert_eq!(token.token.len(), 64);
        assert!(token.is_valid(Utc::now()));
        assert!(!token.is_valid(Utc::now() + Duration::seconds(3601)));
    }

    #[test]
    fn tokens_are_unique_per_issue() {
        let issuer = SessionIssuer::new(3600);
        let a = issuer.issue(sample_user());
        let b = issuer.issue(sample_user());
        assert_ne!(a.token, b.token);
    }
}
