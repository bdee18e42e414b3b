//! User Directory operations, including the cross-store cascade of
//! `delete_user`.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{debug, info};

use super::{BlogStore, UserRecord};
use crate::auth;
use crate::domain::error::DomainError;
use crate::domain::user::{ProfilePatch, RegisterRequest, Role, SocialLoginRequest, User};

impl BlogStore {
    pub fn register(&mut self, req: RegisterRequest) -> Result<User, DomainError> {
        let req = req.validate()?;
        if self.find_record_by_email(&req.email).is_some() {
            return Err(DomainError::DuplicateEmail(req.email));
        }

        let password_hash = auth::hash_password(&req.password)?;
        let user = User {
            id: self.alloc_user_id(),
            email: req.email,
            name: req.name,
            role: Role::User,
            avatar: None,
            bio: String::new(),
            created_at: Utc::now(),
        };
        info!(user_id = user.id, "registered user");
        self.users.push(UserRecord {
            user: user.clone(),
            password_hash: Some(password_hash),
        });
        Ok(user)
    }

    pub fn authenticate(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let email = email.trim().to_lowercase();
        let record = match self.find_record_by_email(&email) {
            Some(record) => record,
            None => {
                // Burn a verification even when the email is unknown so both
                // outcomes take about the same time.
                match auth::verify_password(password, auth::DUMMY_PASSWORD_HASH) {
                    Ok(()) | Err(DomainError::InvalidCredentials) => {}
                    Err(err) => return Err(err),
                }
                return Err(DomainError::InvalidCredentials);
            }
        };

        let Some(password_hash) = record.password_hash.as_deref() else {
            // Social-only account: no password to match against.
            match auth::verify_password(password, auth::DUMMY_PASSWORD_HASH) {
                Ok(()) | Err(DomainError::InvalidCredentials) => {}
                Err(err) => return Err(err),
            }
            return Err(DomainError::InvalidCredentials);
        };

        auth::verify_password(password, password_hash)?;
        Ok(record.user.clone())
    }

    /// Idempotent upsert: an existing account with the same email is reused,
    /// otherwise a passwordless account is created for the provider.
    pub fn social_authenticate(&mut self, req: SocialLoginRequest) -> Result<User, DomainError> {
        let req = req.validate()?;
        if let Some(record) = self.find_record_by_email(&req.email) {
            return Ok(record.user.clone());
        }

        let id = self.alloc_user_id();
        let user = User {
            id,
            email: req.email,
            name: req.name,
            role: Role::User,
            avatar: Some(format!("https://avatars.blogsink.dev/{}/{id}.png", req.provider)),
            bio: format!("Joined via {}", req.provider),
            created_at: Utc::now(),
        };
        info!(user_id = id, provider = %req.provider, "created social account");
        self.users.push(UserRecord {
            user: user.clone(),
            password_hash: None,
        });
        Ok(user)
    }

    pub fn list_users(&self) -> Vec<User> {
        self.users.iter().map(|record| record.user.clone()).collect()
    }

    pub fn find_user(&self, id: i64) -> Option<&User> {
        self.users
            .iter()
            .map(|record| &record.user)
            .find(|user| user.id == id)
    }

    pub fn update_profile(&mut self, id: i64, patch: ProfilePatch) -> Result<User, DomainError> {
        let name = patch
            .name
            .as_deref()
            .map(crate::domain::user::normalize_name)
            .transpose()?;

        let record = self
            .users
            .iter_mut()
            .find(|record| record.user.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("user id: {id}")))?;

        if let Some(name) = name {
            record.user.name = name;
        }
        if let Some(bio) = patch.bio {
            record.user.bio = bio.trim().to_string();
        }
        if let Some(avatar) = patch.avatar {
            record.user.avatar = Some(avatar);
        }
        Ok(record.user.clone())
    }

    pub fn promote_to_admin(&mut self, id: i64) -> Result<User, DomainError> {
        let record = self
            .users
            .iter_mut()
            .find(|record| record.user.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("user id: {id}")))?;
        record.user.role = Role::Admin;
        Ok(record.user.clone())
    }

    /// Removes a user together with every post they authored and every
    /// comment on those posts. The user is looked up before anything is
    /// touched, so a missing id leaves the store unchanged.
    pub fn delete_user(&mut self, id: i64) -> Result<(), DomainError> {
        let index = self
            .users
            .iter()
            .position(|record| record.user.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("user id: {id}")))?;

        let authored: BTreeSet<i64> = self
            .posts
            .iter()
            .filter(|post| post.author_id == id)
            .map(|post| post.id)
            .collect();

        self.comments.retain(|comment| !authored.contains(&comment.blog_id));
        self.posts.retain(|post| post.author_id != id);
        self.users.remove(index);
        debug!(user_id = id, cascaded_posts = authored.len(), "deleted user");
        Ok(())
    }

    pub(crate) fn find_record_by_email(&self, email: &str) -> Option<&UserRecord> {
        // Emails are stored normalized, but compare case-insensitively so a
        // record seeded with mixed case can never sneak in a duplicate.
        self.users
            .iter()
            .find(|record| record.user.email.eq_ignore_ascii_case(email))
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::error::DomainError;
    use crate::domain::user::{ProfilePatch, RegisterRequest, Role, SocialLoginRequest};
    use crate::store::BlogStore;

    fn register_req(email: &str, name: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "very-secure-password".to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn register_assigns_sequential_ids_and_user_role() {
        let mut store = BlogStore::new();
        let ada = store.register(register_req("ada@example.com", "Ada")).expect("must register");
        let bob = store.register(register_req("bob@example.com", "Bob")).expect("must register");
        assert_eq!(ada.id, 1);
        assert_eq!(bob.id, 2);
        assert_eq!(ada.role, Role::User);
    }

    #[test]
    fn register_rejects_duplicate_email_case_insensitively() {
        let mut store = BlogStore::new();
        store.register(register_req("ada@example.com", "Ada")).expect("must register");

        let err = store
            .register(register_req("ADA@example.com", "Imposter"))
            .expect_err("duplicate must be rejected");
        assert!(matches!(err, DomainError::DuplicateEmail(_)));
        assert_eq!(store.list_users().len(), 1);
    }

    #[test]
    fn authenticate_round_trips_registered_credentials() {
        let mut store = BlogStore::new();
        store.register(register_req("ada@example.com", "Ada")).expect("must register");

        let user = store
            .authenticate("ada@example.com", "very-secure-password")
            .expect("must authenticate");
        assert_eq!(user.name, "Ada");

        let err = store
            .authenticate("ada@example.com", "wrong-password")
            .expect_err("wrong password must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[test]
    fn authenticate_rejects_unknown_email() {
        let store = BlogStore::new();
        let err = store
            .authenticate("ghost@example.com", "whatever-password")
            .expect_err("unknown email must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[test]
    fn social_authenticate_is_an_idempotent_upsert() {
        let mut store = BlogStore::new();
        let req = SocialLoginRequest {
            provider: "github".to_string(),
            email: "dev@example.com".to_string(),
            name: "Dev".to_string(),
        };

        let first = store.social_authenticate(req.clone()).expect("must upsert");
        let second = store.social_authenticate(req).expect("must upsert");
        assert_eq!(first.id, second.id);
        assert_eq!(store.list_users().len(), 1);
        assert!(first.avatar.expect("placeholder avatar").contains("github"));
        assert_eq!(first.bio, "Joined via github");
    }

    #[test]
    fn social_account_has_no_password_to_authenticate_with() {
        let mut store = BlogStore::new();
        store
            .social_authenticate(SocialLoginRequest {
                provider: "github".to_string(),
                email: "dev@example.com".to_string(),
                name: "Dev".to_string(),
            })
            .expect("must upsert");

        let err = store
            .authenticate("dev@example.com", "anything-goes-here")
            .expect_err("social account must not password-authenticate");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[test]
    fn list_users_preserves_insertion_order() {
        let mut store = BlogStore::new();
        store.register(register_req("ada@example.com", "Ada")).expect("must register");
        store.register(register_req("bob@example.com", "Bob")).expect("must register");

        let names: Vec<String> = store.list_users().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["Ada".to_string(), "Bob".to_string()]);
    }

    #[test]
    fn update_profile_touches_only_patched_fields() {
        let mut store = BlogStore::new();
        let ada = store.register(register_req("ada@example.com", "Ada")).expect("must register");

        let updated = store
            .update_profile(
                ada.id,
                ProfilePatch {
                    bio: Some("  Compiler enthusiast  ".to_string()),
                    ..ProfilePatch::default()
                },
            )
            .expect("must update");
        assert_eq!(updated.name, "Ada");
        assert_eq!(updated.bio, "Compiler enthusiast");
    }

    #[test]
    fn promote_to_admin_flips_the_role() {
        let mut store = BlogStore::new();
        let ada = store.register(register_req("ada@example.com", "Ada")).expect("must register");
        assert_eq!(ada.role, Role::User);

        let promoted = store.promote_to_admin(ada.id).expect("must promote");
        assert_eq!(promoted.role, Role::Admin);
        assert!(store.find_user(ada.id).expect("user must exist").is_admin());
    }

    #[test]
    fn delete_user_fails_without_side_effects_for_unknown_id() {
        let mut store = BlogStore::new();
        store.register(register_req("ada@example.com", "Ada")).expect("must register");

        let err = store.delete_user(99).expect_err("unknown user must fail");
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(store.list_users().len(), 1);
    }
}
