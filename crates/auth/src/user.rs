//! User accounts and registration input.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sweetshop_core::{UserId, ValidationError, ValidationErrors};

use crate::{Principal, Role};

pub const MAX_USERNAME_LEN: usize = 150;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MIN_PASSWORD_LEN: usize = 8;

/// A persisted account. The password hash never leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub date_joined: DateTime<Utc>,
}

impl UserAccount {
    pub fn principal(&self) -> Principal {
        Principal::new(self.id, self.username.clone(), self.role)
    }
}

/// An account ready to be stored: validated, with the password already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Sign-up form as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

/// Registration fields that passed validation (username and email trimmed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    /// Validate every field, reporting all failures together.
    pub fn validate(&self) -> Result<ValidRegistration, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let username = self.username.trim();
        if let Err(e) = validate_username(username) {
            errors.push(e);
        }

        let email = self.email.trim();
        if let Err(e) = validate_email(email) {
            errors.push(e);
        }

        if let Err(e) = validate_password(&self.password) {
            errors.push(e);
        }

        if self.password_confirm.is_empty() {
            errors.push(ValidationError::required("password_confirm"));
        } else if self.password_confirm != self.password {
            errors.push(ValidationError::mismatch("password_confirm", "password"));
        }

        errors.into_result()?;

        Ok(ValidRegistration {
            username: username.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::required("username"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ValidationError::too_long("username", MAX_USERNAME_LEN));
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !username.chars().all(allowed) {
        return Err(ValidationError::invalid_format(
            "username",
            "may contain only letters, digits and @/./+/-/_",
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(ValidationError::too_long("email", MAX_EMAIL_LEN));
    }

    let invalid = || ValidationError::invalid_format("email", "enter a valid email address");
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::too_short("password", MIN_PASSWORD_LEN));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid_format("password", "must not be entirely numeric"));
    }
    Ok(())
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserStoreError {
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("user store error: {0}")]
    Backend(String),
}

/// Persistence port for accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Store a new account; the store assigns `id` and `date_joined`.
    async fn insert(&self, user: NewUser) -> Result<UserAccount, UserStoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, UserStoreError>;

    async fn get_by_id(&self, id: UserId) -> Result<Option<UserAccount>, UserStoreError>;
}

#[async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn insert(&self, user: NewUser) -> Result<UserAccount, UserStoreError> {
        (**self).insert(user).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, UserStoreError> {
        (**self).find_by_username(username).await
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<UserAccount>, UserStoreError> {
        (**self).get_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(username: &str, email: &str, password: &str, confirm: &str) -> Registration {
        Registration {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            password_confirm: confirm.into(),
        }
    }

    #[test]
    fn valid_registration_is_trimmed() {
        let valid = registration(" testuser ", "testuser@example.com ", "testpassword123", "testpassword123")
            .validate()
            .unwrap();
        assert_eq!(valid.username, "testuser");
        assert_eq!(valid.email, "testuser@example.com");
    }

    #[test]
    fn all_failures_are_reported_together() {
        let errors = registration("testuser2", "invalid-email", "short", "different")
            .validate()
            .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(ValidationError::field).collect();
        assert_eq!(fields, vec!["email", "password", "password_confirm"]);
    }

    #[test]
    fn missing_fields_are_required() {
        let errors = Registration {
            username: "testuser3".into(),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(errors.iter().any(|e| *e == ValidationError::required("email")));
        assert!(errors.iter().any(|e| *e == ValidationError::required("password")));
        assert!(errors.iter().any(|e| *e == ValidationError::required("password_confirm")));
    }

    #[test]
    fn numeric_password_is_rejected() {
        assert!(matches!(
            validate_password("12345678"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(validate_password("1234567a").is_ok());
    }

    #[test]
    fn username_charset_is_enforced() {
        assert!(validate_username("jane.doe+shop@x_y-z").is_ok());
        assert!(validate_username("jane doe").is_err());
        assert!(validate_username(&"a".repeat(MAX_USERNAME_LEN + 1)).is_err());
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(validate_email("a@b.co").is_ok());
        for bad in ["a@b", "@b.co", "a@@b.co", "a b@c.de", "a@b..c"] {
            assert!(validate_email(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn serialized_account_omits_password_hash() {
        let account = UserAccount {
            id: UserId::new(1),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::User,
            date_joined: Utc::now(),
        };
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "user");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn all_digit_passwords_never_validate(password in "[0-9]{8,64}") {
                prop_assert!(validate_password(&password).is_err());
            }

            #[test]
            fn short_passwords_never_validate(password in "[a-z0-9]{1,7}") {
                prop_assert_eq!(
                    validate_password(&password),
                    Err(ValidationError::too_short("password", MIN_PASSWORD_LEN))
                );
            }

            #[test]
            fn usernames_from_the_allowed_charset_validate(username in "[A-Za-z0-9@.+_-]{1,150}") {
                prop_assert!(validate_username(&username).is_ok());
            }
        }
    }
}
