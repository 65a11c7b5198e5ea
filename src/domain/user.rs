use chrono::{DateTime, Utc};

use super::errors::DomainError;

/// User aggregate root.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: i64,
    email: String,
    name: String,
    password: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Structural validation only: every field must be present. Policy rules
    /// such as password length live in the command layer.
    pub fn new(email: &str, name: &str, password: &str) -> Result<Self, DomainError> {
        if email.is_empty() {
            return Err(DomainError::InvalidEmail);
        }
        if name.is_empty() {
            return Err(DomainError::InvalidName);
        }
        if password.is_empty() {
            return Err(DomainError::InvalidPassword);
        }

        let now = Utc::now();
        Ok(Self {
            id: 0,
            email: email.to_string(),
            name: name.to_string(),
            password: password.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    pub fn restore(
        id: i64,
        email: String,
        name: String,
        password: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            email,
            name,
            password,
            created_at,
            updated_at,
            deleted_at,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub(crate) fn assign_id(&mut self, id: i64) {
        self.id = id;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn mark_as_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    /// Brings a soft-deleted user back.
    pub fn activate(&mut self) {
        self.deleted_at = None;
        self.updated_at = Utc::now();
    }

    /// Overwrites only the non-empty fields. An empty string leaves the
    /// field unchanged.
    pub fn update_info(&mut self, name: &str, email: &str) {
        if !name.is_empty() {
            self.name = name.to_string();
        }
        if !email.is_empty() {
            self.email = email.to_string();
        }
        self.updated_at = Utc::now();
    }

    pub fn change_password(&mut self, new_password: &str) -> Result<(), DomainError> {
        if new_password.is_empty() {
            return Err(DomainError::InvalidPassword);
        }
        self.password = new_password.to_string();
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("e@x.com", "n", "p").expect("valid user")
    }

    #[test]
    fn new_user_stamps_both_timestamps() {
        let user = user();
        assert_eq!(user.id(), 0);
        assert_eq!(user.email(), "e@x.com");
        assert_eq!(user.name(), "n");
        assert_eq!(user.created_at(), user.updated_at());
        assert!(!user.is_deleted());
    }

    #[test]
    fn new_user_requires_email() {
        assert_eq!(User::new("", "n", "p").unwrap_err(), DomainError::InvalidEmail);
    }

    #[test]
    fn new_user_requires_name() {
        assert_eq!(
            User::new("e@x.com", "", "p").unwrap_err(),
            DomainError::InvalidName
        );
    }

    #[test]
    fn new_user_requires_password() {
        assert_eq!(
            User::new("e@x.com", "n", "").unwrap_err(),
            DomainError::InvalidPassword
        );
    }

    #[test]
    fn entity_accepts_short_passwords() {
        // Length policy is enforced by CreateUserCommand, not here.
        assert!(User::new("e@x.com", "n", "abc").is_ok());
    }

    #[test]
    fn update_info_with_empty_name_changes_only_email() {
        let mut user = user();
        let before = user.updated_at();

        user.update_info("", "new@x.com");

        assert_eq!(user.name(), "n");
        assert_eq!(user.email(), "new@x.com");
        assert!(user.updated_at() >= before);
    }

    #[test]
    fn update_info_with_empty_email_changes_only_name() {
        let mut user = user();
        user.update_info("Nina", "");

        assert_eq!(user.name(), "Nina");
        assert_eq!(user.email(), "e@x.com");
    }

    #[test]
    fn change_password_rejects_empty() {
        let mut user = user();
        assert_eq!(
            user.change_password("").unwrap_err(),
            DomainError::InvalidPassword
        );
        assert_eq!(user.password(), "p");
    }

    #[test]
    fn change_password_replaces_password() {
        let mut user = user();
        user.change_password("correct horse").unwrap();
        assert_eq!(user.password(), "correct horse");
    }

    #[test]
    fn delete_then_activate_round_trips() {
        let mut user = user();

        user.mark_as_deleted();
        assert!(user.is_deleted());
        assert_eq!(user.deleted_at(), Some(user.updated_at()));

        user.activate();
        assert!(!user.is_deleted());
    }
}
