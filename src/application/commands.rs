use crate::domain::errors::DomainError;

/// Policy minimum for passwords. The entity only requires a non-empty
/// password; this stricter rule applies to commands coming from clients.
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone)]
pub struct CreateUserCommand {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl CreateUserCommand {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_password_policy(&self.password)
    }
}

#[derive(Debug, Clone)]
pub struct ChangePasswordCommand {
    pub user_id: i64,
    pub new_password: String,
}

impl ChangePasswordCommand {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_password_policy(&self.new_password)
    }
}

fn validate_password_policy(password: &str) -> Result<(), DomainError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::InvalidPassword);
    }
    Ok(())
}
