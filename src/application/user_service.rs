use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::domain::user::User;

use super::commands::{ChangePasswordCommand, CreateUserCommand};
use super::queries::{GetUserQuery, GetUsersQuery, Page, SearchUsersQuery};

pub struct UserService<R> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new user.
    ///
    /// Validation runs in two layers: the command's password policy first,
    /// then the entity's structural checks. Email uniqueness is checked by
    /// looking the address up before inserting; the storage adapter's own
    /// unique constraint covers concurrent registrations.
    pub fn create_user(&self, cmd: CreateUserCommand) -> Result<User, DomainError> {
        cmd.validate()?;
        let user = User::new(&cmd.email, &cmd.name, &cmd.password)?;

        self.ensure_email_free(&cmd.email, None)?;

        let user = self.repo.create(user)?;
        log::info!("Created user {}", user.id());
        Ok(user)
    }

    pub fn get_user(&self, query: GetUserQuery) -> Result<User, DomainError> {
        if query.user_id <= 0 {
            return Err(DomainError::InvalidUserId);
        }
        self.repo.get_by_id(query.user_id)
    }

    pub fn get_users(&self, query: GetUsersQuery) -> Result<Vec<User>, DomainError> {
        let page = Page::new(query.limit, query.offset);
        self.repo.get_all(page.limit, page.offset)
    }

    /// Overwrites the non-empty fields of a user.
    pub fn update_user(&self, id: i64, email: &str, name: &str) -> Result<User, DomainError> {
        let mut user = self.repo.get_by_id(id)?;

        if !email.is_empty() && email != user.email() {
            self.ensure_email_free(email, Some(id))?;
        }

        user.update_info(name, email);
        self.repo.update(&user)?;
        Ok(user)
    }

    pub fn change_password(&self, cmd: ChangePasswordCommand) -> Result<(), DomainError> {
        cmd.validate()?;
        let mut user = self.repo.get_by_id(cmd.user_id)?;
        user.change_password(&cmd.new_password)?;
        self.repo.update(&user)?;
        log::info!("Changed password of user {}", user.id());
        Ok(())
    }

    pub fn delete_user(&self, id: i64) -> Result<(), DomainError> {
        self.repo.delete(id)?;
        log::info!("Soft-deleted user {}", id);
        Ok(())
    }

    pub fn users_by_email_domain(&self, domain: &str) -> Result<Vec<User>, DomainError> {
        self.repo.get_users_by_email_domain(domain)
    }

    pub fn active_users(&self) -> Result<Vec<User>, DomainError> {
        self.repo.get_active_users()
    }

    pub fn search_users(&self, query: SearchUsersQuery) -> Result<Vec<User>, DomainError> {
        let page = Page::new(query.limit, query.offset);
        self.repo
            .get_users_with_filters(page.limit, page.offset, &query.email, &query.name)
    }

    pub fn count_users(&self) -> Result<i64, DomainError> {
        self.repo.count()
    }

    /// Found ⇒ `EmailExists` (unless it is `owner` itself), not found ⇒ ok,
    /// anything else is propagated.
    fn ensure_email_free(&self, email: &str, owner: Option<i64>) -> Result<(), DomainError> {
        match self.repo.get_by_email(email) {
            Ok(existing) if Some(existing.id()) == owner => Ok(()),
            Ok(_) => {
                log::warn!("Rejected duplicate email registration");
                Err(DomainError::EmailExists)
            }
            Err(DomainError::UserNotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
