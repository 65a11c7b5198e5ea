use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::domain::user::User;
use crate::schema::users;

use super::escape_like;
use super::models::{NewUserRow, UserChangeset, UserRow};

/// The partial unique index on `users.email` is the last line of defence
/// against two concurrent registrations of the same address.
fn map_write_error(e: DieselError) -> DomainError {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DomainError::EmailExists
        }
        other => other.into(),
    }
}

fn into_users(rows: Vec<UserRow>) -> Vec<User> {
    rows.into_iter().map(User::from).collect()
}

pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for DieselUserRepository {
    fn create(&self, user: User) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;

        let row: UserRow = diesel::insert_into(users::table)
            .values(NewUserRow::from(&user))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .map_err(map_write_error)?;

        Ok(row.into())
    }

    fn get_by_id(&self, id: i64) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;

        users::table
            .filter(users::id.eq(id))
            .filter(users::deleted_at.is_null())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .optional()?
            .map(User::from)
            .ok_or(DomainError::UserNotFound)
    }

    fn get_by_email(&self, email: &str) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;

        users::table
            .filter(users::email.eq(email))
            .filter(users::deleted_at.is_null())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .optional()?
            .map(User::from)
            .ok_or(DomainError::UserNotFound)
    }

    fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<User>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = users::table
            .filter(users::deleted_at.is_null())
            .select(UserRow::as_select())
            .order(users::id.asc())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)?;

        Ok(into_users(rows))
    }

    fn update(&self, user: &User) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let affected = diesel::update(
            users::table
                .filter(users::id.eq(user.id()))
                .filter(users::deleted_at.is_null()),
        )
        .set(UserChangeset::from(user))
        .execute(&mut conn)
        .map_err(map_write_error)?;

        if affected == 0 {
            return Err(DomainError::UserNotFound);
        }
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let now = Utc::now();

        let affected = diesel::update(
            users::table
                .filter(users::id.eq(id))
                .filter(users::deleted_at.is_null()),
        )
        .set((users::deleted_at.eq(Some(now)), users::updated_at.eq(now)))
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(DomainError::UserNotFound);
        }
        Ok(())
    }

    fn count(&self) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;

        Ok(users::table
            .filter(users::deleted_at.is_null())
            .count()
            .get_result(&mut conn)?)
    }

    fn get_users_by_email_domain(&self, domain: &str) -> Result<Vec<User>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = users::table
            .filter(users::deleted_at.is_null())
            .filter(users::email.like(format!("%@{}", escape_like(domain))))
            .select(UserRow::as_select())
            .order(users::id.asc())
            .load(&mut conn)?;

        Ok(into_users(rows))
    }

    fn get_active_users(&self) -> Result<Vec<User>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = users::table
            .filter(users::deleted_at.is_null())
            .select(UserRow::as_select())
            .order(users::id.asc())
            .load(&mut conn)?;

        Ok(into_users(rows))
    }

    fn get_users_with_filters(
        &self,
        limit: i64,
        offset: i64,
        email: &str,
        name: &str,
    ) -> Result<Vec<User>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = users::table
            .filter(users::deleted_at.is_null())
            .select(UserRow::as_select())
            .into_boxed();
        if !email.is_empty() {
            query = query.filter(users::email.like(format!("%{}%", escape_like(email))));
        }
        if !name.is_empty() {
            query = query.filter(users::name.like(format!("%{}%", escape_like(name))));
        }

        let rows = query
            .order(users::id.asc())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)?;

        Ok(into_users(rows))
    }
}
