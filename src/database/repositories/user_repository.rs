use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::{NewUser, User};
use crate::database::schema::users;
use diesel::prelude::*;
use std::sync::Arc;

/// User repository trait - account lookup and creation
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    fn find_by_id(&self, user_id: i64) -> Result<Option<User>, DatabaseError>;

    /// Find user by username (exact match)
    fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    /// Insert a new user
    fn insert(&self, new_user: NewUser) -> Result<User, DatabaseError>;

    /// Total registered users
    fn count(&self) -> Result<i64, DatabaseError>;
}

/// Concrete implementation of UserRepository
pub struct UserRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl UserRepositoryImpl {
    /// Create new user repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

impl UserRepository for UserRepositoryImpl {
    fn find_by_id(&self, user_id: i64) -> Result<Option<User>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        users::table
            .filter(users::id.eq(user_id))
            .first::<User>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        users::table
            .filter(users::username.eq(username))
            .first::<User>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn insert(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(users::table)
            .values(&new_user)
            .get_result::<User>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn count(&self) -> Result<i64, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        users::table
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(DatabaseError::from)
    }
}
