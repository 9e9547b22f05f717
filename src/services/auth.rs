use std::sync::Arc;

use crate::auth::password::{generate_salt, hash_password, verify_password};
use crate::database::models::{NewTeacherProfile, NewUser, TeacherProfile, User};
use crate::database::repositories::{LiveQuizRepository, UserRepository};
use crate::error::AppError;
use super::validation::{validate_length, EMAIL_MAX, USERNAME_MAX};

/// Password given to demo accounts created on first login
pub const DEMO_PASSWORD: &str = "demo123";

/// Account creation and the three login flavours (student, admin, teacher)
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    teachers: Arc<dyn LiveQuizRepository>,
    admin_username: String,
    admin_password: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        teachers: Arc<dyn LiveQuizRepository>,
        admin_username: impl Into<String>,
        admin_password: impl Into<String>,
    ) -> Self {
        Self {
            users,
            teachers,
            admin_username: admin_username.into(),
            admin_password: admin_password.into(),
        }
    }

    fn create_user(&self, username: &str, email: &str, password: &str) -> Result<User, AppError> {
        let salt = generate_salt();
        let user = self.users.insert(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password, &salt),
            password_salt: salt,
        })?;

        tracing::info!(user_id = user.id, username = %user.username, "Created user");
        Ok(user)
    }

    /// Register a new account. Usernames are unique.
    pub fn register(&self, username: &str, email: &str, password: &str) -> Result<User, AppError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::bad_request("Username and password are required"));
        }
        validate_length("Username", username, USERNAME_MAX)?;
        validate_length("Email", email.trim(), EMAIL_MAX)?;

        if self.users.find_by_username(username)?.is_some() {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let email = match email.trim() {
            "" => format!("{}@demo.com", username),
            given => given.to_string(),
        };

        self.create_user(username, &email, password)
    }

    /// Demo login: any username is accepted and unknown ones are created.
    ///
    /// Returns the user and whether it was created by this call. Passwords of
    /// existing accounts are not checked.
    pub fn demo_login(&self, username: &str, password: Option<&str>) -> Result<(User, bool), AppError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::bad_request("Username is required"));
        }
        validate_length("Username", username, USERNAME_MAX)?;

        if let Some(user) = self.users.find_by_username(username)? {
            return Ok((user, false));
        }

        let password = password.filter(|p| !p.is_empty()).unwrap_or(DEMO_PASSWORD);
        let user = self.create_user(username, &format!("{}@demo.com", username), password)?;
        Ok((user, true))
    }

    /// Check a password against a stored account
    pub fn check_password(&self, user: &User, password: &str) -> bool {
        verify_password(password, &user.password_salt, &user.password_hash)
    }

    pub fn admin_login(&self, username: &str, password: &str) -> Result<(), AppError> {
        if username == self.admin_username && password == self.admin_password {
            Ok(())
        } else {
            tracing::warn!(username = %username, "Rejected admin login");
            Err(AppError::Unauthorized("Invalid admin credentials".to_string()))
        }
    }

    /// Log a teacher in by email, creating the account and profile on first use
    pub fn teacher_login(&self, email: &str) -> Result<(TeacherProfile, User), AppError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::bad_request("A valid email is required"));
        }
        // The email doubles as the teacher's username
        validate_length("Email", &email, USERNAME_MAX)?;

        if let Some(teacher) = self.teachers.find_teacher_by_email(&email)? {
            let user = self
                .users
                .find_by_id(teacher.user_id)?
                .ok_or_else(|| AppError::Internal(format!("Teacher {} has no user", teacher.id)))?;
            return Ok((teacher, user));
        }

        let user = match self.users.find_by_username(&email)? {
            Some(user) => user,
            None => self.create_user(&email, &email, &generate_salt())?,
        };

        let teacher = self.teachers.insert_teacher(NewTeacherProfile {
            user_id: user.id,
            email,
        })?;

        tracing::info!(teacher_id = teacher.id, "Created teacher profile");
        Ok((teacher, user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repositories::{MockLiveQuizRepository, MockUserRepository};
    use chrono::Utc;

    fn user(id: i64, username: &str) -> User {
        let salt = "00ff".to_string();
        User {
            id,
            username: username.to_string(),
            email: format!("{}@demo.com", username),
            password_hash: hash_password(DEMO_PASSWORD, &salt),
            password_salt: salt,
            created_at: Utc::now(),
        }
    }

    fn service(users: MockUserRepository, teachers: MockLiveQuizRepository) -> AuthService {
        AuthService::new(Arc::new(users), Arc::new(teachers), "root", "root")
    }

    #[test]
    fn test_register_rejects_existing_username() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|name| Ok(Some(user(1, name))));

        let result = service(users, MockLiveQuizRepository::new()).register("asha", "", "pw");
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_demo_login_creates_unknown_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));
        users
            .expect_insert()
            .withf(|new_user| new_user.email == "ravi@demo.com")
            .returning(|new_user| {
                Ok(User {
                    id: 7,
                    username: new_user.username,
                    email: new_user.email,
                    password_hash: new_user.password_hash,
                    password_salt: new_user.password_salt,
                    created_at: Utc::now(),
                })
            });

        let svc = service(users, MockLiveQuizRepository::new());
        let (created, is_new) = svc.demo_login(" ravi ", None).unwrap();

        assert!(is_new);
        assert_eq!(created.username, "ravi");
        assert!(svc.check_password(&created, DEMO_PASSWORD));
    }

    #[test]
    fn test_demo_login_ignores_password_of_existing_user() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|name| Ok(Some(user(3, name))));
        users.expect_insert().never();

        let (existing, is_new) = service(users, MockLiveQuizRepository::new())
            .demo_login("asha", Some("wrong"))
            .unwrap();
        assert!(!is_new);
        assert_eq!(existing.id, 3);
    }

    #[test]
    fn test_demo_login_requires_username() {
        let svc = service(MockUserRepository::new(), MockLiveQuizRepository::new());
        assert!(matches!(svc.demo_login("   ", None), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_admin_login() {
        let svc = service(MockUserRepository::new(), MockLiveQuizRepository::new());
        assert!(svc.admin_login("root", "root").is_ok());
        assert!(matches!(
            svc.admin_login("root", "nope"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_teacher_login_reuses_profile() {
        let mut teachers = MockLiveQuizRepository::new();
        teachers.expect_find_teacher_by_email().returning(|email| {
            Ok(Some(TeacherProfile {
                id: 2,
                user_id: 5,
                email: email.to_string(),
                created_at: Utc::now(),
            }))
        });
        teachers.expect_insert_teacher().never();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(user(id, "teacher@school.edu"))));

        let (teacher, account) = service(users, teachers)
            .teacher_login("Teacher@School.edu")
            .unwrap();
        assert_eq!(teacher.email, "teacher@school.edu");
        assert_eq!(account.id, 5);
    }

    #[test]
    fn test_teacher_login_requires_email() {
        let svc = service(MockUserRepository::new(), MockLiveQuizRepository::new());
        assert!(matches!(svc.teacher_login("nobody"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_overlong_username_is_bad_request() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().never();
        users.expect_insert().never();

        let svc = service(users, MockLiveQuizRepository::new());
        let long = "u".repeat(USERNAME_MAX + 1);

        assert!(matches!(svc.register(&long, "", "pw"), Err(AppError::BadRequest(_))));
        assert!(matches!(svc.demo_login(&long, None), Err(AppError::BadRequest(_))));
    }
}
