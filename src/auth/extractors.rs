use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use std::convert::Infallible;

use super::session::{session_id_from_cookie_header, SessionData, SessionStore};
use crate::error::AppError;

/// The caller's session, if the `sid` cookie points at a live one
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    pub id: Option<String>,
    pub data: SessionData,
}

impl CurrentSession {
    /// Resolve the `sid` cookie against the store
    pub fn load(parts: &Parts, store: &SessionStore) -> Self {
        let id = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(session_id_from_cookie_header)
            .map(str::to_string);

        id.and_then(|id| store.get(&id).map(|data| (id, data)))
            .map(|(id, data)| CurrentSession { id: Some(id), data })
            .unwrap_or_default()
    }

    /// Session id for event logging, empty when anonymous
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    SessionStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentSession::load(parts, &SessionStore::from_ref(state)))
    }
}

/// A logged-in learner
#[derive(Debug, Clone)]
pub struct RequireUser {
    pub session_id: String,
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireUser
where
    SessionStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = CurrentSession::load(parts, &SessionStore::from_ref(state));

        match (session.id, session.data.user_id) {
            (Some(session_id), Some(user_id)) => Ok(RequireUser {
                session_id,
                user_id,
                username: session.data.username.unwrap_or_default(),
                email: session.data.email.unwrap_or_default(),
            }),
            _ => Err(AppError::Unauthorized("Login required".to_string())),
        }
    }
}

/// A logged-in teacher
#[derive(Debug, Clone)]
pub struct RequireTeacher {
    pub session_id: String,
    pub teacher_id: i64,
    pub user_id: i64,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireTeacher
where
    SessionStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = CurrentSession::load(parts, &SessionStore::from_ref(state));

        match (session.id, session.data.teacher_id, session.data.user_id) {
            (Some(session_id), Some(teacher_id), Some(user_id)) => Ok(RequireTeacher {
                session_id,
                teacher_id,
                user_id,
            }),
            _ => Err(AppError::Unauthorized("Teacher login required".to_string())),
        }
    }
}

/// A session that passed the admin login
#[derive(Debug, Clone)]
pub struct RequireAdmin {
    pub session_id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    SessionStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = CurrentSession::load(parts, &SessionStore::from_ref(state));

        match session.id {
            Some(session_id) if session.data.admin_authenticated => Ok(RequireAdmin { session_id }),
            _ => Err(AppError::Unauthorized(
                "Admin authentication required".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_cookie(cookie: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/dashboard");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_anonymous_session() {
        let store = SessionStore::new(60);
        let parts = parts_with_cookie(None);

        let session = CurrentSession::load(&parts, &store);
        assert!(session.id.is_none());
        assert_eq!(session.key(), "");
    }

    #[tokio::test]
    async fn test_require_user() {
        let store = SessionStore::new(60);
        let id = store.create(SessionData {
            user_id: Some(3),
            username: Some("asha".to_string()),
            ..Default::default()
        });

        let mut parts = parts_with_cookie(Some(&format!("sid={}", id)));
        let user = RequireUser::from_request_parts(&mut parts, &store).await.unwrap();
        assert_eq!(user.user_id, 3);
        assert_eq!(user.username, "asha");

        let mut parts = parts_with_cookie(Some("sid=unknown"));
        assert!(RequireUser::from_request_parts(&mut parts, &store).await.is_err());
    }

    #[tokio::test]
    async fn test_require_admin_and_teacher() {
        let store = SessionStore::new(60);
        let id = store.create(SessionData {
            admin_authenticated: true,
            ..Default::default()
        });
        let mut parts = parts_with_cookie(Some(&format!("sid={}", id)));

        assert!(RequireAdmin::from_request_parts(&mut parts, &store).await.is_ok());
        assert!(RequireTeacher::from_request_parts(&mut parts, &store).await.is_err());
    }
}
