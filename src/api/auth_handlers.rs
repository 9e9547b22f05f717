use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use crate::auth::{clear_session_cookie, session_cookie, CurrentSession};
use crate::clickstream::RequestContext;
use crate::database::enums::EventName;
use crate::error::AppError;

use super::responses::*;
use super::state::AppState;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
    })
}

// ============================================================================
// Learner accounts
// ============================================================================

/// Register a new account and log it in
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and logged in", body = LoginResponse),
        (status = 400, description = "Missing username or password", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    session: CurrentSession,
    ctx: RequestContext,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .auth
        .register(&request.username, &request.email, &request.password)?;

    state.logger.log(
        &ctx,
        EventName::Registration,
        "Registration Form",
        format!("New user registered with username: {}", user.username),
        Some(user.id),
    );

    let sid = state.sessions.rotate(session.id.as_deref(), |data| {
        data.user_id = Some(user.id);
        data.username = Some(user.username.clone());
        data.email = Some(user.email.clone());
    });

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session_cookie(&sid))],
        Json(LoginResponse {
            user,
            created: true,
            message: "Registration successful!".to_string(),
        }),
    ))
}

/// Demo login: any username logs in, unknown ones are created
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing username", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    session: CurrentSession,
    ctx: RequestContext,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (user, created) = state
        .auth
        .demo_login(&request.username, request.password.as_deref())?;

    let sid = state.sessions.rotate(session.id.as_deref(), |data| {
        data.user_id = Some(user.id);
        data.username = Some(user.username.clone());
        data.email = Some(user.email.clone());
    });

    state.logger.log(
        &ctx,
        EventName::Login,
        "Login Form",
        format!("User {} logged in successfully (demo mode)", user.username),
        Some(user.id),
    );

    let message = if created {
        format!("New account created for {}", user.username)
    } else {
        "Login successful!".to_string()
    };

    Ok((
        [(header::SET_COOKIE, session_cookie(&sid))],
        Json(LoginResponse {
            user,
            created,
            message,
        }),
    ))
}

/// End the current session
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Session cleared", body = MessageResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    session: CurrentSession,
    ctx: RequestContext,
) -> impl IntoResponse {
    if let Some(username) = &session.data.username {
        state.logger.log(
            &ctx,
            EventName::Logout,
            "Logout",
            format!("User {} logged out", username),
            session.data.user_id,
        );
    }

    if let Some(id) = &session.id {
        state.sessions.remove(id);
    }

    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(MessageResponse::new("Logout successful!")),
    )
}

// ============================================================================
// Admin and teacher logins
// ============================================================================

/// Unlock the analytics and authoring endpoints for this session
#[utoipa::path(
    post,
    path = "/api/auth/admin-login",
    tag = "Auth",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Admin authenticated", body = MessageResponse),
        (status = 401, description = "Invalid admin credentials", body = ErrorResponse)
    )
)]
pub async fn admin_login(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<AdminLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.auth.admin_login(&request.username, &request.password)?;

    let sid = state
        .sessions
        .rotate(session.id.as_deref(), |data| data.admin_authenticated = true);

    Ok((
        [(header::SET_COOKIE, session_cookie(&sid))],
        Json(MessageResponse::new("Admin authentication successful!")),
    ))
}

/// Teacher login by email; the profile is created on first use
#[utoipa::path(
    post,
    path = "/api/auth/teacher-login",
    tag = "Auth",
    request_body = TeacherLoginRequest,
    responses(
        (status = 200, description = "Teacher logged in", body = TeacherLoginResponse),
        (status = 400, description = "Invalid email", body = ErrorResponse)
    )
)]
pub async fn teacher_login(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<TeacherLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (teacher, user) = state.auth.teacher_login(&request.email)?;

    let sid = state.sessions.rotate(session.id.as_deref(), |data| {
        data.teacher_id = Some(teacher.id);
        data.user_id = Some(user.id);
        data.username = Some(user.username.clone());
        data.email = Some(user.email.clone());
    });

    tracing::info!(teacher_id = teacher.id, "Teacher logged in");

    Ok((
        [(header::SET_COOKIE, session_cookie(&sid))],
        Json(TeacherLoginResponse { teacher, user }),
    ))
}

/// Describe the current session
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current session", body = MeResponse)
    )
)]
pub async fn me(session: CurrentSession) -> Json<MeResponse> {
    Json(MeResponse::from(&session.data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionData;
    use crate::config::{AppConfig, LlmConfig};
    use crate::database::repositories::*;
    use crate::llm::{FallbackChain, LlmService};
    use std::sync::Arc;

    fn test_state() -> AppState {
        let config = AppConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            database_url: String::new(),
            db_pool_max_size: 1,
            run_migrations: false,
            admin_username: "admin".to_string(),
            admin_password: "secret".to_string(),
            session_ttl_minutes: 60,
            quiz_expiry_cron: "0 * * * * *".to_string(),
            llm: LlmConfig::default(),
        };
        let repositories = Repositories {
            users: Arc::new(MockUserRepository::new()),
            courses: Arc::new(MockCourseRepository::new()),
            progress: Arc::new(MockProgressRepository::new()),
            clickstream: Arc::new(MockClickstreamRepository::new()),
            live_quizzes: Arc::new(MockLiveQuizRepository::new()),
            participants: Arc::new(MockParticipantRepository::new()),
            polls: Arc::new(MockPollRepository::new()),
            feedback: Arc::new(MockFeedbackRepository::new()),
        };
        let llm = LlmService::new(FallbackChain::new(Vec::new()), &config.llm);
        AppState::new(&config, repositories, llm)
    }

    #[tokio::test]
    async fn test_admin_login_issues_fresh_session_id() {
        let state = test_state();
        let planted = state.sessions.create(SessionData::default());
        let session = CurrentSession {
            id: Some(planted.clone()),
            data: SessionData::default(),
        };

        let response = admin_login(
            State(state.clone()),
            session,
            Json(AdminLoginRequest {
                username: "admin".to_string(),
                password: "secret".to_string(),
            }),
        )
        .await
        .unwrap()
        .into_response();

        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(!cookie.contains(&planted));
        assert!(state.sessions.get(&planted).is_none());

        let sid = cookie
            .trim_start_matches("sid=")
            .split(';')
            .next()
            .unwrap();
        assert!(state.sessions.get(sid).unwrap().admin_authenticated);
    }

    #[tokio::test]
    async fn test_rejected_admin_login_keeps_session() {
        let state = test_state();
        let planted = state.sessions.create(SessionData::default());
        let session = CurrentSession {
            id: Some(planted.clone()),
            data: SessionData::default(),
        };

        let result = admin_login(
            State(state.clone()),
            session,
            Json(AdminLoginRequest {
                username: "admin".to_string(),
                password: "wrong".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
        assert!(!state.sessions.get(&planted).unwrap().admin_authenticated);
    }
}
