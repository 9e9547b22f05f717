use axum::{
    extract::{FromRef, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use super::context::RequestContext;
use super::logger::ClickstreamLogger;
use crate::auth::{CurrentSession, SessionStore};
use crate::database::enums::EventName;

/// Paths never tracked automatically
const SKIP_PREFIXES: &[&str] = &[
    "/static/",
    "/media/",
    "/swagger-ui",
    "/api-docs",
    "/ws",
    "/health",
    "/api/track-video",
];

/// Paths whose handlers log their own page views
const MANUAL_PREFIXES: &[&str] = &[
    "/api/home",
    "/api/dashboard",
    "/api/courses/",
    "/api/contents/",
    "/api/admin/analytics",
    "/api/auth/",
];

/// True for GET requests that should produce an automatic `page_view`
pub fn should_track(method: &Method, path: &str) -> bool {
    if method != Method::GET {
        return false;
    }

    let skipped = |prefixes: &[&str]| prefixes.iter().any(|p| path.starts_with(p));
    !skipped(SKIP_PREFIXES) && !skipped(MANUAL_PREFIXES)
}

/// Middleware logging a `page_view` for every trackable request
pub async fn track_page_views<S>(State(state): State<S>, request: Request, next: Next) -> Response
where
    SessionStore: FromRef<S>,
    ClickstreamLogger: FromRef<S>,
    S: Send + Sync + Clone + 'static,
{
    if should_track(request.method(), request.uri().path()) {
        let (parts, body) = request.into_parts();

        let session = CurrentSession::load(&parts, &SessionStore::from_ref(&state));
        let ctx = RequestContext::from_parts(&parts, &session);

        ClickstreamLogger::from_ref(&state).log(
            &ctx,
            EventName::PageView,
            "Page",
            format!("User viewed page: {}", parts.uri.path()),
            None,
        );

        return next.run(Request::from_parts(parts, body)).await;
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_get_is_tracked() {
        assert!(should_track(&Method::GET, "/api/teacher/quizzes"));
        assert!(!should_track(&Method::POST, "/api/teacher/quizzes"));
    }

    #[test]
    fn test_skipped_and_manual_paths() {
        assert!(!should_track(&Method::GET, "/health"));
        assert!(!should_track(&Method::GET, "/swagger-ui/index.html"));
        assert!(!should_track(&Method::GET, "/api/dashboard"));
        assert!(!should_track(&Method::GET, "/api/courses/4"));
        assert!(!should_track(&Method::GET, "/api/auth/me"));
        assert!(should_track(&Method::GET, "/api/polls/ABC123"));
        assert!(should_track(&Method::GET, "/api/quiz/ABC123/questions"));
    }
}
