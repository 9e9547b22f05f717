use axum::{
    async_trait,
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use std::convert::Infallible;
use std::net::SocketAddr;

use crate::auth::{CurrentSession, SessionStore};

/// Client details captured alongside every clickstream event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    pub ip_address: String,
    pub user_agent: String,
    pub referrer: Option<String>,
    /// Absolute URL of the request
    pub url: String,
    pub session_id: String,
    /// Learner bound to the session, if any
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl RequestContext {
    pub fn from_parts(parts: &Parts, session: &CurrentSession) -> Self {
        let remote = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Self {
            ip_address: client_ip(&parts.headers, remote.as_deref()),
            user_agent: header_str(&parts.headers, header::USER_AGENT.as_str()).unwrap_or_default(),
            referrer: header_str(&parts.headers, header::REFERER.as_str()),
            url: absolute_url(parts),
            session_id: session.key().to_string(),
            user_id: session.data.user_id,
            username: session.data.username.clone(),
            email: session.data.email.clone(),
        }
    }

    /// "username (email)" label used in event descriptions
    pub fn user_label(&self) -> String {
        match (&self.username, &self.email) {
            (Some(name), Some(email)) if !email.is_empty() => format!("{} ({})", name, email),
            (Some(name), _) => name.clone(),
            _ => "Anonymous".to_string(),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    SessionStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = CurrentSession::load(parts, &SessionStore::from_ref(state));
        Ok(RequestContext::from_parts(parts, &session))
    }
}

/// First `X-Forwarded-For` hop, else the socket peer address
pub fn client_ip(headers: &HeaderMap, remote: Option<&str>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .or_else(|| remote.map(str::to_string))
        .unwrap_or_else(|| "0.0.0.0".to_string())
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn absolute_url(parts: &Parts) -> String {
    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let scheme = parts
        .headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");

    format!("{}://{}{}", scheme, host, parts.uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        assert_eq!(client_ip(&headers, Some("127.0.0.1")), "203.0.113.7");

        let empty = HeaderMap::new();
        assert_eq!(client_ip(&empty, Some("127.0.0.1")), "127.0.0.1");
        assert_eq!(client_ip(&empty, None), "0.0.0.0");
    }

    #[test]
    fn test_context_from_parts() {
        let (parts, _) = Request::builder()
            .uri("/api/courses/3?tab=1")
            .header(header::HOST, "lms.local:8000")
            .header(header::USER_AGENT, "Firefox")
            .header(header::REFERER, "http://lms.local:8000/api/dashboard")
            .body(())
            .unwrap()
            .into_parts();

        let ctx = RequestContext::from_parts(&parts, &CurrentSession::default());
        assert_eq!(ctx.url, "http://lms.local:8000/api/courses/3?tab=1");
        assert_eq!(ctx.user_agent, "Firefox");
        assert_eq!(ctx.referrer.as_deref(), Some("http://lms.local:8000/api/dashboard"));
        assert_eq!(ctx.session_id, "");
        assert_eq!(ctx.user_label(), "Anonymous");
    }
}
