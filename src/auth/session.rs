use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "sid";

/// Server-side state attached to a browser session
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    /// Logged-in learner
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    /// Set by the admin login
    pub admin_authenticated: bool,
    /// Teacher profile id once logged in as a teacher
    pub teacher_id: Option<i64>,
    /// Live quiz participations, keyed by quiz code
    pub participants: HashMap<String, i64>,
}

#[derive(Debug, Clone)]
struct SessionEntry {
    data: SessionData,
    last_seen: DateTime<Utc>,
}

/// In-memory session store with idle expiry
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, SessionEntry>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Store a new session and return its id
    pub fn create(&self, data: SessionData) -> String {
        let id = Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            id.clone(),
            SessionEntry {
                data,
                last_seen: Utc::now(),
            },
        );
        id
    }

    /// Load a live session, refreshing its idle timer
    pub fn get(&self, id: &str) -> Option<SessionData> {
        let now = Utc::now();
        let mut entry = self.sessions.get_mut(id)?;

        if entry.last_seen + self.ttl <= now {
            drop(entry);
            self.sessions.remove(id);
            return None;
        }

        entry.last_seen = now;
        Some(entry.data.clone())
    }

    /// Mutate a live session in place. Returns false when it is missing or expired.
    pub fn update<F>(&self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut SessionData),
    {
        let now = Utc::now();

        if let Some(mut entry) = self.sessions.get_mut(id) {
            if entry.last_seen + self.ttl > now {
                f(&mut entry.data);
                entry.last_seen = now;
                return true;
            }
        }

        self.sessions.remove(id);
        false
    }

    /// Mutate the session `id` when it is live, otherwise start a new one.
    /// Returns the id now holding the data.
    pub fn upsert<F>(&self, id: Option<&str>, f: F) -> String
    where
        F: FnOnce(&mut SessionData),
    {
        let now = Utc::now();

        if let Some(id) = id {
            if let Some(mut entry) = self.sessions.get_mut(id) {
                if entry.last_seen + self.ttl > now {
                    f(&mut entry.data);
                    entry.last_seen = now;
                    return id.to_string();
                }
            }
            self.sessions.remove(id);
        }

        let mut data = SessionData::default();
        f(&mut data);
        self.create(data)
    }

    /// Move a live session's data under a fresh id, drop the old id and
    /// apply `f`. Used whenever a session gains privileges.
    pub fn rotate<F>(&self, id: Option<&str>, f: F) -> String
    where
        F: FnOnce(&mut SessionData),
    {
        let now = Utc::now();
        let mut data = id
            .and_then(|id| self.sessions.remove(id))
            .filter(|(_, entry)| entry.last_seen + self.ttl > now)
            .map(|(_, entry)| entry.data)
            .unwrap_or_default();

        f(&mut data);
        self.create(data)
    }

    pub fn remove(&self, id: &str) {
        self.sessions.remove(id);
    }

    /// Drop every session idle past the TTL, returning how many were removed
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        let ttl = self.ttl;
        self.sessions.retain(|_, entry| entry.last_seen + ttl > now);
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// `Set-Cookie` value binding the session id
pub fn session_cookie(id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

/// `Set-Cookie` value that clears the session cookie
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Find the session id in a raw `Cookie` header
pub fn session_id_from_cookie_header(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get() {
        let store = SessionStore::new(60);
        let id = store.create(SessionData {
            user_id: Some(7),
            ..Default::default()
        });

        let data = store.get(&id).unwrap();
        assert_eq!(data.user_id, Some(7));
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_update_and_remove() {
        let store = SessionStore::new(60);
        let id = store.create(SessionData::default());

        assert!(store.update(&id, |s| s.admin_authenticated = true));
        assert!(store.get(&id).unwrap().admin_authenticated);

        store.remove(&id);
        assert!(store.get(&id).is_none());
        assert!(!store.update(&id, |s| s.admin_authenticated = false));
    }

    #[test]
    fn test_upsert_reuses_live_session_or_creates_one() {
        let store = SessionStore::new(60);
        let id = store.create(SessionData::default());

        let same = store.upsert(Some(&id), |s| s.teacher_id = Some(2));
        assert_eq!(same, id);
        assert_eq!(store.get(&id).unwrap().teacher_id, Some(2));

        let fresh = store.upsert(Some("gone"), |s| {
            s.participants.insert("ABC123".into(), 5);
        });
        assert_ne!(fresh, "gone");
        assert_eq!(store.get(&fresh).unwrap().participants.get("ABC123"), Some(&5));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_upsert_does_not_revive_expired_session() {
        let store = SessionStore::new(0);
        let stale = store.create(SessionData {
            user_id: Some(7),
            ..Default::default()
        });

        let id = store.upsert(Some(&stale), |s| s.teacher_id = Some(2));
        assert_ne!(id, stale);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_rotate_issues_new_id_and_keeps_data() {
        let store = SessionStore::new(60);
        let planted = store.create(SessionData::default());
        store.update(&planted, |s| {
            s.participants.insert("ABC123".into(), 5);
        });

        let id = store.rotate(Some(&planted), |s| s.admin_authenticated = true);

        assert_ne!(id, planted);
        assert!(store.get(&planted).is_none());
        let data = store.get(&id).unwrap();
        assert!(data.admin_authenticated);
        assert_eq!(data.participants.get("ABC123"), Some(&5));

        let fresh = store.rotate(Some("unknown"), |s| s.user_id = Some(3));
        assert_ne!(fresh, "unknown");
        assert_eq!(store.get(&fresh).unwrap().user_id, Some(3));
    }

    #[test]
    fn test_expired_sessions_are_swept() {
        let store = SessionStore::new(0);
        let id = store.create(SessionData::default());

        assert!(store.get(&id).is_none());

        store.create(SessionData::default());
        assert_eq!(store.sweep_expired(Utc::now() + Duration::seconds(1)), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_cookie_parsing() {
        assert_eq!(
            session_id_from_cookie_header("theme=dark; sid=abc123; other=1"),
            Some("abc123")
        );
        assert_eq!(session_id_from_cookie_header("sid="), None);
        assert_eq!(session_id_from_cookie_header("sidx=1"), None);
        assert!(session_cookie("abc").starts_with("sid=abc;"));
    }
}
