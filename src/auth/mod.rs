/// Session-based authentication
///
/// Learners, teachers and the analytics admin all authenticate into the same
/// cookie-bound in-memory session; extractors gate handlers by role.

pub mod extractors;
pub mod password;
pub mod session;

pub use extractors::{CurrentSession, RequireAdmin, RequireTeacher, RequireUser};
pub use session::{
    clear_session_cookie, session_cookie, SessionData, SessionStore, SESSION_COOKIE,
};
