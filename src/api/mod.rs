pub mod admin_handlers;
pub mod auth_handlers;
pub mod feedback_handlers;
pub mod learning_handlers;
pub mod live_quiz_handlers;
pub mod openapi;
pub mod poll_handlers;
pub mod quiz_handlers;
pub mod responses;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use responses::*;
pub use routes::create_router;
pub use state::AppState;
