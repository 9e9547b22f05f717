// Library Crate Root
// lib.rs

// main.rs and the seed binary import everything through this crate root
pub mod api;
pub mod auth;
pub mod clickstream;
pub mod config;
pub mod database;
pub mod error;
pub mod jobs;
pub mod llm;
pub mod services;
pub mod websocket;
pub mod wordcloud;

// pub use = re-export at crate root
pub use api::{create_router, AppState};
pub use config::AppConfig;
pub use error::AppError;
pub use websocket::Broadcaster;
