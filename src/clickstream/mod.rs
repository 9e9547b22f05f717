/// Clickstream tracking
///
/// Every meaningful interaction is stored as a `ClickstreamEvent` with the
/// client's IP, user agent, referrer, URL and session id. Handlers log their
/// own events; the middleware covers plain page views.

pub mod context;
pub mod logger;
pub mod middleware;

pub use context::RequestContext;
pub use logger::ClickstreamLogger;
pub use middleware::track_page_views;
