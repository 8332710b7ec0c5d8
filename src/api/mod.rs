pub mod handlers;
pub mod routes;
pub mod webhook;

pub use handlers::AppState;
pub use routes::create_router;
pub use webhook::{notify_router, NotifyCallback, NOTIFY_PATH};
