mod dto;
mod handlers;
mod router;

pub use handlers::AppState;
pub use router::create_router;
