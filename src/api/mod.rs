pub mod books;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use error::ApiError;
pub use middleware::CurrentSession;
pub use routes::{router, AppState};
pub use types::{ErrorResponse, LoginRequest, MessageResponse, UserResponse};
