pub mod handlers;
pub mod routes;

pub use handlers::{health_check, ApiResponse, AppState, USER_ID_HEADER, USER_ROLE_HEADER};
pub use routes::router;
