pub mod context;
pub mod response;

pub use context::admin_context_middleware;
pub use response::{ApiResponse, ApiResult};
