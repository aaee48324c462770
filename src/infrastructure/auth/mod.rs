pub mod middleware;
pub mod request_id;

pub use middleware::{push_token_middleware, PushVerification};
pub use request_id::{request_id_middleware, RequestId};
