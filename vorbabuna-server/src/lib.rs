pub mod error;
pub mod http;
pub mod router;
pub mod subsystems;
