pub mod actor;
pub mod error;
pub mod handlers;
pub mod router;
