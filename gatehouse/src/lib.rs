//! gatehouse server library
//!
//! Exposes the HTTP adapter around `gatehouse-core` so the router can be
//! exercised from integration tests.

pub mod api;
pub mod app_state;
pub mod http;
pub mod init_telemetry;
pub mod settings;
pub mod stop_flag;

pub use app_state::AppState;
