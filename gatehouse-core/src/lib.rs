pub mod assignment;
pub mod catalog;
pub mod error;
pub mod resolver;
pub mod seed;
pub mod service;
pub mod settings;
pub mod store;
pub mod validation;

// Entity types live in gatehouse-types and are imported from there directly
