//! CLI command implementations.

pub mod auth;
pub mod backends;
pub mod hello_world;
pub mod search;
pub mod version;
