//! Infrastructure layer - External service implementations

pub mod auth;
pub mod email;
pub mod files;
pub mod geocoding;
pub mod job;
pub mod logging;
pub mod storage;
pub mod user;
