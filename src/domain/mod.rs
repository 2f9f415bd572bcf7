//! Domain layer - Core business logic and entities

pub mod email;
pub mod error;
pub mod files;
pub mod geocoding;
pub mod job;
pub mod query;
pub mod storage;
pub mod user;

pub use email::{EmailMessage, EmailSender};
pub use error::DomainError;
pub use files::FileStorage;
pub use geocoding::{GeocodedAddress, Geocoder};
pub use job::{Job, JobId, JobRepository};
pub use query::{DocumentQuery, QueryParams};
pub use storage::{Storage, StorageEntity, StorageKey};
pub use user::{Role, User, UserId, UserRepository};
