//! Job infrastructure module
//!
//! Storage-backed repository and the job service (listing, geo search,
//! statistics, publishing and applications).

mod repository;
mod service;

pub use repository::StorageJobRepository;
pub use service::{
    ExperienceStats, JobDetails, JobService, ResumeUpload, ALLOWED_RESUME_EXTENSIONS,
};
