//! Job domain
//!
//! Postings, applications, the derived slug and location, and input
//! validation.

mod derive;
mod entity;
mod repository;
mod validation;

pub use derive::{derive_job_fields, slugify};
pub use entity::{
    Application, Education, Experience, Industry, Job, JobFields, JobId, JobType, Location,
    DEFAULT_OPEN_DAYS,
};
pub use repository::JobRepository;
pub use validation::{JobInput, OneOrMany, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH};

#[cfg(test)]
pub(crate) use entity::fixtures;
