//! Ingestion use cases.
//!
//! Both coordinators share one [`IngestionSlot`] per session so that an
//! upload and a clone never write session state at the same time.

mod github;
mod slot;
mod upload;

pub use github::GithubCoordinator;
pub use slot::{IngestionPermit, IngestionSlot};
pub use upload::{UploadCoordinator, UploadReport};
