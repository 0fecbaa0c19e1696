//! Endpoint profiles and their repository seam.

pub mod model;
pub mod repository;

pub use model::{EndpointProfile, ProfileSource, resolve_current};
pub use repository::ProfileRepository;
