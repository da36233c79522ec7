//! Sample validation at the ingestion boundary

pub mod sample;

pub use sample::{SampleError, SampleValidator, ValidationResult};
