//! Track storage and retention

pub mod model;
pub mod retention;

pub use model::Track;
pub use retention::{enforce, RetentionConfig};
