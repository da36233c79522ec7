//! Core types and constants for the track viewer

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
