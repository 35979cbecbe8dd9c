//! Domain logic for the predictive maintenance inference server.
//!
//! This crate has no HTTP dependencies. It defines the input schema, the
//! on-disk artifact formats, the preprocessing and scoring pipeline, and the
//! [`inference::InferenceService`] the API crate injects into its handlers.

pub mod artifacts;
pub mod classifier;
pub mod error;
pub mod features;
pub mod inference;
pub mod prediction;
pub mod preprocessing;
