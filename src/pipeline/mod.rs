// Persona pipeline: normalization, classification, filtering and heat aggregation

pub mod processing;

// Re-export the stages so callers can write `pipeline::normalize::normalize`
pub use processing::{classify, filter, heat, normalize};
