pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod types;

// Application and infrastructure boundaries
pub mod app;
pub mod infra;
pub mod observability;

pub use error::{MapError, Result};
pub use pipeline::classify::classify;
pub use pipeline::filter::filter;
pub use pipeline::heat::aggregate;
pub use pipeline::normalize::normalize;
pub use types::{Category, CategoryFilter, Coordinates, FilterState, GeoSample, HeatPoint, Persona, RawRecord};
