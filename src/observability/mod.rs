// Observability: metrics recorded by the application layer

pub mod metrics;
