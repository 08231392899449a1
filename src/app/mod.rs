// Application layer: use cases wiring the pure pipeline to the upstream ports

pub mod heatmap_use_case;
pub mod persona_search_use_case;
pub mod ports;
pub mod resolve_use_case;
pub mod sequencer;
