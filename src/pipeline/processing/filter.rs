use crate::pipeline::processing::classify::classify;
use crate::types::{CategoryFilter, FilterState, MapPin, Persona};

/// Whether a single persona passes the filter.
///
/// The stored category is classified again before comparing. Personas built
/// outside the normalizer may still carry a raw label, and classification is
/// idempotent for canonical ones.
pub fn matches(persona: &Persona, state: &FilterState) -> bool {
    let type_match = match state.category {
        CategoryFilter::All => true,
        CategoryFilter::Only(wanted) => classify(persona.category.as_str()) == wanted,
    };
    let rating_match = state.min_rating <= 0.0 || persona.rating >= state.min_rating;
    type_match && rating_match
}

/// Narrow a persona collection, keeping the original relative order.
pub fn filter(personas: &[Persona], state: &FilterState) -> Vec<Persona> {
    personas
        .iter()
        .filter(|p| matches(p, state))
        .cloned()
        .collect()
}

/// Pins for the personas that carry coordinates, in input order.
pub fn map_pins(personas: &[Persona]) -> Vec<MapPin> {
    personas.iter().filter_map(Persona::map_pin).collect()
}
