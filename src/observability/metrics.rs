//! Counters for the persona/heatmap flows.
//!
//! Recorded through the `metrics` facade; without an installed recorder the
//! calls are no-ops, so library users opt in by installing their own exporter.

/// Upstream feed health
pub mod feeds {
    pub fn request_succeeded(feed: &'static str, records: usize) {
        ::metrics::counter!("persona_map_feed_requests_success_total", "feed" => feed).increment(1);
        ::metrics::histogram!("persona_map_feed_records", "feed" => feed).record(records as f64);
    }

    pub fn request_failed(feed: &'static str) {
        ::metrics::counter!("persona_map_feed_requests_error_total", "feed" => feed).increment(1);
    }
}

pub mod personas {
    /// A feed response was normalized into personas
    pub fn batch_normalized(batch_size: usize) {
        ::metrics::counter!("persona_map_personas_normalized_total").increment(batch_size as u64);
        ::metrics::histogram!("persona_map_normalize_batch_size").record(batch_size as f64);
    }
}

pub mod geocoder {
    pub fn lookup_hit() {
        ::metrics::counter!("persona_map_geocoder_lookups_total", "outcome" => "hit").increment(1);
    }

    pub fn lookup_miss() {
        ::metrics::counter!("persona_map_geocoder_lookups_total", "outcome" => "miss").increment(1);
    }
}

pub mod requests {
    /// A response arrived after a newer request was issued and was dropped
    pub fn superseded(kind: &'static str) {
        ::metrics::counter!("persona_map_responses_superseded_total", "kind" => kind).increment(1);
    }

    pub fn rejected_empty_query(kind: &'static str) {
        ::metrics::counter!("persona_map_empty_queries_total", "kind" => kind).increment(1);
    }
}

pub mod heatmap {
    pub fn layer_replaced(points: usize) {
        ::metrics::counter!("persona_map_heat_layers_replaced_total").increment(1);
        ::metrics::gauge!("persona_map_heat_layer_points").set(points as f64);
    }
}
