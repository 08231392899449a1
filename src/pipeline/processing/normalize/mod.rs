use serde_json::Value;
use std::collections::HashSet;

use crate::constants::{MAX_RATING, UNKNOWN_NAME};
use crate::pipeline::processing::classify::classify;
use crate::types::{Category, Coordinates, Persona, RawRecord};

pub(crate) mod fields;

use fields::{first_count, first_number, first_text};

/// Convert one raw professional record into a canonical [`Persona`].
///
/// The two upstream backends disagree on field names (`name`/`title`,
/// `rating`/`totalScore`, `portfolio`/`url`/`website`, ...). For every field
/// the candidates are tried in a fixed order and the first usable value wins;
/// when none is usable the field takes its default. This never fails.
///
/// `fallback_index` becomes the id when the record carries none, normally the
/// record's position in the feed.
pub fn normalize(raw: &RawRecord, fallback_index: usize) -> Persona {
    let id = first_text(raw, &["id"]).unwrap_or_else(|| fallback_index.to_string());

    let name = first_text(raw, &["name", "title"]).unwrap_or_else(|| UNKNOWN_NAME.to_string());

    let rating = first_number(raw, &["rating", "totalScore"])
        .map(|r| r.clamp(0.0, MAX_RATING))
        .unwrap_or(0.0);

    Persona {
        id,
        name,
        category: extract_category(raw),
        rating,
        location: first_text(raw, &["location", "address"]).unwrap_or_default(),
        contact: first_text(raw, &["contact", "phone"]).unwrap_or_default(),
        review_count: first_count(raw, &["reviews"]).unwrap_or(0),
        portfolio_url: first_text(raw, &["portfolio", "url", "website"]),
        image_url: first_text(raw, &["image", "photoUrl"]),
        coordinates: extract_coordinates(raw),
    }
}

/// Normalize a whole feed response, using each record's position as its fallback id.
///
/// Ids are unique within the result: a record whose id was already taken by an
/// earlier one is suffixed with `-<position>`.
pub fn normalize_batch(records: &[RawRecord]) -> Vec<Persona> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let mut persona = normalize(raw, index);
            let mut candidate = persona.id.clone();
            let mut attempt = 0;
            while seen.contains(&candidate) {
                attempt += 1;
                candidate = match attempt {
                    1 => format!("{}-{}", persona.id, index),
                    n => format!("{}-{}-{}", persona.id, index, n),
                };
            }
            seen.insert(candidate.clone());
            persona.id = candidate;
            persona
        })
        .collect()
}

/// `type` when present, otherwise the classified `categoryName`.
fn extract_category(raw: &RawRecord) -> Category {
    first_text(raw, &["type"])
        .or_else(|| first_text(raw, &["categoryName"]))
        .map(|label| classify(&label))
        .unwrap_or_else(|| classify(""))
}

/// Flat `lat`/`lng`, then `latitude`/`longitude`, then the nested
/// `location: {lat, lng}` object some scrapers emit.
fn extract_coordinates(raw: &RawRecord) -> Option<Coordinates> {
    fn pair(data: &Value, lat_key: &str, lng_key: &str) -> Option<Coordinates> {
        let lat = first_number(data, &[lat_key])?;
        let lng = first_number(data, &[lng_key])?;
        Some(Coordinates::new(lat, lng))
    }

    pair(raw, "lat", "lng")
        .or_else(|| pair(raw, "latitude", "longitude"))
        .or_else(|| raw.get("location").and_then(|loc| pair(loc, "lat", "lng")))
        .filter(|c| (-90.0..=90.0).contains(&c.lat) && (-180.0..=180.0).contains(&c.lng))
}
