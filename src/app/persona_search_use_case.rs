use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::app::ports::{DirectoryFeedPort, RefreshTriggerPort};
use crate::app::sequencer::{RequestSequencer, RequestToken};
use crate::error::{MapError, Result};
use crate::observability::metrics;
use crate::pipeline::filter::{filter, map_pins};
use crate::pipeline::normalize::normalize_batch;
use crate::types::{FilterState, MapPin, Persona};

const REFRESH_OK_MESSAGE: &str = "New data has been added to the database";

/// Normalized personas for one postal code, tagged with the request that produced them
#[derive(Debug, Clone)]
pub struct PersonaSearchResponse {
    pub token: RequestToken,
    pub postal_code: String,
    pub personas: Vec<Persona>,
}

/// The persona list currently on display plus the filter applied to it
#[derive(Debug, Clone, Default)]
pub struct PersonaBoard {
    pub postal_code: Option<String>,
    pub personas: Vec<Persona>,
    pub filter: FilterState,
}

impl PersonaBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The personas that pass the current filter, in feed order
    pub fn visible(&self) -> Vec<Persona> {
        filter(&self.personas, &self.filter)
    }

    /// Map pins for the visible personas that have coordinates
    pub fn pins(&self) -> Vec<MapPin> {
        map_pins(&self.visible())
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
    }

    fn replace(&mut self, postal_code: String, personas: Vec<Persona>) {
        self.postal_code = Some(postal_code);
        self.personas = personas;
    }
}

/// Fetches, normalizes and publishes professional personas for a postal code,
/// and triggers upstream rescans.
pub struct PersonaSearch {
    directory: Arc<dyn DirectoryFeedPort>,
    refresh: Arc<dyn RefreshTriggerPort>,
    sequencer: RequestSequencer,
}

impl PersonaSearch {
    pub fn new(directory: Arc<dyn DirectoryFeedPort>, refresh: Arc<dyn RefreshTriggerPort>) -> Self {
        Self {
            directory,
            refresh,
            sequencer: RequestSequencer::new(),
        }
    }

    /// Fetch and normalize the directory records for `postal_code`.
    ///
    /// The response carries a request token; hand it to [`PersonaSearch::apply`]
    /// so a response overtaken by a newer search is dropped.
    #[instrument(skip(self))]
    pub async fn search(&self, postal_code: &str) -> Result<PersonaSearchResponse> {
        let postal_code = require_postal_code(postal_code)?;
        let token = self.sequencer.issue();
        debug!(token = token.value(), "Issued persona search");

        let records = self.directory.fetch_records(postal_code).await?;
        let personas = normalize_batch(&records);
        metrics::personas::batch_normalized(personas.len());

        if personas.is_empty() {
            info!("No professionals found");
        } else {
            info!("Found {} professionals", personas.len());
        }

        Ok(PersonaSearchResponse {
            token,
            postal_code: postal_code.to_string(),
            personas,
        })
    }

    /// Publish a search response onto the board unless a newer search has
    /// been issued since. Returns whether the board changed.
    pub fn apply(&self, board: &mut PersonaBoard, response: PersonaSearchResponse) -> bool {
        if !self.sequencer.is_current(response.token) {
            metrics::requests::superseded("personas");
            debug!(token = response.token.value(), "Dropping superseded persona response");
            return false;
        }
        board.replace(response.postal_code, response.personas);
        true
    }

    /// Search and apply in one step.
    pub async fn search_into(&self, board: &mut PersonaBoard, postal_code: &str) -> Result<bool> {
        let response = self.search(postal_code).await?;
        Ok(self.apply(board, response))
    }

    /// Ask the upstream source to rescan `postal_code`. Returns the upstream
    /// success message; a truthy `error` member in the reply becomes
    /// [`MapError::RefreshFailed`] with that message.
    #[instrument(skip(self))]
    pub async fn refresh(&self, postal_code: &str) -> Result<String> {
        let postal_code = require_postal_code(postal_code)?;
        info!("Triggering upstream rescan");

        let reply = self.refresh.trigger_refresh(postal_code).await?;

        if let Some(error) = reply.get("error").filter(|e| is_truthy(e)) {
            let message = match error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            warn!("Rescan rejected: {}", message);
            return Err(MapError::RefreshFailed { message });
        }

        let message = reply
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or(REFRESH_OK_MESSAGE)
            .to_string();
        info!("Rescan completed");
        Ok(message)
    }
}

/// `null`, `false`, `""`, `0` and `NaN` count as absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn require_postal_code(postal_code: &str) -> Result<&str> {
    let postal_code = postal_code.trim();
    if postal_code.is_empty() {
        metrics::requests::rejected_empty_query("pincode");
        return Err(MapError::EmptyQuery { what: "pincode" });
    }
    Ok(postal_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, CategoryFilter, RawRecord};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockDirectory {
        records: Vec<RawRecord>,
        calls: AtomicUsize,
    }

    impl MockDirectory {
        fn new(records: Vec<RawRecord>) -> Self {
            Self {
                records,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DirectoryFeedPort for MockDirectory {
        async fn fetch_records(&self, _postal_code: &str) -> Result<Vec<RawRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.clone())
        }
    }

    struct MockRefresh {
        reply: serde_json::Value,
    }

    #[async_trait]
    impl RefreshTriggerPort for MockRefresh {
        async fn trigger_refresh(&self, _postal_code: &str) -> Result<serde_json::Value> {
            Ok(self.reply.clone())
        }
    }

    fn search_with(records: Vec<RawRecord>, reply: serde_json::Value) -> (PersonaSearch, Arc<MockDirectory>) {
        let directory = Arc::new(MockDirectory::new(records));
        let search = PersonaSearch::new(directory.clone(), Arc::new(MockRefresh { reply }));
        (search, directory)
    }

    #[tokio::test]
    async fn test_search_normalizes_records() {
        let (search, _) = search_with(
            vec![
                json!({ "title": "Jane Doe", "totalScore": 4.6, "categoryName": "Interior Design" }),
                json!({ "name": "Frame Works", "type": "photographer", "rating": 4.9 }),
            ],
            json!({}),
        );

        let mut board = PersonaBoard::new();
        assert!(search.search_into(&mut board, " 560038 ").await.unwrap());

        assert_eq!(board.postal_code.as_deref(), Some("560038"));
        assert_eq!(board.personas.len(), 2);
        assert_eq!(board.personas[0].category, Category::Designer);

        board.set_filter(FilterState::new(CategoryFilter::Only(Category::Photographer), 4.5));
        let visible = board.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Frame Works");
    }

    #[tokio::test]
    async fn test_empty_postal_code_makes_no_request() {
        let (search, directory) = search_with(vec![json!({})], json!({}));

        let err = search.search("  ").await.unwrap_err();
        assert!(err.is_user_input());
        assert_eq!(directory.calls.load(Ordering::SeqCst), 0);

        let err = search.refresh("").await.unwrap_err();
        assert!(matches!(err, MapError::EmptyQuery { what: "pincode" }));
    }

    #[tokio::test]
    async fn test_superseded_response_is_dropped() {
        let (search, _) = search_with(vec![json!({ "name": "Anyone" })], json!({}));
        let mut board = PersonaBoard::new();

        let stale = search.search("110001").await.unwrap();
        let fresh = search.search("400001").await.unwrap();

        // Fresh answer lands first, the stale one arrives late
        assert!(search.apply(&mut board, fresh));
        assert!(!search.apply(&mut board, stale));
        assert_eq!(board.postal_code.as_deref(), Some("400001"));
    }

    #[tokio::test]
    async fn test_refresh_success_and_failure() {
        let (search, _) = search_with(Vec::new(), json!({ "status": "ok" }));
        assert_eq!(search.refresh("560038").await.unwrap(), REFRESH_OK_MESSAGE);

        let (search, _) = search_with(Vec::new(), json!({ "message": "Scraped 14 places" }));
        assert_eq!(search.refresh("560038").await.unwrap(), "Scraped 14 places");

        let (search, _) = search_with(Vec::new(), json!({ "error": "Actor run failed" }));
        match search.refresh("560038").await {
            Err(MapError::RefreshFailed { message }) => assert_eq!(message, "Actor run failed"),
            other => panic!("expected refresh failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_falsy_error_member_is_success() {
        for error in [json!(null), json!(false), json!(""), json!(0)] {
            let (search, _) = search_with(Vec::new(), json!({ "error": error }));
            assert_eq!(search.refresh("560038").await.unwrap(), REFRESH_OK_MESSAGE);
        }

        let (search, _) = search_with(Vec::new(), json!({ "error": true }));
        match search.refresh("560038").await {
            Err(MapError::RefreshFailed { message }) => assert_eq!(message, "true"),
            other => panic!("expected refresh failure, got {:?}", other),
        }
    }
}
