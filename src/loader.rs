//! The per-line pass: cache lookup, fetch on miss, validate, persist.
//!
//! Line flow:  lookup → [hit → done]  or  fetch → validate → insert,
//! with early exits on parse or validation failure. No state survives
//! from one line to the next.

use crate::geocode::{check_geodata, GeocodeService, GeodataVerdict};
use crate::store::LocationStore;
use crate::types::{GeoloadError, LineOutcome};
use serde::Serialize;

/// Counters for one run over the input.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Addresses already present in the store.
    pub hits: usize,
    /// Addresses fetched, validated, and inserted.
    pub stored: usize,
    /// Addresses skipped after a parse or validation failure.
    pub skipped: usize,
    /// Lines empty after trimming.
    pub blank: usize,
}

/// Drives one batch over the input lines.
pub struct Loader<'a, S: GeocodeService> {
    store: &'a LocationStore,
    service: &'a S,
}

impl<'a, S: GeocodeService> Loader<'a, S> {
    pub fn new(store: &'a LocationStore, service: &'a S) -> Self {
        Self { store, service }
    }

    /// Process every input line in order. Parse and validation failures
    /// skip the line; store and transport errors abort the whole run.
    pub fn run<I>(&self, lines: I) -> Result<RunSummary, GeoloadError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut summary = RunSummary::default();

        for line in lines {
            match self.process_line(line.as_ref())? {
                LineOutcome::CacheHit => summary.hits += 1,
                LineOutcome::Stored { .. } => summary.stored += 1,
                LineOutcome::MalformedJson | LineOutcome::Rejected { .. } => {
                    summary.skipped += 1
                }
                LineOutcome::Blank => summary.blank += 1,
            }
        }

        Ok(summary)
    }

    /// One line through the state machine.
    pub fn process_line(&self, line: &str) -> Result<LineOutcome, GeoloadError> {
        let address = line.trim();
        if address.is_empty() {
            return Ok(LineOutcome::Blank);
        }

        if self.store.lookup(address)?.is_some() {
            eprintln!("Found in database: {}", address);
            return Ok(LineOutcome::CacheHit);
        }

        let body = self.service.fetch_geodata(address)?;
        let preview: String = body
            .chars()
            .take(40)
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        eprintln!("Retrieved {} characters {}", body.len(), preview);

        match check_geodata(&body) {
            GeodataVerdict::Accepted => {
                self.store.insert(address, &body)?;
                Ok(LineOutcome::Stored { bytes: body.len() })
            }
            GeodataVerdict::MalformedJson => {
                eprintln!("Error parsing JSON");
                Ok(LineOutcome::MalformedJson)
            }
            GeodataVerdict::Rejected { status } => {
                eprintln!("Failure to retrieve: {}", address);
                Ok(LineOutcome::Rejected { status })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Canned-response service that records every fetch it receives.
    struct FakeService {
        responses: HashMap<String, String>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeService {
        fn new(responses: &[(&str, &str)]) -> Self {
            Self {
                responses: responses
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl GeocodeService for FakeService {
        fn fetch_geodata(&self, address: &str) -> Result<String, GeoloadError> {
            self.calls.borrow_mut().push(address.to_string());
            self.responses
                .get(address)
                .cloned()
                .ok_or_else(|| GeoloadError::Network(format!("no response for {}", address)))
        }
    }

    fn test_store() -> (LocationStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("geodata.sqlite");
        (LocationStore::open(path).unwrap(), dir)
    }

    const OK_BODY: &str = r#"{"status": "OK", "results": [{"formatted_address": "Boston, MA, USA"}]}"#;

    #[test]
    fn test_duplicate_lines_fetch_once() {
        // Two identical lines: first fetches and inserts, second is a hit.
        let (store, _dir) = test_store();
        let service = FakeService::new(&[("Boston, MA", OK_BODY)]);
        let loader = Loader::new(&store, &service);

        let summary = loader.run(["Boston, MA", "Boston, MA"]).unwrap();

        assert_eq!(summary.stored, 1);
        assert_eq!(summary.hits, 1);
        assert_eq!(service.call_count(), 1);
        assert_eq!(store.count_for("Boston, MA").unwrap(), 1);
    }

    #[test]
    fn test_cached_address_makes_no_network_call() {
        let (store, _dir) = test_store();
        store.insert("Boston, MA", OK_BODY).unwrap();

        let service = FakeService::new(&[]);
        let loader = Loader::new(&store, &service);

        let summary = loader.run(["Boston, MA"]).unwrap();

        assert_eq!(summary.hits, 1);
        assert_eq!(service.call_count(), 0);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let (store, _dir) = test_store();
        let lines = ["Boston, MA", "Austin, TX"];
        let service = FakeService::new(&[
            ("Boston, MA", OK_BODY),
            ("Austin, TX", r#"{"status": "ZERO_RESULTS", "results": []}"#),
        ]);
        let loader = Loader::new(&store, &service);

        let first = loader.run(lines).unwrap();
        assert_eq!(first.stored, 2);

        let second = loader.run(lines).unwrap();
        assert_eq!(second.hits, 2);
        assert_eq!(second.stored, 0);

        // One fetch per address total, and still one record each.
        assert_eq!(service.call_count(), 2);
        assert_eq!(store.record_count().unwrap(), 2);
    }

    #[test]
    fn test_malformed_json_skips_and_continues() {
        let (store, _dir) = test_store();
        let service = FakeService::new(&[
            ("Nowhere", "<html>oops</html>"),
            ("Boston, MA", OK_BODY),
        ]);
        let loader = Loader::new(&store, &service);

        let summary = loader.run(["Nowhere", "Boston, MA"]).unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.stored, 1);
        assert_eq!(store.count_for("Nowhere").unwrap(), 0);
        assert_eq!(store.count_for("Boston, MA").unwrap(), 1);
    }

    #[test]
    fn test_bad_status_not_persisted() {
        let (store, _dir) = test_store();
        let service = FakeService::new(&[("Atlantis", r#"{"status": "NOT_FOUND"}"#)]);
        let loader = Loader::new(&store, &service);

        let outcome = loader.process_line("Atlantis").unwrap();
        assert_eq!(
            outcome,
            LineOutcome::Rejected {
                status: Some("NOT_FOUND".to_string())
            }
        );
        assert_eq!(store.record_count().unwrap(), 0);
    }

    #[test]
    fn test_lines_are_trimmed() {
        let (store, _dir) = test_store();
        let service = FakeService::new(&[("Boston, MA", OK_BODY)]);
        let loader = Loader::new(&store, &service);

        let summary = loader.run(["  Boston, MA\t"]).unwrap();

        assert_eq!(summary.stored, 1);
        assert!(store.lookup("Boston, MA").unwrap().is_some());
    }

    #[test]
    fn test_blank_lines_skipped_without_fetch() {
        let (store, _dir) = test_store();
        let service = FakeService::new(&[]);
        let loader = Loader::new(&store, &service);

        let summary = loader.run(["", "   ", "\t"]).unwrap();

        assert_eq!(summary.blank, 3);
        assert_eq!(service.call_count(), 0);
        assert_eq!(store.record_count().unwrap(), 0);
    }

    #[test]
    fn test_transport_failure_aborts_run() {
        let (store, _dir) = test_store();
        // No canned response: the fake reports a network error.
        let service = FakeService::new(&[]);
        let loader = Loader::new(&store, &service);

        let result = loader.run(["Boston, MA"]);
        assert!(matches!(result, Err(GeoloadError::Network(_))));
        assert_eq!(store.record_count().unwrap(), 0);
    }
}
