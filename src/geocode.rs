//! Remote geocoding service: HTTP client, URL construction, and response
//! validation.

use crate::types::GeoloadError;
use std::sync::Arc;

/// Default endpoint: the py4e sandbox mirror of the Google geocoding API.
pub const DEFAULT_SERVICE_URL: &str = "https://py4e-data.dr-chuck.net/geojson";

/// Placeholder key the sandbox service accepts when no real credential is
/// configured. Not a secret.
pub const FALLBACK_API_KEY: &str = "42";

/// The geocoding service as the loader sees it: give it an address, get
/// back the raw response body.
pub trait GeocodeService {
    fn fetch_geodata(&self, address: &str) -> Result<String, GeoloadError>;
}

/// Blocking HTTP client for the geocoding endpoint.
pub struct GeocodeClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl GeocodeClient {
    /// Build a client for `base_url`. When `api_key` is `None` the sandbox
    /// fallback key is sent.
    ///
    /// Certificate chain and hostname verification are disabled here: the
    /// default endpoint is a test sandbox whose certificate setup does not
    /// validate. Remove this relaxation before pointing the client at any
    /// production service.
    pub fn new(base_url: &str, api_key: Option<&str>) -> Result<Self, GeoloadError> {
        let tls = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true)
            .build()?;

        let agent = ureq::AgentBuilder::new()
            .tls_connector(Arc::new(tls))
            .build();

        Ok(Self {
            agent,
            base_url: base_url.trim_end_matches('?').to_string(),
            api_key: api_key.unwrap_or(FALLBACK_API_KEY).to_string(),
        })
    }

    /// The full GET URL for one address.
    pub fn query_url(&self, address: &str) -> String {
        format!(
            "{}?address={}&key={}",
            self.base_url,
            urlencode(address),
            urlencode(&self.api_key),
        )
    }
}

impl GeocodeService for GeocodeClient {
    fn fetch_geodata(&self, address: &str) -> Result<String, GeoloadError> {
        let url = self.query_url(address);
        eprintln!("Retrieving {}", url);

        let response = self
            .agent
            .get(&url)
            .set("User-Agent", "geoload/0.1")
            .call()
            .map_err(|e| GeoloadError::Network(e.to_string()))?;

        response
            .into_string()
            .map_err(|e| GeoloadError::Network(e.to_string()))
    }
}

// ─── Response validation ────────────────────────────────────────

/// Outcome of validating a response body before caching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeodataVerdict {
    /// JSON with a `status` of `"OK"` or `"ZERO_RESULTS"`.
    Accepted,
    /// Body is not valid JSON.
    MalformedJson,
    /// JSON, but `status` is missing or holds some other value.
    Rejected { status: Option<String> },
}

/// Validate a raw response body. Only accepted bodies get cached.
pub fn check_geodata(body: &str) -> GeodataVerdict {
    let js: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return GeodataVerdict::MalformedJson,
    };

    match js.get("status").and_then(|s| s.as_str()) {
        Some("OK") | Some("ZERO_RESULTS") => GeodataVerdict::Accepted,
        Some(other) => GeodataVerdict::Rejected {
            status: Some(other.to_string()),
        },
        None => GeodataVerdict::Rejected { status: None },
    }
}

// ─── URL encoding (minimal, no extra dep) ───────────────────────

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}
