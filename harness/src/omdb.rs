//! Minimal client for the OMDb movie API.

use serde_json::Value;
use tracing::debug;

use crate::error::{HarnessError, Result};
use crate::settings::OmdbSettings;

/// OMDb returns this many search results per page.
pub const PAGE_SIZE: u64 = 10;

pub struct OmdbClient {
    base_url: String,
    api_key: String,
    agent: ureq::Agent,
}

impl OmdbClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            agent,
        }
    }

    pub fn from_settings(settings: &OmdbSettings) -> Self {
        Self::new(&settings.url, &settings.api_key)
    }

    /// GET the API root with `apikey` and `params` as query parameters.
    ///
    /// Anything but a 200 is an error; OMDb's own `"Response": "False"`
    /// bodies are returned as-is.
    pub fn query(&self, params: &[(&str, &str)]) -> Result<Value> {
        let mut request = self
            .agent
            .get(self.base_url.as_str())
            .header("Content-Type", "application/json")
            .query("apikey", self.api_key.as_str());
        for (key, value) in params {
            request = request.query(*key, *value);
        }

        let mut response = request.call()?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        debug!(status, ?params, "OMDb query");
        if status != 200 {
            return Err(HarnessError::UnexpectedStatus { status, body });
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Every search hit for `term`, across all pages.
    pub fn search_all(&self, term: &str) -> Result<Vec<Value>> {
        let first = self.query(&[("s", term)])?;
        let total = total_results(&first)?;
        let pages = total / PAGE_SIZE + 1;

        let mut hits = Vec::new();
        for page in 1..=pages {
            let page = page.to_string();
            let result = self.query(&[("s", term), ("page", page.as_str())])?;
            if let Some(items) = result["Search"].as_array() {
                hits.extend(items.iter().cloned());
            }
        }
        Ok(hits)
    }
}

/// `totalResults` of a search response; OMDb sends it as a string.
pub fn total_results(search: &Value) -> Result<u64> {
    search["totalResults"]
        .as_str()
        .and_then(|total| total.parse().ok())
        .ok_or(HarnessError::MissingField("totalResults"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn total_results_parses_string_count() {
        assert_eq!(total_results(&json!({"totalResults": "34"})).unwrap(), 34);
        assert!(total_results(&json!({"Response": "False"})).is_err());
    }
}
