//! openFDA drug label catalogue
//!
//! Queries `search=openfda.brand_name:"<query>"` and maps the first brand,
//! generic and manufacturer name of each result. Any transport or decoding
//! failure falls back to the built-in list instead of surfacing an error.

use std::time::Duration;

use async_trait::async_trait;
use medminder_core::{MedicationLookup, MedicationSuggestion};
use medminder_domain::constants::UNKNOWN_MEDICATION_NAME;
use medminder_domain::{LookupConfig, Result};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::fallback::FallbackLookup;
use crate::http::HttpClient;

#[derive(Debug, Deserialize)]
struct LabelResponse {
    #[serde(default)]
    results: Vec<LabelResult>,
}

#[derive(Debug, Deserialize)]
struct LabelResult {
    #[serde(default)]
    openfda: OpenFdaFields,
}

#[derive(Debug, Default, Deserialize)]
struct OpenFdaFields {
    #[serde(default)]
    brand_name: Vec<String>,
    #[serde(default)]
    generic_name: Vec<String>,
    #[serde(default)]
    manufacturer_name: Vec<String>,
}

impl From<LabelResult> for MedicationSuggestion {
    fn from(result: LabelResult) -> Self {
        let OpenFdaFields { brand_name, generic_name, manufacturer_name } = result.openfda;
        Self {
            display_name: brand_name
                .into_iter()
                .next()
                .unwrap_or_else(|| UNKNOWN_MEDICATION_NAME.to_string()),
            generic_name: generic_name.into_iter().next(),
            manufacturer: manufacturer_name.into_iter().next(),
        }
    }
}

/// Medication lookup against the openFDA label endpoint
pub struct OpenFdaLookup {
    client: HttpClient,
    base_url: String,
    result_limit: u32,
    enabled: bool,
}

impl OpenFdaLookup {
    /// # Errors
    /// Returns `MedMinderError::Network` if the HTTP client cannot be built.
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("medminder/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            result_limit: config.result_limit,
            enabled: config.enabled,
        })
    }

    async fn fetch(&self, query: &str) -> Result<Vec<MedicationSuggestion>> {
        let params = [
            ("search", format!("openfda.brand_name:\"{query}\"")),
            ("limit", self.result_limit.to_string()),
        ];
        let body: Option<LabelResponse> = self.client.get_json(&self.base_url, &params).await?;
        Ok(body
            .map(|body| body.results.into_iter().map(MedicationSuggestion::from).collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl MedicationLookup for OpenFdaLookup {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<MedicationSuggestion>> {
        if !self.enabled {
            return Ok(FallbackLookup::matches(query));
        }
        match self.fetch(query).await {
            Ok(results) => {
                debug!(results = results.len(), "Catalogue lookup succeeded");
                Ok(results)
            }
            Err(err) => {
                warn!(error = %err, "Catalogue lookup failed; using built-in names");
                Ok(FallbackLookup::matches(query))
            }
        }
    }
}
