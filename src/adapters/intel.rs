use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::LookupError;
use crate::models::PhoneNumber;

const SERVICE: &str = "intelligence";

/// Adapter for the carrier/location/country intelligence API
pub struct IntelAdapter {
    client: Client,
    base_url: String,
    api_key: String,
}

/// The intelligence API serves several shapes for the same field across
/// plans and number types: an object carrying a `name`, or a bare string.
/// Anything else (null, an object without `name`) counts as absent.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NameOrText {
    Named { name: String },
    Text(String),
    Other(serde_json::Value),
}

impl NameOrText {
    fn as_named(&self) -> Option<&str> {
        match self {
            NameOrText::Named { name } => Some(name),
            _ => None,
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            NameOrText::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Object `name` first, then the bare-string form
    fn value(&self) -> Option<&str> {
        self.as_named().or_else(|| self.as_text())
    }
}

/// Raw intelligence response; every field is optional and resolved through
/// an ordered fallback chain where the first non-empty value wins.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IntelResponse {
    carrier: Option<NameOrText>,
    location: Option<String>,
    registered_location: Option<String>,
    region: Option<String>,
    country: Option<NameOrText>,
    country_name: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl IntelResponse {
    /// `carrier.name` → `carrier` as a plain string
    pub fn carrier(&self) -> Option<&str> {
        non_empty(self.carrier.as_ref().and_then(NameOrText::value))
    }

    /// `location` → `registered_location` → `region`
    pub fn location(&self) -> Option<&str> {
        non_empty(self.location.as_deref())
            .or_else(|| non_empty(self.registered_location.as_deref()))
            .or_else(|| non_empty(self.region.as_deref()))
    }

    /// `country.name` → `country_name` → `country` as a plain string
    pub fn country(&self) -> Option<&str> {
        non_empty(self.country.as_ref().and_then(NameOrText::as_named))
            .or_else(|| non_empty(self.country_name.as_deref()))
            .or_else(|| non_empty(self.country.as_ref().and_then(NameOrText::as_text)))
    }
}

impl IntelAdapter {
    pub fn new(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// `GET <base>?api_key=<secret>&phone=<digits>`
    pub async fn query(&self, number: &PhoneNumber) -> Result<IntelResponse, LookupError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("api_key", self.api_key.as_str()), ("phone", number.as_digits())])
            .send()
            .await
            .map_err(|source| LookupError::Request {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                service: SERVICE,
                status,
            });
        }

        let body: IntelResponse = response.json().await.map_err(|source| LookupError::Body {
            service: SERVICE,
            source,
        })?;

        debug!(number = %number, "Intelligence lookup finished");

        Ok(body)
    }
}
