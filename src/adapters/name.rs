use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::LookupError;
use crate::models::PhoneNumber;

const SERVICE: &str = "name";

/// Adapter for the caller-name resolution API
pub struct NameAdapter {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct NameResponse {
    #[serde(default)]
    data: Option<NameData>,
}

#[derive(Debug, Deserialize)]
struct NameData {
    #[serde(default)]
    name: Option<String>,
}

impl NameAdapter {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// `GET <base>?number=<digits>`. `Ok(None)` when the API answered but
    /// carries no (non-empty) name; any request, status, or decode failure
    /// is a [`LookupError`].
    pub async fn query(&self, number: &PhoneNumber) -> Result<Option<String>, LookupError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("number", number.as_digits())])
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

        let body: NameResponse = response.json().await.map_err(|source| LookupError::Body {
            service: SERVICE,
            source,
        })?;

        let name = body
            .data
            .and_then(|d| d.name)
            .filter(|n| !n.is_empty());

        debug!(number = %number, found = name.is_some(), "Name lookup finished");

        Ok(name)
    }
}
