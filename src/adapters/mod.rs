pub mod intel;
pub mod name;

pub use intel::IntelAdapter;
pub use name::NameAdapter;

use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use crate::config::LookupConfig;
use crate::models::{LookupResult, PhoneNumber, NAME_NOT_FOUND, UNKNOWN};

/// A failed outbound lookup. Either leg failing fails the whole joined
/// lookup; the user only ever sees the generic failure text while the
/// variant detail goes to the logs.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("{service} lookup request failed")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} lookup returned {status}")]
    Status {
        service: &'static str,
        status: StatusCode,
    },

    #[error("{service} lookup returned a malformed body")]
    Body {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// Issues the name and intelligence queries for a number and merges them
/// into a single [`LookupResult`].
pub struct LookupClient {
    name: NameAdapter,
    intel: IntelAdapter,
}

impl LookupClient {
    pub fn new(config: &LookupConfig, api_key: String) -> Self {
        // One connection pool shared by both adapters
        let client = Client::new();

        Self {
            name: NameAdapter::new(client.clone(), config.name_api_url.clone()),
            intel: IntelAdapter::new(client, config.intel_api_url.clone(), api_key),
        }
    }

    /// Run both queries concurrently and join on the pair. Missing fields in
    /// an otherwise valid response fall back to their sentinels; a failure of
    /// either call fails the lookup as a whole.
    pub async fn lookup(&self, number: &PhoneNumber) -> Result<LookupResult, LookupError> {
        debug!(number = %number, "Starting joined lookup");

        let (name, intel) = tokio::try_join!(self.name.query(number), self.intel.query(number))?;

        let result = LookupResult {
            name: name.unwrap_or_else(|| NAME_NOT_FOUND.to_string()),
            carrier: intel.carrier().unwrap_or(UNKNOWN).to_string(),
            location: intel.location().unwrap_or(UNKNOWN).to_string(),
            country: intel.country().unwrap_or(UNKNOWN).to_string(),
        };

        info!(
            number = %number,
            found = result.name != NAME_NOT_FOUND,
            "Lookup complete"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn number() -> PhoneNumber {
        PhoneNumber::parse("919876543210").unwrap()
    }

    async fn client_for(server: &MockServer) -> LookupClient {
        let config = LookupConfig {
            name_api_url: format!("{}/api/num-name", server.uri()),
            intel_api_url: format!("{}/v1/", server.uri()),
        };
        LookupClient::new(&config, "secret".to_string())
    }

    #[tokio::test]
    async fn test_lookup_merges_both_responses() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/num-name"))
            .and(query_param("number", "919876543210"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"name": "Asha"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/"))
            .and(query_param("api_key", "secret"))
            .and(query_param("phone", "919876543210"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "carrier": {"name": "Jio"},
                "country": {"name": "India"},
                "region": "Delhi"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).await.lookup(&number()).await.unwrap();

        assert_eq!(result.name, "Asha");
        assert_eq!(result.carrier, "Jio");
        assert_eq!(result.location, "Delhi");
        assert_eq!(result.country, "India");
    }

    #[tokio::test]
    async fn test_missing_name_defaults_to_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/num-name"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let result = client_for(&server).await.lookup(&number()).await.unwrap();

        assert_eq!(result.name, NAME_NOT_FOUND);
        assert_eq!(result.carrier, UNKNOWN);
        assert_eq!(result.location, UNKNOWN);
        assert_eq!(result.country, UNKNOWN);
    }

    #[tokio::test]
    async fn test_non_2xx_fails_the_whole_lookup() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/num-name"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"name": "Asha"}})),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server).await.lookup(&number()).await.unwrap_err();
        assert!(matches!(
            err,
            LookupError::Status {
                service: "intelligence",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_fails_the_whole_lookup() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/num-name"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let err = client_for(&server).await.lookup(&number()).await.unwrap_err();
        assert!(matches!(err, LookupError::Body { service: "name", .. }));
    }
}
