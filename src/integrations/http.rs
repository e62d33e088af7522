//! HTTP product lookup
//!
//! `GET <endpoint>?code=<code>&kind=<asin|isbn>` answering a JSON object.
//! Scalar fields are kept as text; nested values are kept as compact JSON.

use super::*;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Lookup against a JSON endpoint
pub struct HttpProductLookup {
    client: Client,
    endpoint: String,
}

impl HttpProductLookup {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, IntegrationError> {
        let client = Client::builder()
            .user_agent(concat!("hatedma/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| IntegrationError::Http(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Lookup configured from `[products]`
    pub fn from_config(config: &crate::config::ProductsConfig) -> Result<Self, IntegrationError> {
        let endpoint = config.endpoint.as_deref().filter(|e| !e.is_empty()).ok_or(IntegrationError::Disabled)?;
        Self::new(endpoint, Duration::from_millis(config.request_timeout_ms))
    }

    pub fn request_url(&self, code: &str) -> String {
        let sep = if self.endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}code={}&kind={}",
            self.endpoint,
            sep,
            urlencoding::encode(code),
            CodeKind::of(code).as_str()
        )
    }

    async fn fetch(&self, code: &str) -> Result<ProductRecord, IntegrationError> {
        let response = self
            .client
            .get(self.request_url(code))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| IntegrationError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IntegrationError::Http(format!(
                "lookup endpoint returned {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| IntegrationError::Parse(e.to_string()))?;

        let mut record = flatten(&body)?;
        if CodeKind::of(code) == CodeKind::Asin && !record.is_empty() {
            record.entry("asin".to_string()).or_insert_with(|| code.to_string());
        }
        Ok(record)
    }
}

/// Object fields as text attributes; `null` fields are dropped
pub(crate) fn flatten(value: &Value) -> Result<ProductRecord, IntegrationError> {
    let object = match value {
        Value::Object(map) => map,
        Value::Null => return Ok(ProductRecord::new()),
        other => {
            return Err(IntegrationError::Parse(format!(
                "expected a JSON object, got {}",
                other
            )))
        }
    };

    Ok(object
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), text))
        })
        .collect())
}

#[async_trait]
impl ProductLookup for HttpProductLookup {
    fn name(&self) -> &str {
        "http"
    }

    async fn lookup(&self, code: &str) -> ProductRecord {
        match self.fetch(code).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Lookup of {} failed: {}", code, e);
                ProductRecord::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_url() {
        let lookup = HttpProductLookup::new("http://localhost/products", Duration::from_secs(1)).unwrap();
        assert_eq!(
            lookup.request_url("B000000000"),
            "http://localhost/products?code=B000000000&kind=asin"
        );
        assert_eq!(
            lookup.request_url("978 4"),
            "http://localhost/products?code=978%204&kind=isbn"
        );

        let lookup = HttpProductLookup::new("http://localhost/p?key=k", Duration::from_secs(1)).unwrap();
        assert!(lookup.request_url("9784000000000").starts_with("http://localhost/p?key=k&code="));
    }

    #[test]
    fn test_disabled_without_endpoint() {
        let config = crate::config::ProductsConfig::default();
        assert!(matches!(
            HttpProductLookup::from_config(&config),
            Err(IntegrationError::Disabled)
        ));
    }

    #[test]
    fn test_flatten() {
        let record = flatten(&json!({
            "title": "Programming Rust",
            "pages": 735,
            "author": ["Jim", "Jason"],
            "note": null
        }))
        .unwrap();

        assert_eq!(record["title"], "Programming Rust");
        assert_eq!(record["pages"], "735");
        assert_eq!(record["author"], "[\"Jim\",\"Jason\"]");
        assert!(!record.contains_key("note"));

        assert!(flatten(&Value::Null).unwrap().is_empty());
        assert!(flatten(&json!([1, 2])).is_err());
    }
}
