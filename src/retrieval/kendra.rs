//! Kendra-style retrieval index client.
//!
//! The retrieve endpoint is addressed with an `X-Amz-Target` header rather
//! than a URL path, with an `application/x-amz-json-1.1` body carrying the
//! index id, query text, and paging.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::schema::Config;
use crate::errors::RetrievalError;

use super::{RetrievalIndex, RetrieveResult};

const RETRIEVE_TARGET: &str = "AWSKendraFrontendService.Retrieve";
const AMZ_JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Client for a Kendra-style retrieve endpoint.
pub struct KendraClient {
    endpoint: String,
    index_id: String,
    page_size: u32,
    page_number: u32,
    client: Client,
}

impl KendraClient {
    pub fn new(endpoint: &str, index_id: &str, page_size: u32, page_number: u32) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            index_id: index_id.to_string(),
            page_size,
            page_number,
            client: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.retrieval_endpoint(),
            &config.retrieval.index_id,
            config.retrieval.page_size,
            config.retrieval.page_number,
        )
    }

    /// Build the retrieve body for one query.
    fn request_body(&self, query: &str) -> Value {
        json!({
            "IndexId": self.index_id,
            "QueryText": query,
            "PageNumber": self.page_number,
            "PageSize": self.page_size,
        })
    }
}

#[async_trait]
impl RetrievalIndex for KendraClient {
    async fn retrieve(&self, query: &str) -> Result<RetrieveResult> {
        let body = self.request_body(query);

        debug!(
            "KendraClient::retrieve index={} query_len={}",
            self.index_id,
            query.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Amz-Target", RETRIEVE_TARGET)
            .header("Content-Type", AMZ_JSON_CONTENT_TYPE)
            .json(&body)
            .send()
            .await
            .map_err(|e| RetrievalError::HttpError(e.to_string()))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| RetrievalError::HttpError(e.to_string()))?;

        if !status.is_success() {
            return Err(RetrievalError::ApiError {
                status: status.as_u16(),
                message: response_text,
            }
            .into());
        }

        let result: RetrieveResult = serde_json::from_str(&response_text)
            .map_err(|e| RetrievalError::JsonParseError(e.to_string()))?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let client = KendraClient::new(
            "https://kendra.us-east-1.amazonaws.com",
            "823fed26-38f9-490a-bdfc-d89e19f95a63",
            15,
            1,
        );
        let body = client.request_body("get me wiki");
        assert_eq!(body["IndexId"], "823fed26-38f9-490a-bdfc-d89e19f95a63");
        assert_eq!(body["QueryText"], "get me wiki");
        assert_eq!(body["PageNumber"].as_u64(), Some(1));
        assert_eq!(body["PageSize"].as_u64(), Some(15));
        assert_eq!(body.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_from_config_defaults() {
        let client = KendraClient::from_config(&Config::default());
        assert_eq!(client.endpoint, "https://kendra.us-east-1.amazonaws.com");
        let body = client.request_body("q");
        assert_eq!(body["IndexId"], "823fed26-38f9-490a-bdfc-d89e19f95a63");
        assert_eq!(body["PageSize"].as_u64(), Some(15));
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let client = KendraClient::new("http://localhost:9300/", "idx", 10, 2);
        assert_eq!(client.endpoint, "http://localhost:9300");
        let body = client.request_body("q");
        assert_eq!(body["PageNumber"].as_u64(), Some(2));
    }
}
