//! REST implementation of [`ManagementApi`].
//!
//! Uses reqwest with rustls. Every request goes through a single builder
//! that attaches the `Api-Key` and content-type headers, and every
//! unexpected response is funneled through one status-plus-body error
//! mapper, so failures always carry the server's own words.

use super::{ApiError, ManagementApi};
use crate::config::ApiConfig;
use crate::model::{CreatedResource, DataMaskingRuleBinding, Plugin, RemoteConnection};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// HTTP client for the management API.
#[derive(Debug, Clone)]
pub struct RestManagementApi {
    http: Client,
    config: ApiConfig,
}

impl RestManagementApi {
    /// Build a client over the given endpoint configuration.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder().build()?;
        Ok(Self { http, config })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url, path);
        debug!("{} {}", method, url);
        self.http
            .request(method, url)
            .header("Api-Key", &self.config.api_key)
            .header("Content-Type", "application/json")
    }

    /// Map a non-2xx response to an error carrying status and body text.
    async fn status_error(response: Response) -> ApiError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        ApiError::Status { status, body }
    }

    async fn expect_success(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::status_error(response).await)
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response.json().await.map_err(ApiError::Decode)
    }
}

#[async_trait]
impl ManagementApi for RestManagementApi {
    async fn get_connection(&self, name: &str) -> Result<Option<RemoteConnection>, ApiError> {
        let response = self
            .request(Method::GET, &format!("/connections/{name}"))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(Some(Self::decode(response).await?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(Self::status_error(response).await),
        }
    }

    async fn create_connection(
        &self,
        document: &RemoteConnection,
    ) -> Result<RemoteConnection, ApiError> {
        let response = self
            .request(Method::POST, "/connections")
            .json(document)
            .send()
            .await?;
        Self::decode(Self::expect_success(response).await?).await
    }

    async fn update_connection(
        &self,
        name: &str,
        document: &RemoteConnection,
    ) -> Result<RemoteConnection, ApiError> {
        let response = self
            .request(Method::PUT, &format!("/connections/{name}"))
            .json(document)
            .send()
            .await?;
        Self::decode(Self::expect_success(response).await?).await
    }

    async fn delete_connection(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("/connections/{id}"))
            .send()
            .await?;
        Self::expect_success(response).await.map(|_| ())
    }

    async fn create_guardrail(
        &self,
        definition: &serde_json::Value,
    ) -> Result<CreatedResource, ApiError> {
        let response = self
            .request(Method::POST, "/guardrails")
            .json(definition)
            .send()
            .await?;
        Self::decode(Self::expect_success(response).await?).await
    }

    async fn create_issue_template(
        &self,
        template: &serde_json::Value,
    ) -> Result<CreatedResource, ApiError> {
        let response = self
            .request(Method::POST, "/integrations/issuetemplates")
            .json(template)
            .send()
            .await?;
        Self::decode(Self::expect_success(response).await?).await
    }

    async fn list_plugins(&self) -> Result<Vec<Plugin>, ApiError> {
        let response = self.request(Method::GET, "/plugins").send().await?;
        Self::decode(Self::expect_success(response).await?).await
    }

    async fn update_plugin(&self, name: &str, plugin: &Plugin) -> Result<(), ApiError> {
        let response = self
            .request(Method::PUT, &format!("/plugins/{name}"))
            .json(plugin)
            .send()
            .await?;
        Self::expect_success(response).await.map(|_| ())
    }

    async fn replace_datamasking_rules(
        &self,
        connection_name: &str,
        rules: &[DataMaskingRuleBinding],
    ) -> Result<(), ApiError> {
        let response = self
            .request(
                Method::PUT,
                &format!("/connections/{connection_name}/datamasking-rules"),
            )
            .json(&rules)
            .send()
            .await?;
        Self::expect_success(response).await.map(|_| ())
    }
}
