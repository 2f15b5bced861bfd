//! HTTP remote store client
//!
//! Speaks the deployed store's REST convention: node paths map to
//! `{base_url}/{path}.json?auth={token}`, GET reads a subtree, PATCH
//! merge-patches named fields, PUT replaces the subtree.

use std::time::Duration;

use contracts::{CoreError, RemoteStore};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::auth::CredentialProvider;

/// HTTP store configuration
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// Store base URL (no trailing slash)
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Remote store client over HTTP
pub struct HttpStore<C> {
    config: HttpStoreConfig,
    credentials: C,
    client: reqwest::Client,
}

impl<C: CredentialProvider> HttpStore<C> {
    /// Create a client with the given credentials
    pub fn new(config: HttpStoreConfig, credentials: C) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CoreError::transient("client_build", e.to_string()))?;

        Ok(Self {
            config,
            credentials,
            client,
        })
    }

    async fn node_url(&self, path: &str) -> Result<String, CoreError> {
        let token = self.credentials.token().await?;
        Ok(format!("{}/{path}.json?auth={token}", self.config.base_url))
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
        path: &str,
    ) -> Result<reqwest::Response, CoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(operation, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status.is_server_error() {
            return Err(CoreError::transient(
                operation,
                format!("status {status} at '{path}'"),
            ));
        }

        // 4xx from the store is not worth retrying; report the status so
        // the caller does not loop on a rejected write.
        Err(CoreError::malformed_document(
            path,
            format!("{operation} rejected with status {status}"),
        ))
    }
}

impl<C: CredentialProvider> RemoteStore for HttpStore<C> {
    #[instrument(name = "store_get", skip(self), fields(path = %path))]
    async fn get_json(&self, path: &str) -> Result<Option<Value>, CoreError> {
        let url = self.node_url(path).await?;
        let response = self.send(self.client.get(&url), "get", path).await?;

        let value: Value = response
            .json()
            .await
            .map_err(|e| CoreError::malformed_document(path, format!("body decode: {e}")))?;

        // The store answers a missing node with a literal null body.
        if value.is_null() {
            debug!(path = %path, "node not found");
            return Ok(None);
        }
        Ok(Some(value))
    }

    #[instrument(name = "store_patch", skip(self, value), fields(path = %path))]
    async fn patch_json(&self, path: &str, value: &Value) -> Result<(), CoreError> {
        let url = self.node_url(path).await?;
        self.send(self.client.patch(&url).json(value), "patch", path)
            .await?;
        Ok(())
    }

    #[instrument(name = "store_put", skip(self, value), fields(path = %path))]
    async fn put_json(&self, path: &str, value: &Value) -> Result<(), CoreError> {
        let url = self.node_url(path).await?;
        self.send(self.client.put(&url).json(value), "put", path)
            .await?;
        Ok(())
    }
}

fn transport_error(operation: &str, e: reqwest::Error) -> CoreError {
    CoreError::transient(operation, e.to_string())
}
