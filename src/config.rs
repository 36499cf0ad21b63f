//! # Configuration
//!
//! Explicit configuration passed to the API client at construction.
//! There are no ambient reads of process globals anywhere below the
//! binary entry point.

use std::fmt;

/// Endpoint and credential for the remote management API.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL without a trailing slash, e.g. `https://api.example.com/api`.
    pub base_url: String,
    /// API key sent as the `Api-Key` header on every request.
    pub api_key: String,
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            api_key: api_key.into(),
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
