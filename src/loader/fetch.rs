use super::ResourceInjector;
use crate::APP_USER_AGENT;
use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tracing::debug;

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Injects resources by downloading them over HTTP and keeping the bytes in
/// memory. A resource counts as present once its body has been fetched.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    sources: HashMap<String, String>,
    fetched: Arc<Mutex<HashMap<String, Arc<[u8]>>>>,
}

impl HttpFetcher {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            sources: HashMap::new(),
            fetched: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Registers the URL a resource id is fetched from.
    #[must_use]
    pub fn with_source(mut self, resource_id: &str, url: &str) -> Self {
        self.sources
            .insert(resource_id.to_string(), url.trim().to_string());
        self
    }

    /// Body of a fetched resource.
    #[must_use]
    pub fn contents(&self, resource_id: &str) -> Option<Arc<[u8]>> {
        self.fetched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(resource_id)
            .cloned()
    }
}

impl ResourceInjector for HttpFetcher {
    fn is_present(&self, resource_id: &str) -> bool {
        self.fetched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(resource_id)
    }

    fn inject(&self, resource_id: &str) -> BoxFuture<'static, Result<(), String>> {
        let Some(url) = self.sources.get(resource_id).cloned() else {
            let message = format!("no source registered for {resource_id}");
            return async move { Err(message) }.boxed();
        };

        let client = self.client.clone();
        let fetched = Arc::clone(&self.fetched);
        let resource = resource_id.to_string();

        async move {
            debug!("fetching {} from {}", resource, url);

            let response = client
                .get(&url)
                .send()
                .await
                .map_err(|err| format!("{url}: {err}"))?;

            if !response.status().is_success() {
                return Err(format!("{url} - {}", response.status()));
            }

            let body = response
                .bytes()
                .await
                .map_err(|err| format!("{url}: {err}"))?;

            fetched
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(resource, Arc::from(body.as_ref()));

            Ok(())
        }
        .boxed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_resource_fails_without_network() {
        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher.inject("missing").await.unwrap_err();
        assert_eq!(err, "no source registered for missing");
        assert!(!fetcher.is_present("missing"));
    }

    #[test]
    fn with_source_trims_url() {
        let fetcher = HttpFetcher::new()
            .unwrap()
            .with_source("sdk", "  https://cdn.example.com/sdk.js ");
        assert_eq!(
            fetcher.sources.get("sdk").map(String::as_str),
            Some("https://cdn.example.com/sdk.js")
        );
        assert!(fetcher.contents("sdk").is_none());
    }
}
