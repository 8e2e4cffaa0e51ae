//! Best-effort client network context. The public IP is looked up once at
//! startup and attached to backend calls for audit logging; it is advisory and
//! its absence never blocks a flow.

use crate::APP_USER_AGENT;
use reqwest::Client;
use serde::Deserialize;
use std::{
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const DEFAULT_IP_LOOKUP_URL: &str = "https://api.ipify.org?format=json";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Deserialize)]
struct IpResponse {
    ip: String,
}

/// Shared, optional public IP of this client.
#[derive(Clone, Debug, Default)]
pub struct NetworkContext {
    ip: Arc<RwLock<Option<String>>>,
}

impl NetworkContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_ip(ip: &str) -> Self {
        let context = Self::new();
        context.set_ip(ip);
        context
    }

    #[must_use]
    pub fn ip(&self) -> Option<String> {
        self.ip
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_ip(&self, ip: &str) {
        let ip = ip.trim();
        let value = if ip.is_empty() {
            None
        } else {
            Some(ip.to_string())
        };
        *self.ip.write().unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Spawns the lookup in the background; the context is filled in when (and
    /// if) it succeeds.
    #[must_use]
    pub fn spawn_lookup(&self, lookup_url: &str) -> JoinHandle<()> {
        let context = self.clone();
        let lookup_url = lookup_url.to_string();
        tokio::spawn(async move {
            if let Some(ip) = lookup_public_ip(&lookup_url).await {
                context.set_ip(&ip);
            }
        })
    }
}

/// Fetches the public IP from a JSON `{"ip": "..."}` endpoint.
pub async fn lookup_public_ip(lookup_url: &str) -> Option<String> {
    let client = match Client::builder()
        .user_agent(APP_USER_AGENT)
        .timeout(LOOKUP_TIMEOUT)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!("Error creating reqwest client: {:?}", e);
            return None;
        }
    };

    let response = match client.get(lookup_url).send().await {
        Ok(response) if response.status().is_success() => response,
        Ok(response) => {
            debug!("public IP lookup failed: {}", response.status());
            return None;
        }
        Err(e) => {
            debug!("public IP lookup failed: {}", e);
            return None;
        }
    };

    match response.json::<IpResponse>().await {
        Ok(body) if !body.ip.trim().is_empty() => Some(body.ip.trim().to_string()),
        Ok(_) => None,
        Err(e) => {
            debug!("public IP lookup returned an unexpected body: {}", e);
            None
        }
    }
}
