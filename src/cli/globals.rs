use crate::session::FileStore;
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub client_id: Option<String>,
    pub sdk_url: Option<String>,
    pub store_path: PathBuf,
    pub ip_lookup_url: Option<String>,
    pub tick_interval: Duration,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String) -> Self {
        Self {
            api_url,
            client_id: None,
            sdk_url: Some(crate::provider::DEFAULT_SDK_URL.to_string()),
            store_path: FileStore::default_path(),
            ip_lookup_url: Some(crate::network::DEFAULT_IP_LOOKUP_URL.to_string()),
            tick_interval: crate::session::DEFAULT_TICK_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new("https://auth.tld".to_string());
        assert_eq!(args.api_url, "https://auth.tld");
        assert_eq!(args.client_id, None);
        assert_eq!(args.tick_interval, Duration::from_secs(600));
        assert!(args.store_path.ends_with("signon/session.json"));
    }
}
